//! A minimal dense integer tensor.
//!
//! The protocols only need flat storage with a shape attached: elementwise
//! arithmetic, flip/cumsum along an axis, cyclic roll, window extraction and
//! zero padding for the pooling sweep. Anything fancier belongs to the
//! caller's tensor engine.

use std::fmt::{Debug, Formatter};

#[derive(Clone, PartialEq, Eq)]
pub struct Tensor {
    data: Vec<i128>,
    shape: Vec<usize>,
}

impl Tensor {
    /// # Panics
    /// If `data` does not fill `shape` exactly.
    #[must_use]
    pub fn new(data: Vec<i128>, shape: Vec<usize>) -> Self {
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "data does not fill the shape"
        );
        Self { data, shape }
    }

    #[must_use]
    pub fn from_vec(data: Vec<i128>) -> Self {
        let n = data.len();
        Self::new(data, vec![n])
    }

    #[must_use]
    pub fn scalar(v: i128) -> Self {
        Self::new(vec![v], vec![1])
    }

    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::filled(shape, 0)
    }

    #[must_use]
    pub fn filled(shape: &[usize], v: i128) -> Self {
        Self::new(vec![v; shape.iter().product()], shape.to_vec())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn data(&self) -> &[i128] {
        &self.data
    }

    #[must_use]
    pub fn get(&self, i: usize) -> i128 {
        self.data[i]
    }

    /// # Panics
    /// If the tensor does not hold exactly one element.
    #[must_use]
    pub fn as_scalar(&self) -> i128 {
        assert_eq!(1, self.len(), "not a scalar");
        self.data[0]
    }

    /// # Panics
    /// If `shape` does not hold the same number of elements.
    #[must_use]
    pub fn reshape(&self, shape: &[usize]) -> Tensor {
        Tensor::new(self.data.clone(), shape.to_vec())
    }

    #[must_use]
    pub fn flatten(&self) -> Tensor {
        Tensor::from_vec(self.data.clone())
    }

    #[must_use]
    pub fn map(&self, f: impl Fn(i128) -> i128) -> Tensor {
        Tensor::new(self.data.iter().copied().map(f).collect(), self.shape.clone())
    }

    /// # Panics
    /// If the shapes disagree.
    #[must_use]
    pub fn zip_map(&self, rhs: &Tensor, f: impl Fn(i128, i128) -> i128) -> Tensor {
        assert_eq!(self.shape, rhs.shape, "shape mismatch");
        Tensor::new(
            self.data
                .iter()
                .zip(&rhs.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            self.shape.clone(),
        )
    }

    /// Expand a single-element tensor to `n` copies.
    ///
    /// # Panics
    /// If the tensor is not a scalar.
    #[must_use]
    pub fn broadcast_to(&self, n: usize) -> Tensor {
        Tensor::filled(&[n], self.as_scalar())
    }

    /// Repeat each element `k` times along a new trailing axis.
    #[must_use]
    pub fn expand_last(&self, k: usize) -> Tensor {
        let mut shape = self.shape.clone();
        shape.push(k);
        let data = self
            .data
            .iter()
            .flat_map(|&v| std::iter::repeat(v).take(k))
            .collect();
        Tensor::new(data, shape)
    }

    fn axis_extent(&self, axis: usize) -> (usize, usize) {
        assert!(axis < self.shape.len(), "axis out of range");
        let stride: usize = self.shape[axis + 1..].iter().product();
        (self.shape[axis], stride)
    }

    /// Reverse the order of elements along `axis`.
    #[must_use]
    pub fn flip(&self, axis: usize) -> Tensor {
        let (n, stride) = self.axis_extent(axis);
        let block = n * stride;
        let mut out = self.data.clone();
        for start in (0..self.data.len()).step_by(block.max(1)) {
            for i in 0..n {
                for s in 0..stride {
                    out[start + i * stride + s] = self.data[start + (n - 1 - i) * stride + s];
                }
            }
        }
        Tensor::new(out, self.shape.clone())
    }

    /// Running sum along `axis`.
    #[must_use]
    pub fn cumsum(&self, axis: usize) -> Tensor {
        let (n, stride) = self.axis_extent(axis);
        let block = n * stride;
        let mut out = self.data.clone();
        for start in (0..self.data.len()).step_by(block.max(1)) {
            for s in 0..stride {
                let mut acc = 0_i128;
                for i in 0..n {
                    acc += self.data[start + i * stride + s];
                    out[start + i * stride + s] = acc;
                }
            }
        }
        Tensor::new(out, self.shape.clone())
    }

    /// Reorder the trailing axis: `out[.., i] = self[.., perm[i]]`.
    ///
    /// # Panics
    /// If `perm` does not have the trailing axis' length.
    #[must_use]
    pub fn permute_last(&self, perm: &[usize]) -> Tensor {
        let l = *self.shape.last().expect("rank zero tensor");
        assert_eq!(l, perm.len(), "permutation length mismatch");
        let mut out = self.data.clone();
        for row in 0..self.data.len() / l {
            for (i, &p) in perm.iter().enumerate() {
                out[row * l + i] = self.data[row * l + p];
            }
        }
        Tensor::new(out, self.shape.clone())
    }

    /// Cyclic shift of the flat data; positive `shift` moves elements toward
    /// higher indices.
    #[must_use]
    pub fn roll(&self, shift: i64) -> Tensor {
        let n = i64::try_from(self.len()).expect("tensor too large");
        let data = (0..n)
            .map(|i| self.data[usize::try_from((i - shift).rem_euclid(n)).expect("in range")])
            .collect();
        Tensor::new(data, self.shape.clone())
    }

    /// Multi-dimensional indexing.
    ///
    /// # Panics
    /// If `idx` has the wrong rank or any coordinate is out of range.
    #[must_use]
    pub fn at(&self, idx: &[usize]) -> i128 {
        assert_eq!(idx.len(), self.shape.len(), "index rank mismatch");
        let mut flat = 0;
        for (i, (&c, &extent)) in idx.iter().zip(&self.shape).enumerate() {
            assert!(c < extent, "index {c} out of range at axis {i}");
            flat = flat * extent + c;
        }
        self.data[flat]
    }

    /// Zero-pad the two trailing axes of a 4-D tensor by `pad` on every side.
    ///
    /// # Panics
    /// If the tensor is not 4-D.
    #[must_use]
    pub fn pad2d(&self, pad: usize) -> Tensor {
        assert_eq!(4, self.shape.len(), "pad2d needs a 4-D tensor");
        let (b, c, h, w) = (self.shape[0], self.shape[1], self.shape[2], self.shape[3]);
        let (hp, wp) = (h + 2 * pad, w + 2 * pad);
        let mut out = Tensor::zeros(&[b, c, hp, wp]);
        for bi in 0..b {
            for ci in 0..c {
                for hi in 0..h {
                    for wi in 0..w {
                        let src = ((bi * c + ci) * h + hi) * w + wi;
                        let dst = ((bi * c + ci) * hp + hi + pad) * wp + wi + pad;
                        out.data[dst] = self.data[src];
                    }
                }
            }
        }
        out
    }

    /// Extract a `[kh, kw]` window of a 4-D tensor at batch `b`, channel `c`,
    /// top-left corner `(r0, c0)`.
    #[must_use]
    pub fn window2d(&self, b: usize, c: usize, r0: usize, c0: usize, kh: usize, kw: usize) -> Tensor {
        assert_eq!(4, self.shape.len(), "window2d needs a 4-D tensor");
        let mut data = Vec::with_capacity(kh * kw);
        for dr in 0..kh {
            for dc in 0..kw {
                data.push(self.at(&[b, c, r0 + dr, c0 + dc]));
            }
        }
        Tensor::new(data, vec![kh, kw])
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tensor{:?}{:?}", self.shape, self.data)
    }
}
