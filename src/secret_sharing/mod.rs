//! Additive two-party sharings and public per-role values.
//!
//! A [`SharedTensor`] is the orchestrator's view of one secret tensor: one
//! share tensor per holder, the helper's identity, the field the shares live
//! in and a dtype class. Linear operations are local (no round trip) and are
//! provided here; anything that needs communication goes through
//! [`crate::protocol::context::Context`].

use std::ops::{Add, Neg, Sub};

use crate::{
    error::{Error, ShapeError},
    ff::FieldPrm,
    helpers::Role,
    tensor::Tensor,
};

/// Distinguishes caller-facing sharings from the re-fielded sharings the
/// protocols build internally (field `L-1`, the bit field). The tag is set at
/// creation and never coerced; top-level operators reject `Bridging` inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DtypeClass {
    Standard,
    Bridging,
}

#[derive(Clone, Debug)]
pub struct SharedTensor {
    shares: [Tensor; 2],
    holders: [Role; 2],
    helper: Role,
    prm: &'static FieldPrm,
    dtype: DtypeClass,
}

impl SharedTensor {
    /// Assemble a sharing from raw per-holder shares. Shares are reduced into
    /// the balanced range of `prm`.
    pub fn from_shares(
        shares: [Tensor; 2],
        holders: [Role; 2],
        helper: Role,
        prm: &'static FieldPrm,
        dtype: DtypeClass,
    ) -> Result<Self, Error> {
        if holders[0] == holders[1] || holders.contains(&helper) {
            return Err(Error::RoleMismatch);
        }
        if shares[0].shape() != shares[1].shape() {
            return Err(Error::ShapeMismatch(ShapeError {
                expected: shares[0].shape().to_vec(),
                actual: shares[1].shape().to_vec(),
            }));
        }
        let shares = shares.map(|t| t.map(|v| prm.reduce(v)));
        Ok(Self {
            shares,
            holders,
            helper,
            prm,
            dtype,
        })
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.shares[0].shape()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shares[0].len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shares[0].is_empty()
    }

    #[must_use]
    pub fn prm(&self) -> &'static FieldPrm {
        self.prm
    }

    #[must_use]
    pub fn dtype(&self) -> DtypeClass {
        self.dtype
    }

    #[must_use]
    pub fn holders(&self) -> [Role; 2] {
        self.holders
    }

    #[must_use]
    pub fn helper(&self) -> Role {
        self.helper
    }

    pub fn share_of(&self, role: Role) -> Result<&Tensor, Error> {
        self.holder_slot(role)
            .map(|i| &self.shares[i])
            .ok_or(Error::NotAHolder(role))
    }

    fn holder_slot(&self, role: Role) -> Option<usize> {
        self.holders.iter().position(|&h| h == role)
    }

    /// Apply the same structural transform to both shares (reshape, slice,
    /// permute and the like). The result is reduced back into the field.
    #[must_use]
    pub fn map_shares(&self, f: impl Fn(&Tensor) -> Tensor) -> SharedTensor {
        let prm = self.prm;
        let shares = [
            f(&self.shares[0]).map(|v| prm.reduce(v)),
            f(&self.shares[1]).map(|v| prm.reduce(v)),
        ];
        debug_assert_eq!(shares[0].shape(), shares[1].shape());
        SharedTensor {
            shares,
            holders: self.holders,
            helper: self.helper,
            prm: self.prm,
            dtype: self.dtype,
        }
    }

    fn zip_with(&self, rhs: &SharedTensor, f: impl Fn(i128, i128) -> i128) -> SharedTensor {
        debug_assert_eq!(self.prm.modulus(), rhs.prm.modulus());
        debug_assert_eq!(self.holders, rhs.holders);
        debug_assert_eq!(self.dtype, rhs.dtype);
        let prm = self.prm;
        let shares = [
            self.shares[0].zip_map(&rhs.shares[0], |a, b| prm.reduce(f(a, b))),
            self.shares[1].zip_map(&rhs.shares[1], |a, b| prm.reduce(f(a, b))),
        ];
        SharedTensor {
            shares,
            holders: self.holders,
            helper: self.helper,
            prm: self.prm,
            dtype: self.dtype,
        }
    }

    /// Multiply by a public scalar (applied to both shares).
    #[must_use]
    pub fn mul_scalar(&self, k: i128) -> SharedTensor {
        self.map_shares(|t| t.map(|v| v * k))
    }

    /// Elementwise multiply by a public tensor known to both holders.
    #[must_use]
    pub fn mul_tensor(&self, t: &Tensor) -> SharedTensor {
        self.map_shares(|s| s.zip_map(t, |a, b| a * b))
    }

    /// Add a public per-role value into the matching holders' shares. A
    /// replicated value lands in both shares (adding twice its logical
    /// value); the role-indexed form is how a public constant enters a
    /// sharing exactly once.
    ///
    /// # Panics
    /// If an entry names a role that holds no share, or shapes disagree.
    #[must_use]
    pub fn add_pub(&self, p: &PublicValue) -> SharedTensor {
        let prm = self.prm;
        let mut shares = self.shares.clone();
        for (role, t) in p.entries() {
            let slot = self
                .holder_slot(role)
                .unwrap_or_else(|| panic!("{role} holds no share"));
            shares[slot] = shares[slot].zip_map(t, |a, b| prm.reduce(a + b));
        }
        SharedTensor {
            shares,
            holders: self.holders,
            helper: self.helper,
            prm: self.prm,
            dtype: self.dtype,
        }
    }

    /// `p - self`, with `p` applied per role as in [`Self::add_pub`].
    #[must_use]
    pub fn rsub_pub(&self, p: &PublicValue) -> SharedTensor {
        (-self).add_pub(p)
    }

    /// A single element as a one-element sharing.
    #[must_use]
    pub fn element(&self, i: usize) -> SharedTensor {
        self.map_shares(|t| Tensor::scalar(t.get(i)))
    }

    #[must_use]
    pub fn reshape(&self, shape: &[usize]) -> SharedTensor {
        self.map_shares(|t| t.reshape(shape))
    }

    #[must_use]
    pub fn flatten(&self) -> SharedTensor {
        self.map_shares(Tensor::flatten)
    }
}

impl Add<&SharedTensor> for &SharedTensor {
    type Output = SharedTensor;
    fn add(self, rhs: &SharedTensor) -> SharedTensor {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Add<&SharedTensor> for SharedTensor {
    type Output = SharedTensor;
    fn add(self, rhs: &SharedTensor) -> SharedTensor {
        &self + rhs
    }
}

impl Add<SharedTensor> for &SharedTensor {
    type Output = SharedTensor;
    fn add(self, rhs: SharedTensor) -> SharedTensor {
        self + &rhs
    }
}

impl Add<SharedTensor> for SharedTensor {
    type Output = SharedTensor;
    fn add(self, rhs: SharedTensor) -> SharedTensor {
        &self + &rhs
    }
}

impl Sub<&SharedTensor> for &SharedTensor {
    type Output = SharedTensor;
    fn sub(self, rhs: &SharedTensor) -> SharedTensor {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Sub<&SharedTensor> for SharedTensor {
    type Output = SharedTensor;
    fn sub(self, rhs: &SharedTensor) -> SharedTensor {
        &self - rhs
    }
}

impl Sub<SharedTensor> for &SharedTensor {
    type Output = SharedTensor;
    fn sub(self, rhs: SharedTensor) -> SharedTensor {
        self - &rhs
    }
}

impl Sub<SharedTensor> for SharedTensor {
    type Output = SharedTensor;
    fn sub(self, rhs: SharedTensor) -> SharedTensor {
        &self - &rhs
    }
}

impl Neg for &SharedTensor {
    type Output = SharedTensor;
    fn neg(self) -> SharedTensor {
        self.map_shares(|t| t.map(|v| -v))
    }
}

impl Neg for SharedTensor {
    type Output = SharedTensor;
    fn neg(self) -> SharedTensor {
        -&self
    }
}

/// A public tensor carried per role. Replicas are usually identical (common
/// randomness, revealed thresholds); the role-indexed form is deliberately
/// asymmetric.
#[derive(Clone, Debug)]
pub struct PublicValue {
    entries: Vec<(Role, Tensor)>,
}

impl PublicValue {
    #[must_use]
    pub fn replicated(roles: &[Role], t: Tensor) -> Self {
        Self {
            entries: roles.iter().map(|&r| (r, t.clone())).collect(),
        }
    }

    /// Zero at Holder-0, `t` at Holder-1. Adding this into a sharing adds
    /// the public `t` to the secret exactly once.
    #[must_use]
    pub fn role_indexed(t: Tensor) -> Self {
        Self {
            entries: vec![
                (Role::Holder0, Tensor::zeros(t.shape())),
                (Role::Holder1, t),
            ],
        }
    }

    /// The 0/1 role index itself.
    #[must_use]
    pub fn role_index(shape: &[usize]) -> Self {
        Self::role_indexed(Tensor::filled(shape, 1))
    }

    /// The value shared by all replicas.
    ///
    /// # Panics
    /// If the replicas are not identical (asymmetric values have no common
    /// tensor).
    #[must_use]
    pub fn common(&self) -> &Tensor {
        let first = &self.entries[0].1;
        assert!(
            self.entries.iter().all(|(_, t)| t == first),
            "replicas disagree"
        );
        first
    }

    #[must_use]
    pub fn value_for(&self, role: Role) -> Option<&Tensor> {
        self.entries
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, t)| t)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Role, &Tensor)> {
        self.entries.iter().map(|(r, t)| (*r, t))
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.entries[0].1.shape()
    }

    /// Apply `f` to each role's replica independently.
    #[must_use]
    pub fn map(&self, f: impl Fn(&Tensor) -> Tensor) -> Self {
        Self {
            entries: self.entries.iter().map(|(r, t)| (*r, f(t))).collect(),
        }
    }
}
