//! Field encoding.
//!
//! Every sharing lives in some ring `Z_L`; values are stored as the balanced
//! signed representative of their residue class, in `[min_val, max_val]`.
//! Parameters are pure functions of the modulus and are memoized in a global
//! cache so that sharings can carry a `&'static` reference.

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::tensor::Tensor;

/// The small prime field used for additive sharings of individual bits. It
/// only needs to dominate the carry counts of the comparison protocol.
pub const BIT_PRIME: i128 = 67;

#[must_use]
pub fn bit_field() -> &'static FieldPrm {
    FieldPrm::get(BIT_PRIME)
}

/// Machine-word class of the tensor engine expected to store a field's
/// values.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StorageClass {
    Narrow,
    Wide,
}

impl StorageClass {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Narrow => 32,
            Self::Wide => 64,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldPrm {
    modulus: i128,
    bits: u32,
    storage: StorageClass,
    max_val: i128,
    min_val: i128,
    wrap_mask: i128,
}

static PARAMS: Lazy<DashMap<i128, &'static FieldPrm>> = Lazy::new(DashMap::new);

impl FieldPrm {
    /// Parameters for modulus `L`, from the global cache.
    ///
    /// # Panics
    /// If `L` is not in `[2, 2^64]`.
    #[must_use]
    pub fn get(modulus: i128) -> &'static FieldPrm {
        assert!(
            modulus >= 2 && modulus <= 1_i128 << 64,
            "unsupported modulus {modulus}"
        );
        if let Some(prm) = PARAMS.get(&modulus) {
            return *prm;
        }
        let leaked: &'static FieldPrm = Box::leak(Box::new(Self::compute(modulus)));
        *PARAMS.entry(modulus).or_insert(leaked)
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn compute(modulus: i128) -> FieldPrm {
        let bits = (modulus as f64).log2().round() as u32;
        let storage = if modulus > 1_i128 << 32 {
            StorageClass::Wide
        } else {
            StorageClass::Narrow
        };
        FieldPrm {
            modulus,
            bits,
            storage,
            max_val: (modulus - 1) / 2,
            min_val: -(modulus / 2),
            wrap_mask: modulus / 2 - 1,
        }
    }

    #[must_use]
    pub fn modulus(&self) -> i128 {
        self.modulus
    }

    /// Rounded log2 of the modulus; the bit width of the field's values.
    #[must_use]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    #[must_use]
    pub fn storage(&self) -> StorageClass {
        self.storage
    }

    #[must_use]
    pub fn max_val(&self) -> i128 {
        self.max_val
    }

    #[must_use]
    pub fn min_val(&self) -> i128 {
        self.min_val
    }

    #[must_use]
    pub fn wrap_mask(&self) -> i128 {
        self.wrap_mask
    }

    /// Balanced representative of `v`'s residue class, in
    /// `[min_val, max_val]`.
    #[must_use]
    pub fn reduce(&self, v: i128) -> i128 {
        let r = v.rem_euclid(self.modulus);
        if r > self.max_val { r - self.modulus } else { r }
    }

    /// Unsigned representative of `v`'s residue class, in `[0, modulus)`.
    #[must_use]
    pub fn unsigned(&self, v: i128) -> i128 {
        v.rem_euclid(self.modulus)
    }
}

/// Expand each element into its low `bits` bits, LSB first, as a new trailing
/// axis. Bits are taken from the unsigned residue modulo `2^bits`, so
/// negative balanced representatives decompose the same way as the positive
/// value they encode.
#[must_use]
pub fn decompose(t: &Tensor, bits: u32) -> Tensor {
    let span = 1_i128 << bits;
    let width = bits as usize;
    let mut shape = t.shape().to_vec();
    shape.push(width);
    let mut data = Vec::with_capacity(t.len() * width);
    for &v in t.data() {
        let u = v.rem_euclid(span);
        for i in 0..bits {
            data.push((u >> i) & 1);
        }
    }
    Tensor::new(data, shape)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{BIT_PRIME, FieldPrm, StorageClass, decompose};
    use crate::tensor::Tensor;

    #[test]
    fn parameters_for_known_moduli() {
        let p = FieldPrm::get(BIT_PRIME);
        assert_eq!(67, p.modulus());
        assert_eq!(6, p.bits());
        assert_eq!(StorageClass::Narrow, p.storage());
        assert_eq!(33, p.max_val());
        assert_eq!(-33, p.min_val());
        assert_eq!(32, p.wrap_mask());

        let p = FieldPrm::get(1 << 32);
        assert_eq!(32, p.bits());
        assert_eq!(StorageClass::Narrow, p.storage());

        let p = FieldPrm::get(1 << 33);
        assert_eq!(33, p.bits());
        assert_eq!(StorageClass::Wide, p.storage());
        assert_eq!((1_i128 << 32) - 1, p.wrap_mask());

        let p = FieldPrm::get(1 << 64);
        assert_eq!(64, p.bits());
        assert_eq!((1_i128 << 63) - 1, p.max_val());
        assert_eq!(-(1_i128 << 63), p.min_val());
    }

    #[test]
    fn odd_companion_field() {
        let p = FieldPrm::get((1 << 33) - 1);
        // rounds up to the bit width of the even field it bridges from
        assert_eq!(33, p.bits());
        assert_eq!((1_i128 << 32) - 1, p.max_val());
        assert_eq!(-(((1_i128 << 33) - 1) / 2), p.min_val());
    }

    #[test]
    fn cache_returns_identical_references() {
        let a: *const FieldPrm = FieldPrm::get(67);
        let b: *const FieldPrm = FieldPrm::get(67);
        assert_eq!(a, b);
    }

    #[test]
    fn decompose_known_values() {
        let t = Tensor::from_vec(vec![0, 1, 6, 10]);
        let bits = decompose(&t, 4);
        assert_eq!(&[4, 4], bits.shape());
        assert_eq!(
            &[0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 0, 1, 0, 1],
            bits.data()
        );
    }

    #[test]
    fn decompose_uses_the_unsigned_residue() {
        // -1 mod 2^4 = 15 = all ones
        let bits = decompose(&Tensor::scalar(-1), 4);
        assert_eq!(&[1, 1, 1, 1], bits.data());
    }

    proptest! {
        #[test]
        fn reduce_lands_in_the_balanced_range(v in any::<i64>(), bits in 4_u32..=40) {
            let prm = FieldPrm::get(1_i128 << bits);
            let r = prm.reduce(i128::from(v));
            prop_assert!(r >= prm.min_val() && r <= prm.max_val());
            prop_assert_eq!(r.rem_euclid(prm.modulus()), i128::from(v).rem_euclid(prm.modulus()));
        }

        #[test]
        fn reduce_is_additive(a in any::<i64>(), b in any::<i64>()) {
            let prm = FieldPrm::get(1_i128 << 33);
            let (a, b) = (i128::from(a), i128::from(b));
            prop_assert_eq!(prm.reduce(a + b), prm.reduce(prm.reduce(a) + prm.reduce(b)));
        }

        #[test]
        fn decompose_reconstructs_the_residue(v in any::<i64>(), bits in 1_u32..=64) {
            let t = Tensor::scalar(i128::from(v));
            let d = decompose(&t, bits);
            let mut acc = 0_i128;
            for i in (0..bits as usize).rev() {
                acc = acc * 2 + d.get(i);
            }
            prop_assert_eq!(acc, i128::from(v).rem_euclid(1_i128 << bits));
        }
    }
}
