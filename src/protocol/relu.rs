//! ReLU and its derivative.
//!
//! The derivative is strict positivity: 1 where the plaintext is positive,
//! 0 at and below zero. Sign extraction of `2a` alone would report zero as
//! positive, so the tested value is `2a - 1` (odd, never zero), the `-1`
//! entering through the role index.

use crate::{
    error::Error,
    protocol::{
        context::Context, ensure_standard, msb::msb, randomness::shares_of_zero,
        share_conversion::share_convert,
    },
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

/// A fresh sharing of `1` where `a > 0` and `0` elsewhere.
pub fn relu_deriv<C: Context>(ctx: &C, a: &SharedTensor) -> Result<SharedTensor, Error> {
    ensure_standard(a)?;
    let shape = a.shape().to_vec();
    let a = a.flatten();
    let n = a.len();

    let u = shares_of_zero(
        ctx,
        &[n],
        a.prm(),
        DtypeClass::Standard,
        a.holders(),
        a.helper(),
    )?;
    let odd = a
        .mul_scalar(2)
        .add_pub(&PublicValue::role_indexed(Tensor::filled(&[n], -1)));
    let alpha = msb(ctx, &share_convert(ctx, &odd)?)?;
    // positivity = 1 - sign
    let pos = alpha.rsub_pub(&PublicValue::role_index(&[n]));
    Ok((pos + &u).reshape(&shape))
}

/// `a * relu_deriv(a)`, re-randomized. One secure multiplication on top of
/// the derivative.
pub fn relu<C: Context>(ctx: &C, a: &SharedTensor) -> Result<SharedTensor, Error> {
    ensure_standard(a)?;
    let shape = a.shape().to_vec();
    let flat = a.flatten();
    let u = shares_of_zero(
        ctx,
        &[flat.len()],
        flat.prm(),
        DtypeClass::Standard,
        flat.holders(),
        flat.helper(),
    )?;
    let d = relu_deriv(ctx, &flat)?;
    let p = ctx.multiply(&flat, &d)?;
    Ok((p + &u).reshape(&shape))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::{relu, relu_deriv};
    use crate::{
        error::Error,
        ff::FieldPrm,
        helpers::Role,
        protocol::context::Context,
        secret_sharing::DtypeClass,
        tensor::Tensor,
        test_fixture::{Reconstruct, TestWorld},
    };

    #[test]
    fn derivative_is_strict_positivity() {
        let w = TestWorld::with_seed(41);
        let prm = FieldPrm::get(1 << 61);
        let a = w.share_plaintext(&Tensor::from_vec(vec![5, 0, -5, 1, -1, 123_456]), prm);
        let d = relu_deriv(&w, &a).unwrap().reconstruct();
        assert_eq!(vec![1, 0, 0, 1, 0, 1], d.data().to_vec());
    }

    #[test]
    fn zero_maps_to_zero() {
        // ties at zero resolve downward
        let w = TestWorld::with_seed(42);
        let prm = FieldPrm::get(1 << 61);
        let a = w.share_plaintext(&Tensor::from_vec(vec![0]), prm);
        assert_eq!(0, relu_deriv(&w, &a).unwrap().reconstruct().as_scalar());
        assert_eq!(0, relu(&w, &a).unwrap().reconstruct().as_scalar());
    }

    #[test]
    fn relu_clamps_negatives() {
        let w = TestWorld::with_seed(43);
        let prm = FieldPrm::get(1 << 61);
        let a = w.share_plaintext(&Tensor::from_vec(vec![7, -3, 0, 10_000, -10_000]), prm);
        let r = relu(&w, &a).unwrap().reconstruct();
        assert_eq!(vec![7, 0, 0, 10_000, 0], r.data().to_vec());
    }

    #[test]
    fn sampled_values() {
        let w = TestWorld::with_seed(44);
        let prm = FieldPrm::get(1 << 61);
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<i128> = (0..32).map(|_| rng.gen_range(-100_000..=100_000)).collect();
        let a = w.share_plaintext(&Tensor::from_vec(values.clone()), prm);
        let r = relu(&w, &a).unwrap().reconstruct();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(v.max(0), r.get(i), "value {v}");
        }
    }

    #[test]
    fn preserves_shape() {
        let w = TestWorld::with_seed(45);
        let prm = FieldPrm::get(1 << 61);
        let a = w.share_plaintext(&Tensor::new(vec![1, -1, 2, -2, 3, -3], vec![2, 3]), prm);
        let r = relu(&w, &a).unwrap().reconstruct();
        assert_eq!(&[2, 3], r.shape());
        assert_eq!(vec![1, 0, 2, 0, 3, 0], r.data().to_vec());
    }

    #[test]
    fn rejects_bridging_input() {
        let w = TestWorld::with_seed(46);
        let prm = FieldPrm::get(1 << 61);
        let a = w
            .share(
                Role::Holder0,
                &Tensor::from_vec(vec![1]),
                prm,
                DtypeClass::Bridging,
                Role::holders(),
                Role::Helper,
            )
            .unwrap();
        assert!(matches!(relu_deriv(&w, &a), Err(Error::InvalidDtype)));
        assert!(matches!(relu(&w, &a), Err(Error::InvalidDtype)));
    }
}
