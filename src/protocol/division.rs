//! Integer division by bit trials.
//!
//! Classic long division under MPC: walk the quotient's bits from the top,
//! and at each trial ask (via the ReLU derivative) whether another
//! `2^i * y` still fits into the remaining dividend. The recurrence assumes
//! a positive divisor; the result is `floor(x / y)` for non-negative `x`
//! within the trial-bit precision. A zero remainder must count as "still
//! fits", hence the `+ 1` on the tested residual under the strict-positive
//! derivative.

use tracing::debug;

use crate::{
    error::Error,
    protocol::{
        context::Context, ensure_aligned, ensure_same_shape, ensure_standard,
        randomness::shares_of_zero, relu::relu_deriv,
    },
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

/// `floor(x / y)` over sharings. `y` may be a one-element sharing, which
/// divides every element of `x`. `trial_bits` bounds the quotient to
/// `[0, 2^trial_bits)` and defaults to half the field's storage width.
pub fn division<C: Context>(
    ctx: &C,
    x: &SharedTensor,
    y: &SharedTensor,
    trial_bits: Option<u32>,
) -> Result<SharedTensor, Error> {
    ensure_standard(x)?;
    ensure_aligned(x, y)?;
    if y.len() != 1 {
        ensure_same_shape(x, y)?;
    }
    let prm = x.prm();
    let bits = trial_bits.unwrap_or(prm.storage().bits() / 2);
    let shape = x.shape().to_vec();
    let x = x.flatten();
    let n = x.len();
    let y = if y.len() == 1 {
        y.map_shares(|t| t.broadcast_to(n))
    } else {
        y.flatten()
    };
    debug!(elements = n, bits, "division");

    let holders = x.holders();
    let helper = x.helper();
    let zeros = |c: &C| shares_of_zero(c, &[n], prm, DtypeClass::Standard, holders, helper);

    let mut used = zeros(ctx)?;
    let mut quotient = zeros(ctx)?;
    for i in (0..bits).rev() {
        let trial = y.mul_scalar(1_i128 << i);
        let pad = zeros(ctx)?;
        let residual = (&x - &used - &trial + &pad)
            .add_pub(&PublicValue::role_indexed(Tensor::filled(&[n], 1)));
        let fits = relu_deriv(ctx, &residual)?;
        used = &used + &ctx.multiply(&fits, &trial)?;
        quotient = &quotient + &fits.mul_scalar(1_i128 << i);
    }
    Ok((quotient + &zeros(ctx)?).reshape(&shape))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::division;
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
    fn exact_quotients() {
        let w = TestWorld::with_seed(51);
        let prm = FieldPrm::get(1 << 61);
        let x = w.share_plaintext(&Tensor::from_vec(vec![10, 9, 8, 0, 100]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![2, 3, 8, 5, 7]), prm);
        let q = division(&w, &x, &y, Some(8)).unwrap().reconstruct();
        assert_eq!(vec![5, 3, 1, 0, 14], q.data().to_vec());
    }

    #[test]
    fn scalar_divisor_broadcasts() {
        let w = TestWorld::with_seed(52);
        let prm = FieldPrm::get(1 << 61);
        let x = w.share_plaintext(&Tensor::from_vec(vec![0, 1, 5, 6, 11, 12]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![6]), prm);
        let q = division(&w, &x, &y, Some(8)).unwrap().reconstruct();
        assert_eq!(vec![0, 0, 0, 1, 1, 2], q.data().to_vec());
    }

    #[test]
    fn sampled_pairs() {
        let w = TestWorld::with_seed(53);
        let prm = FieldPrm::get(1 << 61);
        let mut rng = StdRng::seed_from_u64(17);
        let xs: Vec<i128> = (0..8).map(|_| rng.gen_range(0..=200)).collect();
        let ys: Vec<i128> = (0..8).map(|_| rng.gen_range(1..=20)).collect();
        let x = w.share_plaintext(&Tensor::from_vec(xs.clone()), prm);
        let y = w.share_plaintext(&Tensor::from_vec(ys.clone()), prm);
        let q = division(&w, &x, &y, Some(10)).unwrap().reconstruct();
        for i in 0..8 {
            assert_eq!(xs[i] / ys[i], q.get(i), "{} / {}", xs[i], ys[i]);
        }
    }

    #[test]
    fn preserves_shape() {
        let w = TestWorld::with_seed(54);
        let prm = FieldPrm::get(1 << 61);
        let x = w.share_plaintext(&Tensor::new(vec![4, 6, 8, 10], vec![2, 2]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![2]), prm);
        let q = division(&w, &x, &y, Some(6)).unwrap().reconstruct();
        assert_eq!(&[2, 2], q.shape());
        assert_eq!(vec![2, 3, 4, 5], q.data().to_vec());
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let w = TestWorld::with_seed(55);
        let prm = FieldPrm::get(1 << 61);
        let x = w.share_plaintext(&Tensor::from_vec(vec![1, 2, 3]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![1, 2]), prm);
        assert!(matches!(
            division(&w, &x, &y, Some(4)),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn rejects_bridging_input() {
        let w = TestWorld::with_seed(56);
        let prm = FieldPrm::get(1 << 61);
        let x = w
            .share(
                Role::Holder0,
                &Tensor::from_vec(vec![4]),
                prm,
                DtypeClass::Bridging,
                Role::holders(),
                Role::Helper,
            )
            .unwrap();
        let y = w.share_plaintext(&Tensor::from_vec(vec![2]), prm);
        assert!(matches!(
            division(&w, &x, &y, None),
            Err(Error::InvalidDtype)
        ));
    }
}
