//! Oblivious ternary select.
//!
//! `select(alpha, x, y) = x + alpha * (y - x)`, so a shared bit picks one of
//! two sharings with a single secure multiplication, plus a zero-share to
//! re-randomize the output.

use crate::{
    error::Error,
    protocol::{context::Context, ensure_aligned, ensure_same_shape, ensure_standard, randomness::shares_of_zero},
    secret_sharing::SharedTensor,
};

/// Returns a sharing of `y` where `alpha` is 1 and of `x` where it is 0.
pub fn select_share<C: Context>(
    ctx: &C,
    alpha: &SharedTensor,
    x: &SharedTensor,
    y: &SharedTensor,
) -> Result<SharedTensor, Error> {
    ensure_standard(alpha)?;
    ensure_aligned(alpha, x)?;
    ensure_aligned(x, y)?;
    ensure_same_shape(alpha, x)?;
    ensure_same_shape(x, y)?;

    let u = shares_of_zero(ctx, x.shape(), x.prm(), x.dtype(), x.holders(), x.helper())?;
    let c = ctx.multiply(alpha, &(y - x))?;
    Ok(x + &c + &u)
}

#[cfg(test)]
mod tests {
    use super::select_share;
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
    fn picks_per_element() {
        let w = TestWorld::with_seed(3);
        let prm = FieldPrm::get(1 << 33);
        let alpha = w.share_plaintext(&Tensor::from_vec(vec![0, 1, 1, 0]), prm);
        let x = w.share_plaintext(&Tensor::from_vec(vec![10, 20, -30, 40]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![-1, -2, -3, -4]), prm);

        let z = select_share(&w, &alpha, &x, &y).unwrap();
        assert_eq!(vec![10, -2, -3, 40], z.reconstruct().data().to_vec());
    }

    #[test]
    fn output_shares_are_rerandomized() {
        let w = TestWorld::with_seed(3);
        let prm = FieldPrm::get(1 << 33);
        let alpha = w.share_plaintext(&Tensor::from_vec(vec![0]), prm);
        let x = w.share_plaintext(&Tensor::from_vec(vec![10]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![20]), prm);

        let z = select_share(&w, &alpha, &x, &y).unwrap();
        assert_eq!(10, z.reconstruct().as_scalar());
        assert_ne!(
            x.share_of(Role::Holder0).unwrap(),
            z.share_of(Role::Holder0).unwrap()
        );
    }

    #[test]
    fn rejects_bridging_inputs() {
        let w = TestWorld::with_seed(3);
        let prm = FieldPrm::get(1 << 33);
        let alpha = w.share_plaintext(&Tensor::from_vec(vec![1]), prm);
        let x = w.share_plaintext(&Tensor::from_vec(vec![1]), prm);
        let y = w
            .share(
                Role::Holder0,
                &Tensor::from_vec(vec![2]),
                prm,
                DtypeClass::Bridging,
                Role::holders(),
                Role::Helper,
            )
            .unwrap();
        assert!(matches!(
            select_share(&w, &alpha, &x, &y),
            Err(Error::InvalidDtype)
        ));
    }

    #[test]
    fn rejects_field_mismatch() {
        let w = TestWorld::with_seed(3);
        let alpha = w.share_plaintext(&Tensor::from_vec(vec![1]), FieldPrm::get(1 << 33));
        let x = w.share_plaintext(&Tensor::from_vec(vec![1]), FieldPrm::get(1 << 33));
        let y = w.share_plaintext(&Tensor::from_vec(vec![2]), FieldPrm::get(1 << 32));
        assert!(matches!(
            select_share(&w, &alpha, &x, &y),
            Err(Error::FieldMismatch(_, _))
        ));
    }

    #[test]
    fn rejects_shape_mismatch() {
        let w = TestWorld::with_seed(3);
        let prm = FieldPrm::get(1 << 33);
        let alpha = w.share_plaintext(&Tensor::from_vec(vec![1]), prm);
        let x = w.share_plaintext(&Tensor::from_vec(vec![1]), prm);
        let y = w.share_plaintext(&Tensor::from_vec(vec![2, 3]), prm);
        assert!(matches!(
            select_share(&w, &alpha, &x, &y),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn use_share_of_requires_a_holder() {
        let w = TestWorld::with_seed(3);
        let x = w.share_plaintext(&Tensor::from_vec(vec![1]), FieldPrm::get(1 << 33));
        assert!(matches!(
            x.share_of(Role::Helper),
            Err(Error::NotAHolder(Role::Helper))
        ));
    }
}
