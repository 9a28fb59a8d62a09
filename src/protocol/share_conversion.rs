//! Re-fielding from `Z_L` to `Z_{L-1}`.
//!
//! Sign extraction needs the value one bit narrower than its sharing's
//! field, so callers convert before calling [`crate::protocol::msb::msb`].
//! This is the reference short-cut: each holder re-reduces its share modulo
//! `L - 1` and the result is re-randomized with a fresh zero-share. The
//! wrap of the original shares is not corrected, so conversion is exact only
//! with probability `1 - O(|a| / L)` per element; callers keep magnitudes
//! far below the field size.

use crate::{
    error::Error,
    ff::FieldPrm,
    protocol::{context::Context, ensure_standard, randomness::shares_of_zero},
    secret_sharing::{DtypeClass, SharedTensor},
};

/// Convert a standard sharing in field `L` into a bridging sharing of the
/// same value in field `L - 1`.
pub fn share_convert<C: Context>(ctx: &C, a: &SharedTensor) -> Result<SharedTensor, Error> {
    ensure_standard(a)?;
    let n_prm = FieldPrm::get(a.prm().modulus() - 1);
    let holders = a.holders();
    let helper = a.helper();

    let u = shares_of_zero(ctx, a.shape(), n_prm, DtypeClass::Bridging, holders, helper)?;
    let refielded = SharedTensor::from_shares(
        [
            a.share_of(holders[0])?.clone(),
            a.share_of(holders[1])?.clone(),
        ],
        holders,
        helper,
        n_prm,
        DtypeClass::Bridging,
    )?;
    Ok(&refielded + &u)
}
