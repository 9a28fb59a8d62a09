//! Common-randomness generators.
//!
//! Each helper samples at one role and distributes through the engine, so a
//! transcript never reuses randomness across invocations.

use crate::{
    error::Error,
    ff::FieldPrm,
    helpers::Role,
    protocol::context::Context,
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

/// Uniform bits in `{0, 1}`, known identically to every role in `roles`.
pub fn shared_random_bit<C: Context>(
    ctx: &C,
    roles: &[Role],
    shape: &[usize],
) -> Result<PublicValue, Error> {
    let bits = ctx.sample_at(roles[0], 0, 2, shape);
    ctx.replicate(roles[0], bits, roles)
}

/// Uniform values in `[1, max_val(max))`, known identically to every role in
/// `roles`.
pub fn shared_random_value<C: Context>(
    ctx: &C,
    max: &FieldPrm,
    roles: &[Role],
    shape: &[usize],
) -> Result<PublicValue, Error> {
    let values = ctx.sample_at(roles[0], 1, max.max_val(), shape);
    ctx.replicate(roles[0], values, roles)
}

/// A fresh additive sharing of zero, used to re-randomize protocol outputs.
pub fn shares_of_zero<C: Context>(
    ctx: &C,
    shape: &[usize],
    prm: &'static FieldPrm,
    dtype: DtypeClass,
    holders: [Role; 2],
    helper: Role,
) -> Result<SharedTensor, Error> {
    ctx.share(holders[0], &Tensor::zeros(shape), prm, dtype, holders, helper)
}
