//! Sign-bit extraction.
//!
//! Works on a sharing in an odd field `N` (the value's true field is
//! `N + 1`, one bit wider). The helper deals a random `x` in three parallel
//! encodings, the holders reveal `r = 2a + x` (perfectly blinded by `x`),
//! and private comparison of `x` against `r` yields the wrap bit that equals
//! the sign. Downstream operators learn "is this negative" only through this
//! path.

use tracing::debug;

use crate::{
    error::Error,
    ff::{self, FieldPrm, bit_field},
    protocol::{
        compare::private_compare,
        context::Context,
        randomness::{shared_random_bit, shares_of_zero},
    },
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
};

/// Returns a fresh sharing, in field `N + 1`, of the sign bit of `a` (1 for
/// negative balanced values, 0 otherwise).
pub fn msb<C: Context>(ctx: &C, a: &SharedTensor) -> Result<SharedTensor, Error> {
    let n_prm = a.prm();
    let l_prm = FieldPrm::get(n_prm.modulus() + 1);
    let shape = a.shape().to_vec();
    let a = a.flatten();
    let n = a.len();
    let holders = a.holders();
    let helper = a.helper();
    debug!(elements = n, field = n_prm.modulus(), "msb");

    let beta = shared_random_bit(ctx, &holders, &[n])?;
    let u = shares_of_zero(ctx, &[n], l_prm, DtypeClass::Standard, holders, helper)?;

    // the helper's blind, dealt in three encodings
    let x = ctx.sample_at(helper, 0, n_prm.max_val(), &[n]);
    let x_sh = ctx.share(helper, &x, n_prm, a.dtype(), holders, helper)?;
    let x_lsb = ctx.share(
        helper,
        &x.map(|v| v & 1),
        l_prm,
        DtypeClass::Standard,
        holders,
        helper,
    )?;
    let x_bits = ctx.share(
        helper,
        &ff::decompose(&x, l_prm.bits()),
        bit_field(),
        DtypeClass::Bridging,
        holders,
        helper,
    )?;

    let r = ctx.reveal(&(a.mul_scalar(2) + &x_sh))?;
    let r_u = r.map(|v| n_prm.unsigned(v));
    let r_pub = ctx.replicate(holders[0], r_u.clone(), &holders)?;

    let beta_p = private_compare(ctx, &x_bits, &r_pub, &beta, l_prm)?;
    let beta_p = ctx.share(holders[0], &beta_p, l_prm, DtypeClass::Standard, holders, helper)?;

    // gamma = beta XOR beta', delta = lsb(x) XOR lsb(r); msb = gamma XOR delta
    let beta_c = beta.common();
    let gamma = (&beta_p - &beta_p.mul_tensor(&beta_c.map(|b| 2 * b)))
        .add_pub(&PublicValue::role_indexed(beta_c.clone()));
    let r0 = r_u.map(|v| v & 1);
    let delta = (&x_lsb - &x_lsb.mul_tensor(&r0.map(|b| 2 * b)))
        .add_pub(&PublicValue::role_indexed(r0));
    let theta = ctx.multiply(&gamma, &delta)?;

    Ok((gamma + &delta - theta.mul_scalar(2) + &u).reshape(&shape))
}
