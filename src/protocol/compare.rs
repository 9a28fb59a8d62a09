//! Private comparison.
//!
//! The holders keep a bitwise sharing of `x` (mod 67) and both know a public
//! threshold `r` and masking bit `beta`; the helper learns only a blinded,
//! permuted vector per element and announces `beta XOR (x > r)`.
//!
//! Operands are treated as unsigned l-bit strings, `l` being the bit width
//! of the `domain` field. Three candidate vectors are always computed and
//! blended by public masks, so control flow never depends on a secret: the
//! `beta = 0` string compares against `r`, the `beta = 1` string against
//! `r + 1`, and a third covers `r` being the all-ones string, where `r + 1`
//! does not exist.

use tracing::debug;

use crate::{
    error::{Error, ShapeError},
    ff::{self, BIT_PRIME, FieldPrm},
    protocol::context::Context,
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

/// For each row of `x_bits` (shape `[n, l]`, shared mod 67), reveals
/// `beta XOR (x > r)` as a 0/1 tensor of shape `[n]`.
///
/// `r` must carry unsigned residues; `domain` fixes the bit width `l`.
pub fn private_compare<C: Context>(
    ctx: &C,
    x_bits: &SharedTensor,
    r: &PublicValue,
    beta: &PublicValue,
    domain: &FieldPrm,
) -> Result<Tensor, Error> {
    let bit_prm = x_bits.prm();
    if bit_prm.modulus() != BIT_PRIME {
        return Err(Error::FieldMismatch(bit_prm.modulus(), BIT_PRIME));
    }
    let l = domain.bits() as usize;
    let rows = r.common().len();
    if x_bits.shape() != [rows, l] {
        return Err(Error::ShapeMismatch(ShapeError {
            expected: vec![rows, l],
            actual: x_bits.shape().to_vec(),
        }));
    }
    let holders = x_bits.holders();

    let span = 1_i128 << domain.bits();
    let r_u = r.common().map(|v| v.rem_euclid(span));
    let t_u = r_u.map(|v| (v + 1).rem_euclid(span));
    let r_bits = ff::decompose(&r_u, domain.bits());
    let t_bits = ff::decompose(&t_u, domain.bits());

    // beta == 0 candidate: c_i = -x_i + r_i + 1 + sum of w past position i,
    // with w_i = x_i XOR r_i expressed arithmetically
    let w0 = (x_bits - &x_bits.mul_tensor(&r_bits).mul_scalar(2))
        .add_pub(&PublicValue::role_indexed(r_bits.clone()));
    let c0 = (-x_bits + &suffix_sums(&w0))
        .add_pub(&PublicValue::role_indexed(r_bits.map(|b| b + 1)));

    // beta == 1 candidate: same shape against t = r + 1
    let w1 = (x_bits - &x_bits.mul_tensor(&t_bits).mul_scalar(2))
        .add_pub(&PublicValue::role_indexed(t_bits.clone()));
    let c1 = (x_bits + &suffix_sums(&w1))
        .add_pub(&PublicValue::role_indexed(t_bits.map(|b| 1 - b)));

    // all-ones candidate: nothing exceeds r, so encode "not greater": zero
    // at the lowest position, nonzero elsewhere, split across the holders
    let u = ctx
        .replicate(
            holders[0],
            ctx.sample_at(holders[0], 1, BIT_PRIME, &[rows, l]),
            &holders,
        )?
        .common()
        .clone();
    let corner = corner_candidate(&u, rows, l, x_bits)?;

    let beta_c = beta.common();
    let is_max = r_u.map(|v| i128::from(v == span - 1));
    let m0 = beta_c.map(|b| 1 - b).expand_last(l);
    let m1 = beta_c.zip_map(&is_max, |b, c| b * (1 - c)).expand_last(l);
    let m2 = beta_c.zip_map(&is_max, |b, c| b * c).expand_last(l);
    let c = c0.mul_tensor(&m0) + c1.mul_tensor(&m1) + corner.mul_tensor(&m2);

    // fresh nonzero blinds and a fresh permutation of the bit axis
    let s = ctx.replicate(
        holders[0],
        ctx.sample_at(holders[0], 1, BIT_PRIME, &[rows, l]),
        &holders,
    )?;
    let perm = ctx.sample_permutation_at(holders[0], l);
    let blinded = c
        .mul_tensor(s.common())
        .map_shares(|t| t.permute_last(&perm));

    let opened = ctx.reveal_to(&blinded, x_bits.helper())?;
    let counts: Vec<i128> = opened
        .data()
        .chunks(l)
        .map(|row| i128::try_from(row.iter().filter(|&&v| v == 0).count()).expect("fits"))
        .collect();
    debug!(rows, bits = l, "private compare opened");
    Ok(Tensor::from_vec(counts))
}

/// Suffix sums along the bit axis, excluding the element itself.
fn suffix_sums(w: &SharedTensor) -> SharedTensor {
    let axis = w.shape().len() - 1;
    &w.map_shares(|t| t.flip(axis).cumsum(axis).flip(axis)) - w
}

fn corner_candidate(
    u: &Tensor,
    rows: usize,
    l: usize,
    like: &SharedTensor,
) -> Result<SharedTensor, Error> {
    let mut s0 = Vec::with_capacity(rows * l);
    let mut s1 = Vec::with_capacity(rows * l);
    for row in 0..rows {
        for i in 0..l {
            let v = u.get(row * l + i);
            s0.push(if i == 0 { v } else { v + 1 });
            s1.push(-v);
        }
    }
    SharedTensor::from_shares(
        [
            Tensor::new(s0, vec![rows, l]),
            Tensor::new(s1, vec![rows, l]),
        ],
        like.holders(),
        like.helper(),
        like.prm(),
        DtypeClass::Bridging,
    )
}
