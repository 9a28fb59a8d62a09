//! Secure max, its derivative, and 2-D max pooling.
//!
//! The maximum is a sequential tournament: keep a running (max, index) pair
//! and let `relu_deriv(candidate - max)` drive an oblivious select. The
//! comparison is strict, so ties keep the earlier element and the returned
//! index is the first occurrence.

use tracing::debug;

use crate::{
    error::Error,
    protocol::{
        context::Context, ensure_standard,
        randomness::{shared_random_value, shares_of_zero},
        relu::relu_deriv, select_share::select_share,
    },
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

/// Maximum of all elements and the index of its first occurrence, both as
/// fresh one-element sharings.
pub fn maxpool<C: Context>(
    ctx: &C,
    x: &SharedTensor,
) -> Result<(SharedTensor, SharedTensor), Error> {
    ensure_standard(x)?;
    let x = x.flatten();
    let n = x.len();
    let prm = x.prm();
    let holders = x.holders();
    let helper = x.helper();
    debug!(elements = n, "maxpool");

    let u = shares_of_zero(ctx, &[1], prm, DtypeClass::Standard, holders, helper)?;
    let v = shares_of_zero(ctx, &[1], prm, DtypeClass::Standard, holders, helper)?;

    let mut max = x.element(0);
    let mut index = ctx.share(
        holders[0],
        &Tensor::scalar(0),
        prm,
        DtypeClass::Standard,
        holders,
        helper,
    )?;
    for i in 1..n {
        let candidate = x.element(i);
        let wins = relu_deriv(ctx, &(&candidate - &max))?;
        max = select_share(ctx, &wins, &max, &candidate)?;
        let at = ctx.share(
            holders[0],
            &Tensor::scalar(i128::try_from(i).expect("index fits")),
            prm,
            DtypeClass::Standard,
            holders,
            helper,
        )?;
        index = select_share(ctx, &wins, &index, &at)?;
    }
    Ok((max + &u, index + &v))
}

/// One-hot derivative of [`maxpool`] over the input, with the winning
/// position hidden from everyone: the index sharing is blinded by a common
/// random offset before it is revealed, and the public one-hot is rolled
/// back into place.
pub fn maxpool_deriv<C: Context>(ctx: &C, x: &SharedTensor) -> Result<SharedTensor, Error> {
    ensure_standard(x)?;
    let shape = x.shape().to_vec();
    let flat = x.flatten();
    let n = flat.len();
    let n_i128 = i128::try_from(n).expect("length fits");
    let prm = flat.prm();
    let holders = flat.holders();
    let helper = flat.helper();

    let u = shares_of_zero(ctx, &[n], prm, DtypeClass::Standard, holders, helper)?;
    let offset = shared_random_value(ctx, prm, &holders, &[1])?;
    let (_, index) = maxpool(ctx, &flat)?;

    let blinded = index.add_pub(&PublicValue::role_indexed(offset.common().clone()));
    let k = ctx.reveal(&blinded)?.as_scalar().rem_euclid(n_i128);
    let g = offset.common().as_scalar().rem_euclid(n_i128);

    let mut one_hot = vec![0_i128; n];
    one_hot[usize::try_from(k).expect("in range")] = 1;
    let shared = ctx.share(
        holders[0],
        &Tensor::from_vec(one_hot),
        prm,
        DtypeClass::Standard,
        holders,
        helper,
    )?;
    let placed = shared.map_shares(|t| t.roll(-i64::try_from(g).expect("in range")));
    Ok((placed + &u).reshape(&shape))
}

/// 2-D max pooling over a 4-D input (batch, channel, rows, columns) with a
/// square kernel. Sweeps every window and applies [`maxpool`]; this is the
/// hot spot, and it stays a plain nested sweep on purpose.
pub fn maxpool2d<C: Context>(
    ctx: &C,
    x: &SharedTensor,
    kernel: usize,
    stride: usize,
    padding: usize,
) -> Result<SharedTensor, Error> {
    ensure_standard(x)?;
    assert!(kernel >= 1 && stride >= 1, "degenerate pooling window");
    let shape = x.shape().to_vec();
    assert_eq!(4, shape.len(), "maxpool2d needs a 4-D input");
    let (b, c) = (shape[0], shape[1]);
    let (h, w) = (shape[2] + 2 * padding, shape[3] + 2 * padding);
    assert!(h >= kernel && w >= kernel, "window larger than input");
    let h_out = (h - kernel) / stride + 1;
    let w_out = (w - kernel) / stride + 1;
    debug!(b, c, h_out, w_out, kernel, stride, padding, "maxpool2d");

    let padded = if padding > 0 {
        x.map_shares(|t| t.pad2d(padding))
    } else {
        x.clone()
    };

    let mut out0 = Vec::with_capacity(b * c * h_out * w_out);
    let mut out1 = Vec::with_capacity(b * c * h_out * w_out);
    let holders = x.holders();
    for bi in 0..b {
        for ci in 0..c {
            for oh in 0..h_out {
                for ow in 0..w_out {
                    let window =
                        padded.map_shares(|t| t.window2d(bi, ci, oh * stride, ow * stride, kernel, kernel));
                    let (m, _) = maxpool(ctx, &window)?;
                    out0.push(m.share_of(holders[0])?.as_scalar());
                    out1.push(m.share_of(holders[1])?.as_scalar());
                }
            }
        }
    }
    SharedTensor::from_shares(
        [
            Tensor::new(out0, vec![b, c, h_out, w_out]),
            Tensor::new(out1, vec![b, c, h_out, w_out]),
        ],
        holders,
        x.helper(),
        x.prm(),
        DtypeClass::Standard,
    )
}
