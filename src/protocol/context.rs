//! The seam between the protocols and the sharing engine.
//!
//! Everything that costs a round trip (or fresh correlated randomness) goes
//! through this trait; linear share arithmetic stays local on
//! [`SharedTensor`]. Calls block until the round trip completes, and engine
//! failures surface as errors.

use crate::{
    error::Error,
    ff::FieldPrm,
    helpers::Role,
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

pub trait Context {
    /// Create a fresh additive sharing of a plaintext originating at
    /// `origin`.
    fn share(
        &self,
        origin: Role,
        value: &Tensor,
        prm: &'static FieldPrm,
        dtype: DtypeClass,
        holders: [Role; 2],
        helper: Role,
    ) -> Result<SharedTensor, Error>;

    /// Secure elementwise multiplication of two sharings. One helper round
    /// trip.
    fn multiply(&self, a: &SharedTensor, b: &SharedTensor) -> Result<SharedTensor, Error>;

    /// Reconstruct the plaintext for the calling context.
    fn reveal(&self, a: &SharedTensor) -> Result<Tensor, Error>;

    /// Reconstruct the plaintext for exactly one role. Nobody else learns
    /// it.
    fn reveal_to(&self, a: &SharedTensor, role: Role) -> Result<Tensor, Error>;

    /// Distribute a tensor originating at `origin` identically to every role
    /// in `roles`.
    fn replicate(&self, origin: Role, value: Tensor, roles: &[Role])
    -> Result<PublicValue, Error>;

    /// A tensor of values drawn uniformly from `[low, high)`, sampled
    /// locally at `role`.
    fn sample_at(&self, role: Role, low: i128, high: i128, shape: &[usize]) -> Tensor;

    /// A uniform permutation of `0..len`, sampled locally at `role`.
    fn sample_permutation_at(&self, role: Role, len: usize) -> Vec<usize>;
}
