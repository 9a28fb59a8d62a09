//! An in-memory stand-in for the sharing engine.
//!
//! [`TestWorld`] plays all three roles at once: sharings are split with a
//! seeded rng, secure multiplication is reconstruct-multiply-reshare (the
//! engine's contract is a fresh sharing of the product; the real
//! multiplication sub-protocol belongs to the engine, not to this crate),
//! and restricted reveals are recorded so tests can inspect what the helper
//! would have observed.

pub mod logging;

use std::sync::Mutex;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    error::Error,
    ff::FieldPrm,
    helpers::Role,
    protocol::{context::Context, ensure_aligned, ensure_same_shape},
    secret_sharing::{DtypeClass, PublicValue, SharedTensor},
    tensor::Tensor,
};

pub struct TestWorld {
    rng: Mutex<StdRng>,
    observed: Mutex<Vec<Tensor>>,
}

impl TestWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic world; protocol tests pin their seeds so sharing
    /// randomness never flakes.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        logging::setup();
        Self {
            rng: Mutex::new(rng),
            observed: Mutex::new(Vec::new()),
        }
    }

    /// Share a plaintext between the canonical holders as a standard-dtype
    /// sharing.
    #[must_use]
    pub fn share_plaintext(&self, value: &Tensor, prm: &'static FieldPrm) -> SharedTensor {
        self.share(
            Role::Holder0,
            value,
            prm,
            DtypeClass::Standard,
            Role::holders(),
            Role::Helper,
        )
        .unwrap()
    }

    /// Everything revealed to the helper so far, in order.
    #[must_use]
    pub fn helper_observations(&self) -> Vec<Tensor> {
        self.observed.lock().unwrap().clone()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Context for TestWorld {
    fn share(
        &self,
        _origin: Role,
        value: &Tensor,
        prm: &'static FieldPrm,
        dtype: DtypeClass,
        holders: [Role; 2],
        helper: Role,
    ) -> Result<SharedTensor, Error> {
        let mut rng = self.rng.lock().unwrap();
        let data: Vec<i128> = (0..value.len())
            .map(|_| rng.gen_range(prm.min_val()..=prm.max_val()))
            .collect();
        let s0 = Tensor::new(data, value.shape().to_vec());
        let s1 = value.zip_map(&s0, |v, s| prm.reduce(v - s));
        SharedTensor::from_shares([s0, s1], holders, helper, prm, dtype)
    }

    fn multiply(&self, a: &SharedTensor, b: &SharedTensor) -> Result<SharedTensor, Error> {
        ensure_aligned(a, b)?;
        ensure_same_shape(a, b)?;
        let prm = a.prm();
        let product = self
            .reveal(a)?
            .zip_map(&self.reveal(b)?, |x, y| prm.reduce(x * y));
        self.share(
            a.holders()[0],
            &product,
            prm,
            a.dtype(),
            a.holders(),
            a.helper(),
        )
    }

    fn reveal(&self, a: &SharedTensor) -> Result<Tensor, Error> {
        let prm = a.prm();
        let [h0, h1] = a.holders();
        Ok(a.share_of(h0)?
            .zip_map(a.share_of(h1)?, |x, y| prm.reduce(x + y)))
    }

    fn reveal_to(&self, a: &SharedTensor, role: Role) -> Result<Tensor, Error> {
        let plain = self.reveal(a)?;
        if role == a.helper() {
            self.observed.lock().unwrap().push(plain.clone());
        }
        Ok(plain)
    }

    fn replicate(
        &self,
        _origin: Role,
        value: Tensor,
        roles: &[Role],
    ) -> Result<PublicValue, Error> {
        Ok(PublicValue::replicated(roles, value))
    }

    fn sample_at(&self, _role: Role, low: i128, high: i128, shape: &[usize]) -> Tensor {
        let mut rng = self.rng.lock().unwrap();
        let data: Vec<i128> = (0..shape.iter().product())
            .map(|_| rng.gen_range(low..high))
            .collect();
        Tensor::new(data, shape.to_vec())
    }

    fn sample_permutation_at(&self, _role: Role, len: usize) -> Vec<usize> {
        let mut perm: Vec<usize> = (0..len).collect();
        perm.shuffle(&mut *self.rng.lock().unwrap());
        perm
    }
}

/// Recover the plaintext from the orchestrator's view of a sharing.
pub trait Reconstruct {
    fn reconstruct(&self) -> Tensor;
}

impl Reconstruct for SharedTensor {
    fn reconstruct(&self) -> Tensor {
        let prm = self.prm();
        let [h0, h1] = self.holders();
        self.share_of(h0)
            .unwrap()
            .zip_map(self.share_of(h1).unwrap(), |x, y| prm.reduce(x + y))
    }
}
