//! Common test utilities
#![allow(dead_code)]

use batchblas::dtype::{Complex64, Complex128, Element};
use batchblas::handle::Handle;
use batchblas::memory::HostBatch;
use batchblas::runtime::Runtime;
use batchblas::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a handle with default configuration on a fresh CPU client
pub fn create_cpu_handle() -> (Handle<CpuRuntime>, CpuDevice) {
    let (client, device) = create_cpu_client();
    (Handle::new(client), device)
}

/// Deterministic RNG so failures reproduce
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Element types that can be drawn uniformly from [-1, 1] (per component)
pub trait RandomElement: Element {
    fn random(rng: &mut StdRng) -> Self;
}

impl RandomElement for f32 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..=1.0)
    }
}

impl RandomElement for f64 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..=1.0)
    }
}

impl RandomElement for Complex64 {
    fn random(rng: &mut StdRng) -> Self {
        Complex64::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
    }
}

impl RandomElement for Complex128 {
    fn random(rng: &mut StdRng) -> Self {
        Complex128::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
    }
}

/// Fill every batch element of `batch` with random values
pub fn fill_random<T: RandomElement>(batch: &mut HostBatch<T>, rng: &mut StdRng) {
    batch.fill_with(|| T::random(rng));
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Raw bytes of a host container, for bit-exact comparisons
pub fn bytes_of<T: Element>(batch: &HostBatch<T>) -> Vec<u8> {
    bytemuck::cast_slice(batch.as_slice()).to_vec()
}
