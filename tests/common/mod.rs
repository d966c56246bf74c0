//! Common test utilities
#![allow(dead_code)]

use ndkit::prelude::*;
use ndkit::runtime::cpu::CpuRuntime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Route library logs to the test harness; filter with `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a default client and the shared CPU device
pub fn create_cpu_client() -> (Client, Device) {
    (Client::new(), Device::cpu())
}

/// A CPU device with its own allocation counters
///
/// Tests run in parallel, so memory accounting must not use the shared
/// device.
pub fn isolated_cpu_device() -> Device {
    Device::from_runtime(Arc::new(CpuRuntime::new()))
}

/// Create an emulated GPU device, keeping the concrete runtime for counters
pub fn create_gpu_device() -> (Arc<EmulatedGpuRuntime>, Device) {
    let runtime = Arc::new(EmulatedGpuRuntime::new(0));
    let device = Device::from_runtime(runtime.clone());
    (runtime, device)
}

/// Client forced onto a host strategy
pub fn client_with(strategy: ExecStrategy) -> Client {
    Client::with_config(ClientConfig::default().with_strategy(strategy))
}

/// Deterministic uniform values in `[lo, hi)`
pub fn random_vec(seed: u64, len: usize, lo: f32, hi: f32) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(lo..hi)).collect()
}

/// Diagonally dominant random matrix (well conditioned)
pub fn random_well_conditioned(seed: u64, n: usize) -> Vec<f32> {
    let mut data = random_vec(seed, n * n, -1.0, 1.0);
    for i in 0..n {
        data[i * n + i] += n as f32;
    }
    data
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
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

/// Row-major `n x n` identity
pub fn identity(n: usize) -> Vec<f32> {
    let mut eye = vec![0.0; n * n];
    for i in 0..n {
        eye[i * n + i] = 1.0;
    }
    eye
}
