//! CPU runtime implementation
//!
//! The CPU runtime allocates 64-byte aligned host memory and runs every
//! kernel natively. Elementwise kernels come in two flavours:
//!
//! - [`ScalarKernels`]: one flat loop, one element per iteration
//! - [`SimdKernels`]: AVX2 (x86-64) or NEON (AArch64) chunks with a scalar
//!   tail, falling back to the scalar loop on other targets
//!
//! Both produce bit-identical results for every operation; multiplication
//! canonicalises `-0.0` to `+0.0` in either path.

mod backend;
mod jacobi;
pub mod kernels;
mod runtime;

pub use backend::{CpuLinalg, ScalarKernels, SimdKernels};
pub use runtime::CpuRuntime;
