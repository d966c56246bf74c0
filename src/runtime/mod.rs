//! Runtime backends for array computation
//!
//! ```text
//! Device (Arc<dyn Runtime>)
//! ├── Runtime            memory domain: allocate / free / copy / synchronize
//! │   ├── ElementwiseKernels   binary, unary, fill, reduce
//! │   └── LinalgKernels        gemm, gemv, getrf, getri, det, lu, svd
//! └── Client             operation entry point, strategy selection
//! ```
//!
//! Two runtimes ship with the crate: [`cpu::CpuRuntime`] (host heap, native
//! scalar and SIMD kernels) and, behind the `gpu-emulation` feature,
//! [`gpu::EmulatedGpuRuntime`], a device with its own address space that
//! rejects host pointers.

mod allocator;
mod client;
mod traits;

pub mod cpu;

#[cfg(feature = "gpu-emulation")]
pub mod gpu;

pub use allocator::MemoryStats;
pub(crate) use allocator::{AllocationCounters, host_alloc, host_dealloc};
pub use client::{
    Client, ClientConfig, DEFAULT_SIMD_THRESHOLD, DEFAULT_SVD_MAX_SWEEPS, ExecStrategy,
};
pub use traits::{Device, DeviceKind, ElementwiseKernels, LinalgKernels, Runtime};
