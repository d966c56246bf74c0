//! Emulated GPU backend
//!
//! A stand-in accelerator used to exercise device dispatch without real
//! hardware: it has its own address space, launches kernels, and requires a
//! synchronization point before results are read. Enabled by the
//! `gpu-emulation` feature.

mod memory;
mod runtime;

pub use runtime::EmulatedGpuRuntime;
