//! Runtime, device and kernel traits

mod device;
mod kernels;
mod runtime;

pub use device::{Device, DeviceKind};
pub use kernels::{ElementwiseKernels, LinalgKernels};
pub use runtime::Runtime;
