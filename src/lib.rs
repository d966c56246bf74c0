//! # ndkit
//!
//! **Strided N-dimensional f32 arrays with broadcasting, linear algebra and
//! statistics over host and device backends.**
//!
//! ndkit is an embeddable array engine. Arrays are reference-counted buffers
//! plus a strided layout, so transposes, slices and broadcasts are views that
//! never copy. Every operation runs on the device its operands live on.
//!
//! ## Features
//!
//! - **Arrays**: shared storage, strided views, row-major iteration ([`tensor::NdIter`])
//! - **Broadcasting**: trailing-dimension alignment with zero-stride views
//! - **Element-wise ops**: scalar, SIMD (AVX2 / NEON) and device strategies
//!   behind one dispatcher
//! - **Linear algebra**: matmul, determinant, inverse, LU, SVD, norms, rank,
//!   dot and inner products
//! - **Statistics**: sum, product, mean, extrema, median, quantiles,
//!   variance, weighted average, cumulative sums, covariance
//!
//! ## Quick Start
//!
//! ```rust
//! use ndkit::prelude::*;
//!
//! let client = Client::new();
//! let device = Device::cpu();
//! let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device)?;
//! let b = Tensor::from_slice(&[10.0f32, 20.0], &[2], &device)?;
//!
//! let c = client.add(&a, &b)?;
//! assert_eq!(c.to_vec::<f32>()?, vec![11.0, 22.0, 13.0, 24.0]);
//!
//! let det = client.det(&a)?;
//! assert!((det.item::<f32>()? + 2.0).abs() < 1e-5);
//! # Ok::<(), ndkit::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `gpu-emulation` (default): an in-process device runtime with its own
//!   address space, used to exercise every device dispatch branch

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::linalg::{LuDecomposition, NormKind, SvdDecomposition};
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        BinaryOps, CumulativeOps, LinalgOps, ReduceOps, StatisticalOps, UnaryOps,
    };
    pub use crate::runtime::{Client, ClientConfig, Device, DeviceKind, ExecStrategy};
    pub use crate::tensor::{Layout, Tensor};

    #[cfg(feature = "gpu-emulation")]
    pub use crate::runtime::gpu::EmulatedGpuRuntime;
}
