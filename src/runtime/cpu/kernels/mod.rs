//! Native CPU kernels
//!
//! Kernels operate on raw pointers to contiguous, row-major f32 buffers.
//! Callers (the runtime backends) are responsible for validating lengths
//! and pointer provenance.

pub mod binary;
pub mod lu;
pub mod matmul;
pub mod memory;
pub mod reduce;
pub mod simd;
pub mod svd;
pub mod unary;

pub use binary::binary_scalar_f32;
pub use lu::{det_from_lu, getrf, getri, lu_partial_pivot};
pub use matmul::{gemm, gemv};
pub use memory::copy_strided;
pub use reduce::reduce_f32;
pub use svd::svd_jacobi;
pub use unary::{fill_f32, unary_scalar_f32};
