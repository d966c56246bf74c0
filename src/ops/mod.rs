//! Tensor operations
//!
//! Operations are defined as traits implemented by [`Client`]; each call
//! runs on the device of its operands.
//!
//! ```text
//! Client
//!   ├── BinaryOps        add, sub, mul, div, rem, pow, maximum, minimum
//!   ├── UnaryOps         neg, abs, sqrt, square, map
//!   ├── ReduceOps        sum, prod, mean, max, min
//!   ├── LinalgOps        matmul, det, inverse, lu, svd, norm, matrix_rank, dot, inner
//!   ├── StatisticalOps   median, quantile, var, std, average, cov
//!   └── CumulativeOps    cumsum, cumprod
//! ```
//!
//! Every composite operation (statistics, `inner`, `cov`, ...) is built from
//! the elementwise dispatcher and the reductions, so it inherits their device
//! and dtype checks.
//!
//! [`Client`]: crate::runtime::Client

mod arithmetic;
mod broadcast;
pub(crate) mod impl_generic;
mod traits;

pub use arithmetic::{BinaryOp, ReduceOp, UnaryOp, positive_zero};
pub use broadcast::{broadcast, broadcast_shapes, reconcile, reconciled_shape};
pub use traits::{BinaryOps, CumulativeOps, LinalgOps, ReduceOps, StatisticalOps, UnaryOps};
