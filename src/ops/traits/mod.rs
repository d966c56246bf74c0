//! Operation traits

mod binary;
mod cumulative;
mod linalg;
mod reduce;
mod statistics;
mod unary;

pub use binary::BinaryOps;
pub use cumulative::CumulativeOps;
pub use linalg::LinalgOps;
pub use reduce::ReduceOps;
pub use statistics::StatisticalOps;
pub use unary::UnaryOps;
