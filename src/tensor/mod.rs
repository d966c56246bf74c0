//! Array types
//!
//! This module provides the core [`Tensor`] type: an n-dimensional array with
//! a reference-counted buffer on a compute device, its [`Layout`] (shape,
//! byte strides, byte offset), its immutable [`Descriptor`], and the
//! [`NdIter`] walker that visits any layout in row-major order.

mod core;
mod descriptor;
mod iter;
mod layout;
mod storage;

pub use core::Tensor;
pub use descriptor::Descriptor;
pub use iter::{AdvanceMode, NdIter};
pub use layout::{Layout, Shape, Strides, canonical_strides};
pub use storage::Storage;
