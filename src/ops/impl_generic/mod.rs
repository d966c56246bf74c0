//! Backend-agnostic operation implementations
//!
//! Every function here works on any [`Device`]: it validates operands,
//! allocates outputs on the operands' device and hands raw addresses to that
//! device's kernels. Composite operations call back into the [`Client`]
//! traits, so device and dtype checks apply to every intermediate step.
//!
//! ```text
//! statistics / cumulative / linalg
//!         │
//!         ├── elementwise (binary_impl, unary_impl, map_impl)
//!         │       └── broadcast::reconcile → NdIter (strided copies)
//!         └── reduce (reduce_impl)
//! ```
//!
//! [`Device`]: crate::runtime::Device
//! [`Client`]: crate::runtime::Client

mod cumulative;
mod elementwise;
mod linalg;
mod reduce;
mod statistics;

use crate::error::{Error, Result};
use crate::runtime::Device;
use crate::tensor::{NdIter, Tensor};

/// Wait for device work before results are observed
#[inline]
pub(crate) fn finish(device: &Device) {
    if device.is_gpu() {
        device.runtime().synchronize();
    }
}

/// Visit every element of a host tensor in row-major logical order
///
/// Follows the tensor's strides, so broadcast elements are visited once per
/// logical position.
pub(crate) fn for_each_host_f32(a: &Tensor, mut f: impl FnMut(f32)) -> Result<()> {
    if !a.device().is_cpu() {
        return Err(Error::Backend(format!(
            "host traversal of a tensor on {}",
            a.device()
        )));
    }
    if a.numel() == 0 {
        return Ok(());
    }
    let base = a.storage().ptr() as *const u8;
    for offset in NdIter::new(a.layout()) {
        // SAFETY: the layout was validated against the storage extent when
        // the tensor was built, and every offset addresses an f32.
        let value = unsafe { base.offset(offset).cast::<f32>().read() };
        f(value);
    }
    Ok(())
}
