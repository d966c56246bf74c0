//! Device address space of the emulated GPU
//!
//! Each allocation is backed by host memory but handed out under a virtual
//! device address. Virtual ranges never overlap host pointers (they start
//! above the 48-bit user-space limit) nor each other across runtime
//! instances, so an address is only ever valid on the runtime that issued it.

use crate::error::{Error, Result};
use crate::runtime::{host_alloc, host_dealloc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// First virtual address handed out
const DEVICE_ADDRESS_BASE: u64 = 0x1000_0000_0000_0000;

/// Allocation granularity of the virtual address space
const PAGE: u64 = 4096;

/// Shared across runtimes so two devices never issue the same address
static NEXT_DEVICE_ADDRESS: AtomicU64 = AtomicU64::new(DEVICE_ADDRESS_BASE);

#[derive(Debug)]
struct DeviceBuffer {
    host: u64,
    size: usize,
}

/// Virtual base address → backing host buffer
#[derive(Debug, Default)]
pub(crate) struct AddressSpace {
    buffers: BTreeMap<u64, DeviceBuffer>,
}

impl AddressSpace {
    /// Back `size_bytes` with host memory and map it at a fresh address
    pub(crate) fn allocate(&mut self, size_bytes: usize) -> Result<u64> {
        let host = host_alloc(size_bytes)?;
        // One guard page keeps adjacent ranges apart.
        let span = (size_bytes as u64).div_ceil(PAGE) * PAGE + PAGE;
        let addr = NEXT_DEVICE_ADDRESS.fetch_add(span, Ordering::Relaxed);
        self.buffers.insert(
            addr,
            DeviceBuffer {
                host,
                size: size_bytes,
            },
        );
        Ok(addr)
    }

    /// Unmap and free; returns the size of the freed buffer
    pub(crate) fn free(&mut self, addr: u64) -> Option<usize> {
        let buffer = self.buffers.remove(&addr)?;
        unsafe { host_dealloc(buffer.host, buffer.size) };
        Some(buffer.size)
    }

    /// Host pointer for `len` bytes starting at device address `addr`
    ///
    /// Fails unless the whole range lies inside one mapped buffer. Empty
    /// ranges resolve to a null pointer without a lookup.
    pub(crate) fn resolve(&self, addr: u64, len: usize) -> Result<u64> {
        if len == 0 {
            return Ok(0);
        }
        let (&base, buffer) = self
            .buffers
            .range(..=addr)
            .next_back()
            .ok_or_else(|| foreign_address(addr, len))?;
        let start = addr - base;
        if start + len as u64 > buffer.size as u64 {
            return Err(foreign_address(addr, len));
        }
        Ok(buffer.host + start)
    }

    /// Number of mapped buffers
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.buffers.len()
    }
}

impl Drop for AddressSpace {
    fn drop(&mut self) {
        let leaked: Vec<u64> = self.buffers.keys().copied().collect();
        if !leaked.is_empty() {
            tracing::warn!(count = leaked.len(), "device buffers still mapped at shutdown");
        }
        for addr in leaked {
            self.free(addr);
        }
    }
}

fn foreign_address(addr: u64, len: usize) -> Error {
    Error::Backend(format!(
        "address {addr:#x} (+{len} bytes) is not mapped in this device's address space"
    ))
}
