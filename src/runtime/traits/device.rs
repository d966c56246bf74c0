//! Device handle: which runtime (and memory domain) an array lives on

use super::runtime::Runtime;
use crate::error::{Error, Result};
use crate::runtime::MemoryStats;
use crate::runtime::cpu::CpuRuntime;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Memory domain of a device
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Host memory
    Cpu,
    /// Accelerator memory, not addressable by host kernels
    Gpu,
}

/// Shared handle to a runtime
///
/// Cloning is cheap. Two CPU devices always compare equal (there is one host
/// memory domain); GPU devices compare equal only when they are handles to
/// the same runtime instance.
#[derive(Clone)]
pub struct Device {
    runtime: Arc<dyn Runtime>,
}

static DEFAULT_CPU: OnceLock<Device> = OnceLock::new();

impl Device {
    /// The process-wide CPU device
    pub fn cpu() -> Self {
        DEFAULT_CPU
            .get_or_init(|| Self::from_runtime(Arc::new(CpuRuntime::new())))
            .clone()
    }

    /// Wrap a runtime
    pub fn from_runtime(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    /// The runtime behind this device
    #[inline]
    pub fn runtime(&self) -> &dyn Runtime {
        self.runtime.as_ref()
    }

    /// Memory domain
    #[inline]
    pub fn kind(&self) -> DeviceKind {
        self.runtime.kind()
    }

    /// Index among devices of the same kind
    #[inline]
    pub fn ordinal(&self) -> usize {
        self.runtime.ordinal()
    }

    /// Human-readable name
    pub fn name(&self) -> String {
        self.runtime.name()
    }

    /// True for host devices
    #[inline]
    pub fn is_cpu(&self) -> bool {
        self.kind() == DeviceKind::Cpu
    }

    /// True for accelerator devices
    #[inline]
    pub fn is_gpu(&self) -> bool {
        self.kind() == DeviceKind::Gpu
    }

    /// Allocation counters of the underlying runtime
    pub fn memory_stats(&self) -> MemoryStats {
        self.runtime.memory_stats()
    }

    /// Whether addresses from `other` are valid on this device
    pub fn same_device(&self, other: &Device) -> bool {
        match (self.kind(), other.kind()) {
            (DeviceKind::Cpu, DeviceKind::Cpu) => true,
            (DeviceKind::Gpu, DeviceKind::Gpu) => std::ptr::addr_eq(
                Arc::as_ptr(&self.runtime),
                Arc::as_ptr(&other.runtime),
            ),
            _ => false,
        }
    }

    /// `Err(DeviceMismatch)` unless both handles address the same memory
    pub fn ensure_same(&self, other: &Device) -> Result<()> {
        if self.same_device(other) {
            Ok(())
        } else {
            Err(Error::DeviceMismatch {
                lhs: self.name(),
                rhs: other.name(),
            })
        }
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.same_device(other)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({})", self.name())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_devices_are_equal() {
        let a = Device::cpu();
        let b = Device::from_runtime(Arc::new(CpuRuntime::new()));
        assert_eq!(a, b);
        assert!(a.is_cpu());
        assert_eq!(a.name(), "cpu");
        assert!(a.ensure_same(&b).is_ok());
    }

    #[cfg(feature = "gpu-emulation")]
    #[test]
    fn test_gpu_identity() {
        use crate::runtime::gpu::EmulatedGpuRuntime;
        let g0 = Device::from_runtime(Arc::new(EmulatedGpuRuntime::new(0)));
        let g0_again = g0.clone();
        let other = Device::from_runtime(Arc::new(EmulatedGpuRuntime::new(0)));
        assert_eq!(g0, g0_again);
        assert_ne!(g0, other);
        assert_ne!(g0, Device::cpu());
        let err = Device::cpu().ensure_same(&g0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DeviceMismatch);
    }
}
