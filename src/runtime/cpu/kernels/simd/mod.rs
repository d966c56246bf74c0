//! SIMD detection and dispatch for CPU kernels
//!
//! # Module Structure
//!
//! ```text
//! simd/
//! ├── mod.rs              # This file: detection only
//! └── binary/
//!     ├── mod.rs          # Unified dispatch
//!     ├── avx2.rs         # x86-64, 8 f32 lanes
//!     └── neon.rs         # AArch64, 4 f32 lanes
//! ```
//!
//! | Architecture | Instruction Set | Vector Width |
//! |--------------|-----------------|--------------|
//! | x86-64       | AVX2            | 256 bits     |
//! | ARM64        | NEON            | 128 bits     |
//! | Any          | Scalar          | N/A          |

pub mod binary;

use std::sync::OnceLock;

/// SIMD capability level detected at runtime
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(dead_code)] // Variants are only constructed on their own architecture
pub enum SimdLevel {
    /// AVX2 (256-bit vectors, 8 f32s)
    Avx2 = 2,
    /// NEON baseline for AArch64 (128-bit vectors, 4 f32s)
    Neon = 1,
    /// Scalar fallback (no SIMD)
    Scalar = 0,
}

impl SimdLevel {
    /// Number of f32 elements per vector register
    #[inline]
    pub const fn f32_lanes(self) -> usize {
        match self {
            Self::Avx2 => 8,
            Self::Neon => 4,
            Self::Scalar => 1,
        }
    }

    /// Name of this level
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx2 => "AVX2",
            Self::Neon => "NEON",
            Self::Scalar => "Scalar",
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detect the best available SIMD level for the current CPU
///
/// The first call performs detection; later calls return the cached value.
#[inline]
pub fn detect_simd() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(|| {
        let level = detect_simd_uncached();
        tracing::debug!(%level, "detected SIMD level");
        level
    })
}

#[cold]
fn detect_simd_uncached() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return SimdLevel::Avx2;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON is mandatory on AArch64
        return SimdLevel::Neon;
    }

    #[allow(unreachable_code)]
    SimdLevel::Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simd_detection_is_cached() {
        assert_eq!(detect_simd(), detect_simd());
    }

    #[test]
    fn test_simd_level_ordering() {
        assert!(SimdLevel::Avx2 > SimdLevel::Neon);
        assert!(SimdLevel::Neon > SimdLevel::Scalar);
        assert_eq!(SimdLevel::Avx2.f32_lanes(), 8);
    }

    #[test]
    fn test_architecture_detection() {
        let level = detect_simd();
        #[cfg(target_arch = "aarch64")]
        assert_eq!(level, SimdLevel::Neon);
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        assert_eq!(level, SimdLevel::Scalar);
        let _ = level;
    }
}
