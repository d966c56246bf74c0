//! Client: operation entry point and execution configuration

use super::cpu::kernels::simd::{SimdLevel, detect_simd};
use super::{Device, DeviceKind};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Default minimum element count for the SIMD path
pub const DEFAULT_SIMD_THRESHOLD: usize = 32;

/// Default sweep limit for the Jacobi SVD
pub const DEFAULT_SVD_MAX_SWEEPS: usize = 30;

/// How an elementwise call is executed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExecStrategy {
    /// Flat per-index loop on the host
    Scalar,
    /// Fixed-width vector chunks with a scalar tail on the host
    Simd,
    /// Device kernel followed by a synchronization point
    Device,
}

impl ExecStrategy {
    /// Lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Simd => "simd",
            Self::Device => "device",
        }
    }
}

impl fmt::Display for ExecStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Self::Scalar),
            "simd" => Ok(Self::Simd),
            "device" | "gpu" => Ok(Self::Device),
            other => Err(Error::invalid_argument(
                "strategy",
                format!("unknown strategy '{other}' (expected scalar, simd or device)"),
            )),
        }
    }
}

/// Execution configuration of a [`Client`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Force a strategy for host operands; `None` selects automatically
    ///
    /// Device operands always run on the device.
    pub strategy: Option<ExecStrategy>,
    /// Minimum element count before the SIMD path is chosen automatically
    pub simd_threshold: usize,
    /// Sweep limit for the Jacobi SVD
    pub svd_max_sweeps: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            strategy: None,
            simd_threshold: DEFAULT_SIMD_THRESHOLD,
            svd_max_sweeps: DEFAULT_SVD_MAX_SWEEPS,
        }
    }
}

impl ClientConfig {
    /// Environment variable forcing the host strategy
    pub const ENV_STRATEGY: &'static str = "NDKIT_STRATEGY";
    /// Environment variable overriding the SIMD threshold
    pub const ENV_SIMD_THRESHOLD: &'static str = "NDKIT_SIMD_THRESHOLD";

    /// Force a strategy
    pub fn with_strategy(mut self, strategy: ExecStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the SIMD threshold
    pub fn with_simd_threshold(mut self, threshold: usize) -> Self {
        self.simd_threshold = threshold;
        self
    }

    /// Set the SVD sweep limit
    pub fn with_svd_max_sweeps(mut self, sweeps: usize) -> Self {
        self.svd_max_sweeps = sweeps;
        self
    }

    /// Defaults overridden by `NDKIT_STRATEGY` and `NDKIT_SIMD_THRESHOLD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::ENV_STRATEGY) {
            config.strategy = Some(value.parse()?);
        }
        if let Some(value) = lookup(Self::ENV_SIMD_THRESHOLD) {
            config.simd_threshold = value.trim().parse().map_err(|_| {
                Error::invalid_argument(
                    "simd_threshold",
                    format!("'{value}' is not a non-negative integer"),
                )
            })?;
        }
        Ok(config)
    }
}

/// Entry point for all array operations
///
/// The client is stateless apart from its [`ClientConfig`]; operations run
/// on the device of their operands. Operation traits (`BinaryOps`,
/// `LinalgOps`, ...) are implemented for it.
///
/// # Example
///
/// ```
/// use ndkit::prelude::*;
///
/// let client = Client::new();
/// let device = Device::cpu();
/// let a = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device)?;
/// let b = Tensor::from_slice(&[10.0f32], &[1], &device)?;
/// let c = client.add(&a, &b)?;
/// assert_eq!(c.to_vec::<f32>()?, vec![11.0, 12.0, 13.0]);
/// # Ok::<(), ndkit::error::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Client with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Client with an explicit configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Choose how to run an elementwise call over `len` elements on `device`
    ///
    /// Device operands always use [`ExecStrategy::Device`]. Host operands use
    /// the forced strategy if one is configured, otherwise SIMD when the CPU
    /// supports it and `len` reaches the threshold.
    pub fn select_strategy(&self, device: &Device, len: usize) -> Result<ExecStrategy> {
        let strategy = match (device.kind(), self.config.strategy) {
            (DeviceKind::Gpu, _) => ExecStrategy::Device,
            (DeviceKind::Cpu, Some(ExecStrategy::Device)) => {
                return Err(Error::invalid_argument(
                    "strategy",
                    "device strategy requested for host operands",
                ));
            }
            (DeviceKind::Cpu, Some(forced)) => forced,
            (DeviceKind::Cpu, None) => {
                if detect_simd() != SimdLevel::Scalar && len >= self.config.simd_threshold {
                    ExecStrategy::Simd
                } else {
                    ExecStrategy::Scalar
                }
            }
        };
        tracing::debug!(%strategy, len, device = %device, "selected execution strategy");
        Ok(strategy)
    }
}
