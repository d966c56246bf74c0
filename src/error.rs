//! Error types for ndkit

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using ndkit's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ndkit operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastError {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// Invalid dimension index or rank
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// Matrix operation requires a square matrix
    #[error("Operation '{op}' requires a square matrix, got {rows}x{cols}")]
    NotSquare {
        /// The operation name
        op: &'static str,
        /// Row count
        rows: usize,
        /// Column count
        cols: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Device mismatch between operands
    #[error("Device mismatch: {lhs} vs {rhs}")]
    DeviceMismatch {
        /// Left-hand side device name
        lhs: String,
        /// Right-hand side device name
        rhs: String,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Tensor is not contiguous when contiguous memory is required
    #[error("Operation requires contiguous tensor")]
    NotContiguous,

    /// A numeric kernel reported a non-zero status
    #[error("Kernel '{kernel}' failed with status {status}")]
    BackendFailure {
        /// Kernel name
        kernel: &'static str,
        /// Status code reported by the kernel (LAPACK-style `info`)
        status: i32,
    },

    /// Backend-specific error (bad device address, transfer failure)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Operation not defined for the given operand ranks
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented feature
        feature: &'static str,
    },
}

/// Coarse error classification
///
/// Callers that only need to decide between "fix the input", "move data",
/// "retry with other data" and "give up" can match on this instead of the
/// individual variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad shape, rank, parameter or layout; detected before any allocation
    Validation,
    /// Operands live on different devices
    DeviceMismatch,
    /// Operand dtypes are incompatible with the operation
    TypeMismatch,
    /// A numeric kernel or device reported failure
    BackendFailure,
    /// Memory could not be allocated
    Allocation,
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::BroadcastError {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a kernel failure error
    pub fn backend_failure(kernel: &'static str, status: i32) -> Self {
        Self::BackendFailure { kernel, status }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShapeMismatch { .. }
            | Self::BroadcastError { .. }
            | Self::InvalidDimension { .. }
            | Self::NotSquare { .. }
            | Self::InvalidArgument { .. }
            | Self::NotContiguous
            | Self::NotImplemented { .. } => ErrorKind::Validation,
            Self::DeviceMismatch { .. } => ErrorKind::DeviceMismatch,
            Self::UnsupportedDType { .. } | Self::DTypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::BackendFailure { .. } | Self::Backend(_) => ErrorKind::BackendFailure,
            Self::OutOfMemory { .. } => ErrorKind::Allocation,
        }
    }

    /// Whether the caller can continue after this error
    ///
    /// Only allocation failure is fatal.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Allocation
    }
}
