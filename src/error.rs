//! Error types for batchblas
//!
//! Internally every fallible call returns [`Result`]. At the C-linkage
//! boundary an [`Error`] collapses to a [`Status`] code via
//! [`Error::status`].

use thiserror::Error;

/// Result type alias using batchblas's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Whether a numerics check ran before or after the kernel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericsStage {
    /// Operands scanned before launch
    Input,
    /// Results scanned after launch
    Output,
}

impl std::fmt::Display for NumericsStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericsStage::Input => f.write_str("input"),
            NumericsStage::Output => f.write_str("output"),
        }
    }
}

/// Errors that can occur in batchblas operations
#[derive(Error, Debug)]
pub enum Error {
    /// Null or destroyed handle
    #[error("Invalid handle")]
    InvalidHandle,

    /// A required pointer argument is null for a non-degenerate problem
    #[error("Invalid pointer: '{arg}' is null")]
    InvalidPointer {
        /// The argument name
        arg: &'static str,
    },

    /// An enumerated argument is outside its legal set
    #[error("Invalid value for '{arg}': {reason}")]
    InvalidValue {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Negative dimension, zero increment, negative batch count, ...
    #[error("Invalid size for '{arg}': {reason}")]
    InvalidSize {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Host or device memory could not be obtained
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Two containers do not share a transfer-compatible layout
    #[error("Layout mismatch: {reason}")]
    LayoutMismatch {
        /// Description of the first differing parameter
        reason: String,
    },

    /// Host/device copy failed in the backend
    #[error("Transfer failed: {reason}")]
    Transfer {
        /// Backend-provided description
        reason: String,
    },

    /// NaN or Inf detected by the numerics check
    #[error("Numerics check failed in {op}: NaN/Inf found in {stage}")]
    Numerics {
        /// Operation name
        op: &'static str,
        /// Whether the invalid values were found before or after compute
        stage: NumericsStage,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid size error
    pub fn invalid_size(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSize {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a layout mismatch error
    pub fn layout_mismatch(reason: impl Into<String>) -> Self {
        Self::LayoutMismatch {
            reason: reason.into(),
        }
    }

    /// Status code reported for this error at the C boundary
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidHandle => Status::InvalidHandle,
            Error::InvalidPointer { .. } => Status::InvalidPointer,
            Error::InvalidValue { .. } => Status::InvalidValue,
            Error::InvalidSize { .. } => Status::InvalidSize,
            Error::OutOfMemory { .. } => Status::MemoryError,
            Error::LayoutMismatch { .. } => Status::InvalidSize,
            Error::Transfer { .. } => Status::MemoryError,
            Error::Numerics { .. } => Status::CheckNumericsFail,
            Error::Internal(_) => Status::InternalError,
        }
    }
}

/// Status codes returned by every C entry point
///
/// Values match the conventional BLAS status numbering so callers can share
/// lookup tables.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Operation completed
    Success = 0,
    /// Handle not initialized, invalid or null
    InvalidHandle = 1,
    /// Function is not implemented
    NotImplemented = 2,
    /// Invalid pointer argument
    InvalidPointer = 3,
    /// Invalid size argument
    InvalidSize = 4,
    /// Failed internal memory allocation, copy or dealloc
    MemoryError = 5,
    /// Other internal library failure
    InternalError = 6,
    /// Passed argument not valid
    InvalidValue = 11,
    /// NaN/Inf detected in input or output
    CheckNumericsFail = 13,
}

impl Status {
    /// True for [`Status::Success`]
    #[inline]
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Success as i32, 0);
        assert_eq!(Status::InvalidHandle as i32, 1);
        assert_eq!(Status::InvalidPointer as i32, 3);
        assert_eq!(Status::InvalidSize as i32, 4);
        assert_eq!(Status::InvalidValue as i32, 11);
        assert_eq!(Status::CheckNumericsFail as i32, 13);
    }

    #[test]
    fn test_error_to_status() {
        assert_eq!(Error::InvalidHandle.status(), Status::InvalidHandle);
        assert_eq!(
            Error::invalid_size("n", "negative").status(),
            Status::InvalidSize
        );
        assert_eq!(
            Error::OutOfMemory { size: 8 }.status(),
            Status::MemoryError
        );
        let numerics = Error::Numerics {
            op: "tpmv",
            stage: NumericsStage::Output,
        };
        assert_eq!(numerics.status(), Status::CheckNumericsFail);
        assert_eq!(
            numerics.to_string(),
            "Numerics check failed in tpmv: NaN/Inf found in output"
        );
    }

    #[test]
    fn test_status_from_result() {
        let ok: Result<()> = Ok(());
        assert!(Status::from(&ok).is_success());
        let err: Result<()> = Err(Error::InvalidPointer { arg: "x" });
        assert_eq!(Status::from(&err), Status::InvalidPointer);
    }
}
