//! Error types and result utilities for the spectral transform pipeline.

use thiserror::Error;

/// Convenience type alias for results that may contain a [`TransformError`].
pub type TransformResult<T> = Result<T, TransformError>;

/// Error types that can occur while configuring or running a transform.
#[derive(Error, Debug, Clone)]
pub enum TransformError {
    /// A native buffer could not be acquired.
    ///
    /// This is fatal for the instance being built. Nothing in this crate retries it.
    #[error("Allocation error: could not allocate {elements} elements of type {element}")]
    Allocation {
        /// Element type of the buffer that failed to allocate.
        element: &'static str,
        /// Requested element count.
        elements: usize,
    },

    /// A configuration value was rejected.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// The pipeline was driven in a way its contract forbids.
    ///
    /// Covers use after teardown, buffer views that are too small for the
    /// configured window, and strategies that write the wrong number of bins.
    #[error("Misuse of {operation}: {reason}")]
    Misuse {
        /// Operation that detected the violation.
        operation: &'static str,
        /// Description of the violated precondition.
        reason: String,
    },
}

impl TransformError {
    /// Create an allocation error for `elements` values of type `T`.
    pub fn allocation<T>(elements: usize) -> Self {
        Self::Allocation {
            element: std::any::type_name::<T>(),
            elements,
        }
    }

    /// Create a precondition violation error.
    pub fn misuse(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Misuse {
            operation,
            reason: reason.into(),
        }
    }

    /// Error raised by any operation attempted after the buffers were released.
    pub fn released(operation: &'static str) -> Self {
        Self::misuse(operation, "buffers have already been released")
    }

    /// Whether this error leaves the instance unusable.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation { .. })
    }
}

/// Errors describing invalid configuration parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// A parameter has a value that is not accepted.
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Name of the offending parameter.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A parameter is outside its accepted range.
    #[error("'{parameter}' = {value} is outside the range [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending parameter.
        parameter: String,
        /// Rejected value.
        value: usize,
        /// Smallest accepted value.
        min: usize,
        /// Largest accepted value.
        max: usize,
    },
}

impl ParameterError {
    /// Create an invalid value error.
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(parameter: impl Into<String>, value: usize, min: usize, max: usize) -> Self {
        Self::OutOfRange {
            parameter: parameter.into(),
            value,
            min,
            max,
        }
    }
}
