//! Error Types - Rafters Error Handling
//!
//! Provides the error type shared by every Rafters operation: metadata
//! validation failures, intentionally unsupported operations, shape and dtype
//! disagreements, and serialization/configuration problems.
//!
//! # Key Features
//! - Unified error type for all Rafters operations
//! - Typed variants identifying which invariant or capability was violated
//! - Integration with `std::error::Error`
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use thiserror::Error;

use crate::dtype::DType;

// =============================================================================
// Error Types
// =============================================================================

/// The main error type for Rafters operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Metadata supplied for an array violates the metadata invariants.
    #[error("Invalid metadata: {message}")]
    InvalidMetadata {
        /// Description of the violated invariant.
        message: String,
    },

    /// The operation is declared but intentionally not implemented.
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name and arguments of the rejected operation.
        operation: String,
    },

    /// Shape mismatch between a buffer and the shape describing it.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The expected shape.
        expected: Vec<usize>,
        /// The actual shape.
        actual: Vec<usize>,
    },

    /// Element type mismatch, e.g. when restoring a frozen buffer.
    #[error("DType mismatch: expected {expected:?}, got {actual:?}")]
    DTypeMismatch {
        /// The expected data type.
        expected: DType,
        /// The actual data type.
        actual: DType,
    },

    /// Invalid axis index.
    #[error("Invalid dimension: index {index} for array with {ndim} dimensions")]
    InvalidDimension {
        /// The invalid axis index.
        index: i64,
        /// Number of dimensions in the array.
        ndim: usize,
    },

    /// Index out of bounds.
    #[error("Index out of bounds: index {index} for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index.
        index: usize,
        /// The size of the dimension.
        size: usize,
    },

    /// Invalid operation for the given array.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// Broadcasting failed between shapes.
    #[error("Cannot broadcast shapes {shape1:?} and {shape2:?}")]
    BroadcastError {
        /// The first shape.
        shape1: Vec<usize>,
        /// The second shape.
        shape2: Vec<usize>,
    },

    /// A reduction with no identity element was applied to an empty lane.
    #[error("Operation not supported on empty buffer")]
    EmptyBuffer,

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// Configuration could not be loaded or saved.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error.
        message: String,
    },
}

// =============================================================================
// Result Type
// =============================================================================

/// A specialized Result type for Rafters operations.
pub type Result<T> = core::result::Result<T, Error>;

// =============================================================================
// Helper Functions
// =============================================================================

impl Error {
    /// Creates a new shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates a new invalid metadata error.
    #[must_use]
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            message: message.into(),
        }
    }

    /// Creates the error raised when a per-axis field disagrees with the rank.
    #[must_use]
    pub fn axis_length_mismatch(field: &str, len: usize, ndim: usize) -> Self {
        Self::invalid_metadata(format!(
            "length of {field} must match ndim: len {len}, ndim {ndim}"
        ))
    }

    /// Creates a new unsupported operation error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Creates a new invalid operation error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
