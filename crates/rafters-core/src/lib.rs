//! Rafters Core - Foundation Layer for Coordinate-Aware Arrays
//!
//! This crate provides the low-level abstractions shared by every Rafters
//! crate: the unified error type, the numeric element traits, the
//! reference-counted sample storage and the grid configuration.
//!
//! # Key Features
//! - Type-safe element system (f32, f64, i8..i64, u8..u64)
//! - Reference-counted storage shared between array views
//! - A single error enum for every fallible operation
//! - TOML-backed defaults for axis metadata
//!
//! # Example
//! ```rust
//! use rafters_core::{DType, Scalar, Storage};
//!
//! let storage = Storage::from_vec(vec![0.0_f64; 16]);
//! assert_eq!(storage.len(), 16);
//! assert_eq!(f64::DTYPE, DType::F64);
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Numeric allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod dtype;
pub mod error;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::GridConfig;
pub use dtype::{DType, Float, Numeric, Scalar};
pub use error::{Error, Result};
pub use storage::Storage;

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::config::GridConfig;
    pub use crate::dtype::{DType, Float, Numeric, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::storage::Storage;
}
