//! # Rafters - Coordinate-Aware N-Dimensional Arrays
//!
//! Rafters attaches physical coordinates to the axes of an N-dimensional
//! array and keeps them correct as the array is sliced, transposed and
//! reduced. Operations that cannot keep coordinates meaningful hand back a
//! plain buffer instead of a grid with stale metadata.
//!
//! ## Core Features
//!
//! - **Grids**: `GridArray` with per-axis labels, units, offsets and voxel sizes
//! - **Slicing**: strided slices move offsets and rescale voxel sizes
//! - **Reductions**: keepdims collapses an axis onto its centroid; dropping an
//!   axis records its centroid and unit in the annotation map
//! - **Downcasts**: sorting, reshaping, selection and contraction return plain
//!   buffers
//! - **Serialization**: freeze/thaw plus bincode and JSON transport
//!
//! # Quick Start
//!
//! ```rust
//! use rafters::prelude::*;
//!
//! let stack = GridArray::from_vec(
//!     (0..30).map(f64::from).collect(),
//!     &[5, 6],
//!     GridFields::new()
//!         .axis_labels(["z", "x"])
//!         .axis_units(["um", "um"])
//!         .voxel_size(vec![2.0, 0.5]),
//! )
//! .unwrap();
//!
//! let projection = stack.max(Some(&[0]), false).unwrap();
//! assert_eq!(projection.axis_labels(), &["x"]);
//! assert_eq!(projection.metadata().get("z_unit"), Some(&MetaValue::from("um")));
//! ```
//!
//! # Feature Flags
//!
//! - `serialize` (default): bincode and JSON transport of frozen grids
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// =============================================================================
// Crate Re-exports
// =============================================================================

pub use rafters_core as core;
pub use rafters_grid as grid;

#[cfg(feature = "serialize")]
pub use rafters_serialize as serialize;

pub use rafters_core::{DType, Error, GridConfig, Result};
pub use rafters_grid::{ArrayValue, GridArray, GridFields, MetaValue, Metadata, NdBuffer, Operation};

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    // Core types
    pub use rafters_core::{DType, Error, GridConfig, Numeric, Result, Scalar};

    // Grids
    pub use rafters_grid::{
        ArrayValue, GridArray, GridFields, MetaValue, Metadata, MetadataPolicy, NdBuffer,
        Operation, Reducer, SliceSpec,
    };

    // Transport
    #[cfg(feature = "serialize")]
    pub use rafters_serialize::{load_grid, save_grid, Format, FrozenGrid};
}

// =============================================================================
// Version Information
// =============================================================================

/// Returns the version of Rafters.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns a string describing the enabled features.
#[must_use]
pub fn features() -> String {
    let mut features = vec!["grid"];

    #[cfg(feature = "serialize")]
    features.push("serialize");

    features.join(", ")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_features() {
        assert!(features().contains("grid"));
    }

    #[test]
    fn test_grid_creation() {
        let g = GridArray::new(NdBuffer::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap());
        assert_eq!(g.shape(), &[2, 2]);
        assert_eq!(g.axis_labels(), &["0", "1"]);
        assert_eq!(g.axis_units(), &["pix", "pix"]);
    }
}
