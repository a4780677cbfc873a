//! Rafters Grid - Coordinate-Aware N-Dimensional Arrays
//!
//! This crate provides [`GridArray`], an N-dimensional buffer whose axes carry
//! physical coordinates: a label, a unit, the coordinate of the first sample
//! and the spacing between samples. Every operation on a grid either keeps
//! that metadata consistent with the samples or returns a plain [`NdBuffer`].
//!
//! # Key Features
//! - Strided slicing and transposition that move offsets and voxel sizes
//! - Reductions that collapse axes to their centroid or record them in the
//!   annotation map
//! - An explicit table classifying every operation by what it does to metadata
//! - Freeze/thaw into serializable raw parts
//!
//! # Example
//! ```rust
//! use rafters_grid::{GridArray, GridFields, MetaValue, SliceSpec};
//!
//! let grid = GridArray::from_vec(
//!     (0..10).map(f64::from).collect(),
//!     &[10],
//!     GridFields::new().axis_labels(["t"]).voxel_size(vec![2.0]),
//! )
//! .unwrap();
//!
//! let every_other = grid.slice(&[SliceSpec::range_step(2, 8, 2)]).unwrap();
//! assert_eq!(every_other.voxel_size(), &[4.0]);
//! assert_eq!(every_other.axis_offsets(), &[4.0]);
//!
//! let total = grid.sum(None, false).unwrap();
//! assert_eq!(total.item().unwrap(), 45.0);
//! assert_eq!(total.metadata().get("t_avg"), Some(&MetaValue::Float(9.0)));
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
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
#![allow(clippy::should_implement_trait)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::similar_names)]

// =============================================================================
// Modules
// =============================================================================

pub mod buffer;
pub mod creation;
pub mod downcast;
pub mod frozen;
pub mod grid;
mod lossless;
pub mod metadata;
pub mod ops;
pub mod policy;
pub mod reduce;
pub mod reduction;
pub mod shape;
pub mod transform;
pub mod view;

// =============================================================================
// Re-exports
// =============================================================================

pub use buffer::NdBuffer;
pub use creation::*;
pub use frozen::{FieldMap, FrozenGrid, RawBuffer};
pub use grid::GridArray;
pub use metadata::{materialize_defaults, AxisMeta, GridAttrs, GridFields, MetaValue, Metadata};
pub use policy::{ArrayValue, MetadataPolicy, Operation};
pub use rafters_core::{DType, Error, GridConfig, Result};
pub use reduce::{Reducer, ReducerFamily};
pub use shape::{Shape, Strides};
pub use view::{AxisRange, SliceSpec};

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::buffer::NdBuffer;
    pub use crate::grid::GridArray;
    pub use crate::metadata::{GridFields, MetaValue, Metadata};
    pub use crate::policy::{ArrayValue, Operation};
    pub use crate::reduce::Reducer;
    pub use crate::view::SliceSpec;
    pub use crate::{arange, full, linspace, ones, zeros};
    pub use rafters_core::{DType, Error, GridConfig, Numeric, Result, Scalar};
}
