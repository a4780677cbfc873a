//! GridArray - Coordinate-Aware N-Dimensional Array
//!
//! A `GridArray` is an [`NdBuffer`] plus the physical description of its axes
//! (label, unit, offset, voxel size) and of the array as a whole (annotations,
//! label-data flag, identifier, sample unit).
//!
//! Grids are immutable values. Every operation returning a grid builds it
//! through the same defaulting and validation path as explicit construction,
//! so the per-axis sequences always have one entry per axis.
//!
//! # Example
//! ```rust
//! use rafters_grid::{GridArray, GridFields, NdBuffer, SliceSpec};
//!
//! let buffer = NdBuffer::<f64>::from_vec((0..10).map(f64::from).collect(), &[10]).unwrap();
//! let grid = GridArray::with_fields(buffer, GridFields::new().voxel_size(vec![2.0])).unwrap();
//!
//! let sliced = grid.slice(&[SliceSpec::range_step(2, 8, 2)]).unwrap();
//! assert_eq!(sliced.voxel_size(), &[4.0]);
//! assert_eq!(sliced.axis_offsets(), &[4.0]);
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use core::fmt;
use std::sync::Arc;

use rafters_core::config::GridConfig;
use rafters_core::dtype::{Numeric, Scalar};
use rafters_core::error::Result;
use tracing::{debug, trace};

use crate::buffer::{write_nested, NdBuffer};
use crate::metadata::{materialize_defaults, AxisMeta, GridAttrs, GridFields, Metadata};
use crate::policy::{ArrayValue, Operation};

// =============================================================================
// GridArray Struct
// =============================================================================

/// An N-dimensional array with physical axis metadata.
#[derive(Clone)]
pub struct GridArray<T: Scalar> {
    /// Samples.
    pub(crate) buffer: NdBuffer<T>,
    /// Per-axis metadata, one entry per buffer axis.
    pub(crate) axes: AxisMeta,
    /// Annotations.
    pub(crate) metadata: Metadata,
    /// True when samples are discrete labels.
    pub(crate) label_data: bool,
    /// Opaque identifier, never inspected.
    pub(crate) id: Option<String>,
    /// Unit of the sample values.
    pub(crate) data_unit: String,
    /// Defaults this grid and everything derived from it were built with.
    pub(crate) config: Arc<GridConfig>,
}

impl<T: Scalar> GridArray<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Wraps a buffer with default metadata.
    #[must_use]
    pub fn new(buffer: NdBuffer<T>) -> Self {
        let config = Arc::new(GridConfig::default());
        Self {
            axes: AxisMeta::defaults(buffer.ndim(), &config),
            metadata: Metadata::new(),
            label_data: false,
            id: None,
            data_unit: config.data_unit.clone(),
            buffer,
            config,
        }
    }

    /// Wraps a buffer with caller-supplied metadata; missing fields default.
    pub fn with_fields(buffer: NdBuffer<T>, fields: GridFields) -> Result<Self> {
        Self::with_config(buffer, fields, GridConfig::default())
    }

    /// Like [`Self::with_fields`], with custom defaults.
    pub fn with_config(buffer: NdBuffer<T>, fields: GridFields, config: GridConfig) -> Result<Self> {
        Self::assemble(buffer, fields, Arc::new(config))
    }

    /// Builds a grid from a vector, shape and metadata.
    pub fn from_vec(data: Vec<T>, shape: &[usize], fields: GridFields) -> Result<Self> {
        Self::with_fields(NdBuffer::from_vec(data, shape)?, fields)
    }

    fn assemble(buffer: NdBuffer<T>, fields: GridFields, config: Arc<GridConfig>) -> Result<Self> {
        let attrs = materialize_defaults(buffer.ndim(), fields, &config)?;
        Ok(Self::from_attrs(buffer, attrs, config))
    }

    fn from_attrs(buffer: NdBuffer<T>, attrs: GridAttrs, config: Arc<GridConfig>) -> Self {
        Self {
            buffer,
            axes: attrs.axes,
            metadata: attrs.metadata,
            label_data: attrs.label_data,
            id: attrs.id,
            data_unit: attrs.data_unit,
            config,
        }
    }

    /// Builds a grid derived from this one, re-validating its metadata.
    pub(crate) fn derive<U: Scalar>(&self, buffer: NdBuffer<U>, attrs: GridAttrs) -> Result<GridArray<U>> {
        trace!(
            shape = ?buffer.shape(),
            labels = ?attrs.axes.labels,
            "re-deriving grid metadata"
        );
        GridArray::assemble(buffer, attrs.into_fields(), Arc::clone(&self.config))
    }

    /// Re-wraps a buffer of identical shape with this grid's metadata.
    pub(crate) fn rewrap<U: Scalar>(&self, buffer: NdBuffer<U>) -> GridArray<U> {
        debug_assert_eq!(buffer.shape(), self.shape());
        GridArray::from_attrs(buffer, self.attrs(), Arc::clone(&self.config))
    }

    /// Re-wraps a re-strided buffer whose axes `axes` describes one-to-one.
    pub(crate) fn with_axes(&self, buffer: NdBuffer<T>, axes: AxisMeta) -> Self {
        trace!(shape = ?buffer.shape(), labels = ?axes.labels, "reordering grid metadata");
        debug_assert!(axes.validate(buffer.ndim()).is_ok());
        let mut attrs = self.attrs();
        attrs.axes = axes;
        Self::from_attrs(buffer, attrs, Arc::clone(&self.config))
    }

    /// Returns a copy of every metadata attribute.
    #[must_use]
    pub fn attrs(&self) -> GridAttrs {
        GridAttrs {
            axes: self.axes.clone(),
            metadata: self.metadata.clone(),
            label_data: self.label_data,
            id: self.id.clone(),
            data_unit: self.data_unit.clone(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the shape of the samples.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    /// Returns the number of axes.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.buffer.ndim()
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.buffer.numel()
    }

    /// Axis names.
    #[must_use]
    pub fn axis_labels(&self) -> &[String] {
        &self.axes.labels
    }

    /// Axis units.
    #[must_use]
    pub fn axis_units(&self) -> &[String] {
        &self.axes.units
    }

    /// Coordinate of the center of sample 0 along each axis.
    #[must_use]
    pub fn axis_offsets(&self) -> &[f64] {
        &self.axes.offsets
    }

    /// Sample spacing along each axis.
    #[must_use]
    pub fn voxel_size(&self) -> &[f64] {
        &self.axes.voxel_size
    }

    /// Per-axis metadata.
    #[must_use]
    pub fn axes(&self) -> &AxisMeta {
        &self.axes
    }

    /// Annotations.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// True when the samples are discrete labels.
    #[must_use]
    pub fn label_data(&self) -> bool {
        self.label_data
    }

    /// Opaque identifier.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Unit of the sample values.
    #[must_use]
    pub fn data_unit(&self) -> &str {
        &self.data_unit
    }

    /// Defaults the grid was built with.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Physical coordinate of sample `index` along `axis`.
    #[must_use]
    pub fn coordinate(&self, axis: usize, index: usize) -> Option<f64> {
        (axis < self.ndim()).then(|| self.axes.offsets[axis] + index as f64 * self.axes.voxel_size[axis])
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Borrows the samples without metadata.
    #[must_use]
    pub fn as_plain(&self) -> &NdBuffer<T> {
        &self.buffer
    }

    /// Consumes the grid, returning its samples.
    #[must_use]
    pub fn into_plain(self) -> NdBuffer<T> {
        debug!(operation = %Operation::IntoPlain, "discarding axis metadata");
        self.buffer
    }

    /// Returns the sample at the given indices.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        self.buffer.get(indices)
    }

    /// Returns the value of a single-sample grid.
    pub fn item(&self) -> Result<T> {
        debug!(operation = %Operation::Item, "extracting scalar");
        self.buffer.item()
    }

    /// Alias of [`Self::item`].
    pub fn to_scalar(&self) -> Result<T> {
        self.item()
    }

    /// Returns the samples as a row-major vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.to_vec()
    }

    // =========================================================================
    // Elementwise
    // =========================================================================

    /// Applies a function to every sample; metadata is kept.
    #[must_use]
    pub fn map<U: Scalar, F: Fn(T) -> U>(&self, f: F) -> GridArray<U> {
        self.rewrap(self.buffer.map(f))
    }

    /// Combines the samples with another buffer after broadcasting.
    ///
    /// Metadata is kept when the result has this grid's shape. Otherwise the
    /// result is a plain buffer.
    pub fn zip_with<U, R, F>(&self, other: &NdBuffer<U>, f: F) -> Result<ArrayValue<R>>
    where
        U: Scalar,
        R: Scalar,
        F: Fn(T, U) -> R,
    {
        let result = self.buffer.zip_with(other, f)?;
        if result.shape() == self.shape() {
            Ok(ArrayValue::Grid(self.rewrap(result)))
        } else {
            debug!(
                from = ?self.shape(),
                to = ?result.shape(),
                "broadcast changed shape; discarding axis metadata"
            );
            Ok(ArrayValue::Plain(result))
        }
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

impl<T: Numeric> GridArray<T> {
    /// Elementwise addition with broadcasting.
    pub fn add(&self, other: &NdBuffer<T>) -> Result<ArrayValue<T>> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise subtraction with broadcasting.
    pub fn sub(&self, other: &NdBuffer<T>) -> Result<ArrayValue<T>> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise multiplication with broadcasting.
    pub fn mul(&self, other: &NdBuffer<T>) -> Result<ArrayValue<T>> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise division with broadcasting.
    pub fn div(&self, other: &NdBuffer<T>) -> Result<ArrayValue<T>> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Adds a scalar to every sample.
    #[must_use]
    pub fn add_scalar(&self, scalar: T) -> Self {
        self.rewrap(self.buffer.add_scalar(scalar))
    }

    /// Subtracts a scalar from every sample.
    #[must_use]
    pub fn sub_scalar(&self, scalar: T) -> Self {
        self.rewrap(self.buffer.sub_scalar(scalar))
    }

    /// Multiplies every sample by a scalar.
    #[must_use]
    pub fn mul_scalar(&self, scalar: T) -> Self {
        self.rewrap(self.buffer.mul_scalar(scalar))
    }

    /// Divides every sample by a scalar.
    #[must_use]
    pub fn div_scalar(&self, scalar: T) -> Self {
        self.rewrap(self.buffer.div_scalar(scalar))
    }
}

// =============================================================================
// Conversions and Equality
// =============================================================================

impl<T: Scalar> From<NdBuffer<T>> for GridArray<T> {
    fn from(buffer: NdBuffer<T>) -> Self {
        Self::new(buffer)
    }
}

/// Grids are equal when samples and metadata match; the configuration they
/// were built with is not compared.
impl<T: Scalar + PartialEq> PartialEq for GridArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
            && self.axes == other.axes
            && self.metadata == other.metadata
            && self.label_data == other.label_data
            && self.id == other.id
            && self.data_unit == other.data_unit
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl<T: Scalar> fmt::Debug for GridArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridArray")
            .field("axis_labels", &self.axes.labels)
            .field("axis_units", &self.axes.units)
            .field("axis_offsets", &self.axes.offsets)
            .field("voxel_size", &self.axes.voxel_size)
            .field("metadata", &self.metadata)
            .field("label_data", &self.label_data)
            .field("id", &self.id)
            .field("data_unit", &self.data_unit)
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl<T: Scalar> fmt::Display for GridArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "axis_labels: {:?}", self.axes.labels.as_slice())?;
        writeln!(f, "axis_units: {:?}", self.axes.units.as_slice())?;
        writeln!(f, "axis_offsets: {:?}", self.axes.offsets.as_slice())?;
        writeln!(f, "voxel_size: {:?}", self.axes.voxel_size.as_slice())?;
        writeln!(f, "metadata: {:?}", self.metadata)?;
        writeln!(f, "label_data: {}", self.label_data)?;
        writeln!(f, "id: {:?}", self.id)?;
        writeln!(f, "data_unit: {:?}", self.data_unit)?;
        write!(f, "data ({}): ", T::DTYPE)?;
        write_nested(f, &self.buffer.to_vec(), self.buffer.shape())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetaValue;
    use rafters_core::error::Error;

    fn grid_2x3() -> GridArray<f64> {
        GridArray::from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &[2, 3],
            GridFields::new().axis_labels(["y", "x"]).axis_units(["um", "um"]),
        )
        .unwrap()
    }

    #[test]
    fn test_new_fills_defaults() {
        let g = GridArray::new(NdBuffer::<f32>::zeros(&[2, 3, 4]));
        assert_eq!(g.axis_labels(), &["0", "1", "2"]);
        assert_eq!(g.axis_units(), &["pix", "pix", "pix"]);
        assert_eq!(g.axis_offsets(), &[0.0, 0.0, 0.0]);
        assert_eq!(g.voxel_size(), &[1.0, 1.0, 1.0]);
        assert!(g.metadata().is_empty());
        assert!(!g.label_data());
        assert_eq!(g.id(), None);
        assert_eq!(g.data_unit(), "");
    }

    #[test]
    fn test_from_buffer() {
        let g: GridArray<i32> = NdBuffer::from_vec(vec![1, 2], &[2]).unwrap().into();
        assert_eq!(g.axis_labels(), &["0"]);
    }

    #[test]
    fn test_with_fields_validates() {
        let err = GridArray::with_fields(
            NdBuffer::<f64>::zeros(&[2, 2]),
            GridFields::new().axis_labels(["only-one"]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata { .. }));
    }

    #[test]
    fn test_with_config() {
        let config = GridConfig {
            axis_unit: "nm".to_string(),
            ..GridConfig::default()
        };
        let g = GridArray::with_config(NdBuffer::<f64>::zeros(&[2]), GridFields::new(), config).unwrap();
        assert_eq!(g.axis_units(), &["nm"]);
        assert_eq!(g.config().axis_unit, "nm");

        // derived grids carry the configuration
        assert_eq!(g.mul_scalar(2.0).config().axis_unit, "nm");
    }

    #[test]
    fn test_coordinate() {
        let g = GridArray::with_fields(
            NdBuffer::<f64>::zeros(&[4]),
            GridFields::new().axis_offsets(vec![10.0]).voxel_size(vec![0.5]),
        )
        .unwrap();
        assert_eq!(g.coordinate(0, 2), Some(11.0));
        assert_eq!(g.coordinate(1, 0), None);
    }

    #[test]
    fn test_elementwise_preserves_metadata() {
        let g = grid_2x3();
        let doubled = g.mul_scalar(2.0);
        assert_eq!(doubled.to_vec(), vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
        assert_eq!(doubled.axis_labels(), g.axis_labels());

        let mask = g.map(|v| u8::from(v > 3.0));
        assert_eq!(mask.to_vec(), vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(mask.axis_units(), &["um", "um"]);
    }

    #[test]
    fn test_broadcast_same_shape_keeps_grid() {
        let g = grid_2x3();
        let row = NdBuffer::from_vec(vec![10.0, 20.0, 30.0], &[3]).unwrap();
        let sum = g.add(&row).unwrap();
        assert!(sum.is_grid());
        assert_eq!(sum.buffer().to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_broadcast_shape_change_downgrades() {
        let g = grid_2x3();
        let stacked = NdBuffer::<f64>::ones(&[4, 1, 1]);
        let result = g.mul(&stacked).unwrap();
        assert!(result.is_plain());
        assert_eq!(result.shape(), &[4, 2, 3]);

        let bad = NdBuffer::<f64>::ones(&[4]);
        assert!(matches!(g.add(&bad), Err(Error::BroadcastError { .. })));
    }

    #[test]
    fn test_equality_ignores_config() {
        let a = grid_2x3();
        let b = GridArray::with_config(
            a.as_plain().clone(),
            a.attrs().into_fields(),
            GridConfig {
                axis_unit: "mm".to_string(),
                ..GridConfig::default()
            },
        )
        .unwrap();
        assert_eq!(a, b);

        let c = GridArray::with_fields(a.as_plain().clone(), a.attrs().into_fields().id("other")).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_item() {
        let g = GridArray::new(NdBuffer::scalar(7_i64));
        assert_eq!(g.item().unwrap(), 7);
        assert_eq!(g.to_scalar().unwrap(), 7);
        assert!(grid_2x3().item().is_err());
    }

    #[test]
    fn test_display_lists_attributes() {
        let mut metadata = Metadata::new();
        metadata.insert("gain".to_string(), MetaValue::Int(2));
        let g = GridArray::from_vec(vec![1_i32, 2], &[2], GridFields::new().metadata(metadata)).unwrap();
        let text = g.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "axis_labels: [\"0\"]");
        assert_eq!(lines[3], "voxel_size: [1.0]");
        assert_eq!(lines[8], "data (i32): [1, 2]");
        assert!(format!("{g:?}").starts_with("GridArray {"));
    }
}
