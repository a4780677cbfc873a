//! Frozen Grids - Serialization Boundary
//!
//! A grid freezes into a dtype-tagged byte buffer plus a plain map of its
//! attributes. Thawing goes back through the normal construction path, so a
//! tampered field map is rejected exactly like bad constructor input.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::{DType, Scalar};
use rafters_core::error::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::buffer::NdBuffer;
use crate::grid::GridArray;
use crate::metadata::{GridFields, MetaValue, Metadata};
use crate::shape::checked_numel;

// =============================================================================
// Raw Buffer
// =============================================================================

/// Samples as contiguous little-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBuffer {
    /// Element type of the samples.
    pub dtype: DType,
    /// Shape of the samples.
    pub shape: Vec<usize>,
    /// Row-major sample bytes, least significant byte first.
    pub bytes: Vec<u8>,
}

/// Converts between host and little-endian byte order in place.
///
/// Swapping is its own inverse, so the same call encodes and decodes.
fn swap_to_little_endian(bytes: &mut [u8], width: usize) {
    if cfg!(target_endian = "big") && width > 1 {
        for sample in bytes.chunks_exact_mut(width) {
            sample.reverse();
        }
    }
}

impl RawBuffer {
    /// Captures a buffer's samples in row-major order.
    pub fn from_buffer<T: Scalar>(buffer: &NdBuffer<T>) -> Self {
        let mut bytes = bytemuck::cast_slice(&buffer.to_vec()).to_vec();
        swap_to_little_endian(&mut bytes, T::DTYPE.size_of());
        Self {
            dtype: T::DTYPE,
            shape: buffer.shape().to_vec(),
            bytes,
        }
    }

    /// Rebuilds a buffer of element type `T`.
    pub fn to_buffer<T: Scalar>(&self) -> Result<NdBuffer<T>> {
        if self.dtype != T::DTYPE {
            return Err(Error::DTypeMismatch {
                expected: T::DTYPE,
                actual: self.dtype,
            });
        }

        let numel = checked_numel(&self.shape)
            .ok_or_else(|| Error::invalid_metadata(format!("frozen shape {:?} is too large", self.shape)))?;
        let expected = numel
            .checked_mul(self.dtype.size_of())
            .ok_or_else(|| Error::invalid_metadata(format!("frozen shape {:?} is too large", self.shape)))?;
        if self.bytes.len() != expected {
            return Err(Error::shape_mismatch(&[expected], &[self.bytes.len()]));
        }

        let mut data = vec![T::zeroed(); numel];
        let bytes = bytemuck::cast_slice_mut::<T, u8>(&mut data);
        bytes.copy_from_slice(&self.bytes);
        swap_to_little_endian(bytes, T::DTYPE.size_of());
        NdBuffer::from_vec(data, &self.shape)
    }
}

// =============================================================================
// Field Map
// =============================================================================

/// Every grid attribute, as plain serializable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    /// Axis names.
    pub axis_labels: Vec<String>,
    /// Axis units.
    pub axis_units: Vec<String>,
    /// Coordinate of the center of sample 0 on each axis.
    #[serde(with = "crate::lossless::seq")]
    pub axis_offsets: Vec<f64>,
    /// Sample spacing on each axis.
    #[serde(with = "crate::lossless::seq")]
    pub voxel_size: Vec<f64>,
    /// Annotations.
    pub metadata: Metadata,
    /// Label-data flag.
    pub label_data: bool,
    /// Identifier.
    pub id: Option<String>,
    /// Unit of the sample values.
    pub data_unit: String,
}

impl From<FieldMap> for GridFields {
    fn from(fields: FieldMap) -> Self {
        GridFields {
            axis_labels: Some(fields.axis_labels),
            axis_units: Some(fields.axis_units),
            axis_offsets: Some(fields.axis_offsets),
            voxel_size: Some(fields.voxel_size),
            metadata: Some(MetaValue::Map(fields.metadata)),
            label_data: Some(fields.label_data),
            id: fields.id,
            data_unit: Some(fields.data_unit),
        }
    }
}

/// A frozen grid: bytes plus attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrozenGrid {
    /// Samples.
    pub buffer: RawBuffer,
    /// Attributes.
    pub fields: FieldMap,
}

impl FrozenGrid {
    /// Thaws into a grid of element type `T`.
    pub fn thaw<T: Scalar>(self) -> Result<GridArray<T>> {
        GridArray::thaw(&self.buffer, self.fields)
    }
}

// =============================================================================
// Freeze / Thaw
// =============================================================================

impl<T: Scalar> GridArray<T> {
    /// Splits the grid into raw bytes and its attribute map.
    pub fn freeze(&self) -> (RawBuffer, FieldMap) {
        let attrs = self.attrs();
        let fields = FieldMap {
            axis_labels: attrs.axes.labels.into_vec(),
            axis_units: attrs.axes.units.into_vec(),
            axis_offsets: attrs.axes.offsets.into_vec(),
            voxel_size: attrs.axes.voxel_size.into_vec(),
            metadata: attrs.metadata,
            label_data: attrs.label_data,
            id: attrs.id,
            data_unit: attrs.data_unit,
        };
        (RawBuffer::from_buffer(&self.buffer), fields)
    }

    /// Freezes into a single serializable value.
    pub fn to_frozen(&self) -> FrozenGrid {
        let (buffer, fields) = self.freeze();
        FrozenGrid { buffer, fields }
    }

    /// Rebuilds a grid from frozen parts, validating them like constructor
    /// input.
    pub fn thaw(raw: &RawBuffer, fields: FieldMap) -> Result<Self> {
        GridArray::with_fields(raw.to_buffer()?, fields.into())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GridArray<f32> {
        let mut notes = Metadata::new();
        notes.insert("stage".to_string(), MetaValue::from("raw"));
        notes.insert("exposure".to_string(), MetaValue::from(0.25_f64));
        GridArray::from_vec(
            (0..12).map(|i| i as f32 * 0.5).collect(),
            &[3, 4],
            GridFields::new()
                .axis_labels(["y", "x"])
                .axis_units(["um", "um"])
                .axis_offsets(vec![-1.0, 2.5])
                .voxel_size(vec![0.1, 0.2])
                .metadata(notes)
                .id("scan-7")
                .data_unit("counts"),
        )
        .unwrap()
    }

    #[test]
    fn test_freeze_thaw_round_trip() {
        let g = sample();
        let (raw, fields) = g.freeze();
        assert_eq!(raw.dtype, DType::F32);
        assert_eq!(raw.bytes.len(), 12 * 4);
        assert_eq!(fields.axis_labels, vec!["y", "x"]);

        let back = GridArray::<f32>::thaw(&raw, fields).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_freeze_strided_view() {
        let g = sample().transpose();
        let back = g.to_frozen().thaw::<f32>().unwrap();
        assert_eq!(back, g);
        assert!(back.as_plain().is_contiguous());
    }

    #[test]
    fn test_frozen_json() {
        let frozen = sample().to_frozen();
        let json = serde_json::to_string(&frozen).unwrap();
        let parsed: FrozenGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frozen);
    }

    #[test]
    fn test_thaw_dtype_mismatch() {
        let (raw, fields) = sample().freeze();
        let err = GridArray::<f64>::thaw(&raw, fields).unwrap_err();
        assert_eq!(
            err,
            Error::DTypeMismatch {
                expected: DType::F64,
                actual: DType::F32
            }
        );
    }

    #[test]
    fn test_thaw_byte_length_mismatch() {
        let (mut raw, fields) = sample().freeze();
        raw.bytes.truncate(10);
        assert!(matches!(
            GridArray::<f32>::thaw(&raw, fields),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_thaw_rejects_oversized_shape() {
        let (mut raw, fields) = sample().freeze();
        raw.shape = vec![usize::MAX, 4];
        assert!(matches!(
            GridArray::<f32>::thaw(&raw, fields.clone()),
            Err(Error::InvalidMetadata { .. })
        ));

        // isize::MAX elements pass the count but not the byte size
        raw.shape = vec![isize::MAX as usize];
        assert!(matches!(
            GridArray::<f32>::thaw(&raw, fields),
            Err(Error::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn test_bytes_are_little_endian() {
        let raw = RawBuffer::from_buffer(&NdBuffer::from_vec(vec![1_u16, 0x0203], &[2]).unwrap());
        assert_eq!(raw.bytes, vec![1, 0, 3, 2]);
        assert_eq!(raw.to_buffer::<u16>().unwrap().to_vec(), vec![1, 0x0203]);

        let raw = RawBuffer {
            dtype: DType::F64,
            shape: vec![1],
            bytes: 1.5_f64.to_le_bytes().to_vec(),
        };
        assert_eq!(raw.to_buffer::<f64>().unwrap().to_vec(), vec![1.5]);
    }

    #[test]
    fn test_non_finite_fields_survive_json() {
        let mut notes = Metadata::new();
        notes.insert("gain".to_string(), MetaValue::from(f64::NAN));
        notes.insert("limit".to_string(), MetaValue::from(f64::NEG_INFINITY));
        let g = GridArray::from_vec(
            vec![1.0_f32, 2.0],
            &[2],
            GridFields::new()
                .axis_offsets(vec![f64::INFINITY])
                .voxel_size(vec![f64::NAN])
                .metadata(notes),
        )
        .unwrap();

        let json = serde_json::to_string(&g.to_frozen()).unwrap();
        let back = serde_json::from_str::<FrozenGrid>(&json).unwrap().thaw::<f32>().unwrap();
        assert_eq!(back.axis_offsets(), &[f64::INFINITY]);
        assert!(back.voxel_size()[0].is_nan());
        assert!(back.metadata()["gain"].as_f64().is_some_and(f64::is_nan));
        assert_eq!(back.metadata()["limit"], MetaValue::Float(f64::NEG_INFINITY));
        assert_eq!(back.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_thaw_rejects_bad_fields() {
        let (raw, mut fields) = sample().freeze();
        fields.voxel_size.pop();
        assert!(matches!(
            GridArray::<f32>::thaw(&raw, fields),
            Err(Error::InvalidMetadata { .. })
        ));
    }
}
