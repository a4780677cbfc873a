//! Metadata - Axis Coordinates and Annotations
//!
//! Describes what a grid knows beyond its samples: one label, unit, offset and
//! voxel size per axis, plus whole-array annotations. Every grid-producing
//! operation goes through [`materialize_defaults`], which fills what the caller
//! left out and rejects per-axis sequences whose length disagrees with the rank
//! as well as repeated axis labels.
//!
//! Axis offsets are the coordinate of the center of sample 0. Sample `i` of an
//! axis sits at `offset + i * voxel_size`.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use rafters_core::config::GridConfig;
use rafters_core::error::{Error, Result};

use crate::view::AxisRange;

// =============================================================================
// Metadata Values
// =============================================================================

/// Free-form annotation map attached to a grid.
pub type Metadata = BTreeMap<String, MetaValue>;

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaValue {
    /// Absent value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(#[serde(with = "crate::lossless")] f64),
    /// Text.
    Str(String),
    /// Ordered list of values.
    List(Vec<MetaValue>),
    /// Nested mapping.
    Map(Metadata),
}

impl MetaValue {
    /// Returns the value as f64 if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    /// Returns the value as i64 if it is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bool if it is a flag.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the nested mapping, if any.
    #[must_use]
    pub fn as_map(&self) -> Option<&Metadata> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns true for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

macro_rules! impl_meta_from {
    ($($ty:ty => $variant:ident($conv:expr)),* $(,)?) => {
        $(
            impl From<$ty> for MetaValue {
                fn from(v: $ty) -> Self {
                    Self::$variant($conv(v))
                }
            }
        )*
    };
}

impl_meta_from! {
    bool => Bool(core::convert::identity),
    i32 => Int(i64::from),
    i64 => Int(core::convert::identity),
    u32 => Int(i64::from),
    f32 => Float(f64::from),
    f64 => Float(core::convert::identity),
    String => Str(core::convert::identity),
    &str => Str(String::from),
    Vec<MetaValue> => List(core::convert::identity),
    Metadata => Map(core::convert::identity),
}

// =============================================================================
// Axis Metadata
// =============================================================================

/// Per-axis coordinate metadata, one entry per axis in each sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMeta {
    /// Axis names.
    pub labels: SmallVec<[String; 6]>,
    /// Physical unit of each axis.
    pub units: SmallVec<[String; 6]>,
    /// Coordinate of the center of sample 0.
    pub offsets: SmallVec<[f64; 6]>,
    /// Distance between neighbouring samples.
    pub voxel_size: SmallVec<[f64; 6]>,
}

impl AxisMeta {
    /// Default metadata for `ndim` axes.
    #[must_use]
    pub fn defaults(ndim: usize, config: &GridConfig) -> Self {
        Self {
            labels: (0..ndim).map(|i| i.to_string()).collect(),
            units: (0..ndim).map(|_| config.axis_unit.clone()).collect(),
            offsets: SmallVec::from_elem(config.axis_offset, ndim),
            voxel_size: SmallVec::from_elem(config.voxel_size, ndim),
        }
    }

    /// Returns the number of axes described.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.labels.len()
    }

    /// Checks that every sequence has one entry per axis.
    pub fn validate(&self, ndim: usize) -> Result<()> {
        let lengths = [
            ("axis_labels", self.labels.len()),
            ("axis_units", self.units.len()),
            ("axis_offsets", self.offsets.len()),
            ("voxel_size", self.voxel_size.len()),
        ];
        for (field, len) in lengths {
            if len != ndim {
                return Err(Error::axis_length_mismatch(field, len, ndim));
            }
        }
        // Labels key the demoted `{label}_avg` entries, so they must be unique.
        for (a, label) in self.labels.iter().enumerate() {
            if self.labels[..a].contains(label) {
                return Err(Error::invalid_metadata(format!(
                    "axis label {label:?} is used by more than one axis"
                )));
            }
        }
        Ok(())
    }

    /// Reverses every sequence.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        out.labels.reverse();
        out.units.reverse();
        out.offsets.reverse();
        out.voxel_size.reverse();
        out
    }

    /// Adjusts offsets and voxel sizes for a strided slice.
    ///
    /// Axis `a` starts at `offset + start * voxel` with spacing `voxel * step`.
    #[must_use]
    pub fn sliced(&self, ranges: &[AxisRange]) -> Self {
        let mut out = self.clone();
        for (a, range) in ranges.iter().enumerate() {
            out.offsets[a] = self.offsets[a] + range.start as f64 * self.voxel_size[a];
            out.voxel_size[a] = self.voxel_size[a] * range.step as f64;
        }
        out
    }

    /// Coordinate of the center of the first `count` samples of an axis.
    #[must_use]
    pub fn centroid(&self, axis: usize, count: usize) -> f64 {
        let voxel = self.voxel_size[axis];
        self.offsets[axis] - voxel / 2.0 + voxel * count as f64 / 2.0
    }

    /// Metadata after collapsing `axes` to extent 1.
    ///
    /// The collapsed sample spans the whole axis and sits at its centroid.
    #[must_use]
    pub fn reduced_keepdims(&self, axes: &[usize], shape: &[usize]) -> Self {
        let mut out = self.clone();
        for &a in axes {
            out.offsets[a] = self.centroid(a, shape[a]);
            out.voxel_size[a] = self.voxel_size[a] * shape[a] as f64;
        }
        out
    }

    /// Metadata after removing `axes`, recording each removed axis' centroid
    /// and unit in `metadata`.
    #[must_use]
    pub fn removed(
        &self,
        axes: &[usize],
        shape: &[usize],
        config: &GridConfig,
        metadata: &mut Metadata,
    ) -> Self {
        for &a in axes {
            let label = &self.labels[a];
            metadata.insert(config.avg_key(label), MetaValue::Float(self.centroid(a, shape[a])));
            metadata.insert(config.unit_key(label), MetaValue::Str(self.units[a].clone()));
        }

        let keep = |a: &usize| !axes.contains(a);
        Self {
            labels: self.labels.iter().enumerate().filter(|(a, _)| keep(a)).map(|(_, v)| v.clone()).collect(),
            units: self.units.iter().enumerate().filter(|(a, _)| keep(a)).map(|(_, v)| v.clone()).collect(),
            offsets: self.offsets.iter().enumerate().filter(|(a, _)| keep(a)).map(|(_, &v)| v).collect(),
            voxel_size: self.voxel_size.iter().enumerate().filter(|(a, _)| keep(a)).map(|(_, &v)| v).collect(),
        }
    }
}

// =============================================================================
// Supplied Fields
// =============================================================================

/// Metadata supplied by a caller; anything left `None` is defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFields {
    /// Axis names, one per axis.
    pub axis_labels: Option<Vec<String>>,
    /// Axis units, one per axis.
    pub axis_units: Option<Vec<String>>,
    /// Axis offsets, one per axis.
    pub axis_offsets: Option<Vec<f64>>,
    /// Voxel sizes, one per axis.
    pub voxel_size: Option<Vec<f64>>,
    /// Annotation map; must be a [`MetaValue::Map`].
    pub metadata: Option<MetaValue>,
    /// True when samples are discrete labels rather than a continuous field.
    pub label_data: Option<bool>,
    /// Opaque identifier.
    pub id: Option<String>,
    /// Unit of the sample values.
    pub data_unit: Option<String>,
}

impl GridFields {
    /// Creates an empty set of fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the axis labels.
    #[must_use]
    pub fn axis_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axis_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the axis units.
    #[must_use]
    pub fn axis_units<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axis_units = Some(units.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the axis offsets.
    #[must_use]
    pub fn axis_offsets(mut self, offsets: impl Into<Vec<f64>>) -> Self {
        self.axis_offsets = Some(offsets.into());
        self
    }

    /// Sets the voxel sizes.
    #[must_use]
    pub fn voxel_size(mut self, voxel_size: impl Into<Vec<f64>>) -> Self {
        self.voxel_size = Some(voxel_size.into());
        self
    }

    /// Sets the annotation map.
    #[must_use]
    pub fn metadata(mut self, metadata: impl Into<MetaValue>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Marks the samples as label data.
    #[must_use]
    pub fn label_data(mut self, label_data: bool) -> Self {
        self.label_data = Some(label_data);
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the unit of the sample values.
    #[must_use]
    pub fn data_unit(mut self, unit: impl Into<String>) -> Self {
        self.data_unit = Some(unit.into());
        self
    }
}

// =============================================================================
// Materialized Attributes
// =============================================================================

/// The complete, validated attribute set of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAttrs {
    /// Per-axis metadata.
    pub axes: AxisMeta,
    /// Annotations.
    pub metadata: Metadata,
    /// Label-data flag.
    pub label_data: bool,
    /// Opaque identifier.
    pub id: Option<String>,
    /// Unit of the sample values.
    pub data_unit: String,
}

impl GridAttrs {
    /// Converts back into supplied fields with every entry present.
    #[must_use]
    pub fn into_fields(self) -> GridFields {
        GridFields {
            axis_labels: Some(self.axes.labels.into_vec()),
            axis_units: Some(self.axes.units.into_vec()),
            axis_offsets: Some(self.axes.offsets.into_vec()),
            voxel_size: Some(self.axes.voxel_size.into_vec()),
            metadata: Some(MetaValue::Map(self.metadata)),
            label_data: Some(self.label_data),
            id: self.id,
            data_unit: Some(self.data_unit),
        }
    }
}

/// Fills unsupplied fields with defaults and validates the result for a
/// buffer of rank `ndim`.
///
/// Each field is defaulted independently.
pub fn materialize_defaults(ndim: usize, fields: GridFields, config: &GridConfig) -> Result<GridAttrs> {
    let defaults = AxisMeta::defaults(ndim, config);

    let axes = AxisMeta {
        labels: fields.axis_labels.map_or(defaults.labels, SmallVec::from_vec),
        units: fields.axis_units.map_or(defaults.units, SmallVec::from_vec),
        offsets: fields.axis_offsets.map_or(defaults.offsets, SmallVec::from_vec),
        voxel_size: fields.voxel_size.map_or(defaults.voxel_size, SmallVec::from_vec),
    };
    axes.validate(ndim)?;

    let metadata = match fields.metadata {
        None => Metadata::new(),
        Some(MetaValue::Map(map)) => map,
        Some(other) => {
            return Err(Error::invalid_metadata(format!(
                "metadata must be a map, got {}",
                other.kind()
            )))
        }
    };

    Ok(GridAttrs {
        axes,
        metadata,
        label_data: fields.label_data.unwrap_or(false),
        id: fields.id,
        data_unit: fields.data_unit.unwrap_or_else(|| config.data_unit.clone()),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GridConfig {
        GridConfig::default()
    }

    #[test]
    fn test_defaults() {
        let attrs = materialize_defaults(2, GridFields::new(), &config()).unwrap();
        assert_eq!(attrs.axes.labels.as_slice(), &["0", "1"]);
        assert_eq!(attrs.axes.units.as_slice(), &["pix", "pix"]);
        assert_eq!(attrs.axes.offsets.as_slice(), &[0.0, 0.0]);
        assert_eq!(attrs.axes.voxel_size.as_slice(), &[1.0, 1.0]);
        assert!(attrs.metadata.is_empty());
        assert!(!attrs.label_data);
        assert_eq!(attrs.id, None);
        assert_eq!(attrs.data_unit, "");
    }

    #[test]
    fn test_fields_default_independently() {
        let fields = GridFields::new().axis_units(["um", "um"]).id("scan-7");
        let attrs = materialize_defaults(2, fields, &config()).unwrap();
        assert_eq!(attrs.axes.units.as_slice(), &["um", "um"]);
        assert_eq!(attrs.axes.labels.as_slice(), &["0", "1"]);
        assert_eq!(attrs.id.as_deref(), Some("scan-7"));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let fields = GridFields::new().voxel_size(vec![1.0]);
        let err = materialize_defaults(2, fields, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata { .. }));
        assert!(err.to_string().contains("voxel_size"));
    }

    #[test]
    fn test_duplicate_labels_are_rejected() {
        let fields = GridFields::new().axis_labels(["t", "x", "t"]);
        let err = materialize_defaults(3, fields, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata { .. }));
        assert!(err.to_string().contains("\"t\""));

        let fields = GridFields::new().axis_labels(["t", "x", "y"]);
        assert!(materialize_defaults(3, fields, &config()).is_ok());
    }

    #[test]
    fn test_non_map_metadata_is_rejected() {
        let fields = GridFields::new().metadata(3.5_f64);
        let err = materialize_defaults(1, fields, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata { .. }));
    }

    #[test]
    fn test_rank_zero() {
        let attrs = materialize_defaults(0, GridFields::new(), &config()).unwrap();
        assert_eq!(attrs.axes.ndim(), 0);
    }

    #[test]
    fn test_configured_defaults() {
        let config = GridConfig {
            axis_unit: "mm".to_string(),
            voxel_size: 0.5,
            data_unit: "K".to_string(),
            ..GridConfig::default()
        };
        let attrs = materialize_defaults(1, GridFields::new(), &config).unwrap();
        assert_eq!(attrs.axes.units.as_slice(), &["mm"]);
        assert_eq!(attrs.axes.voxel_size.as_slice(), &[0.5]);
        assert_eq!(attrs.data_unit, "K");
    }

    #[test]
    fn test_into_fields_roundtrip() {
        let mut metadata = Metadata::new();
        metadata.insert("gain".to_string(), MetaValue::from(2_i64));
        let fields = GridFields::new()
            .axis_labels(["y", "x"])
            .metadata(metadata)
            .label_data(true)
            .data_unit("counts");
        let attrs = materialize_defaults(2, fields, &config()).unwrap();
        let again = materialize_defaults(2, attrs.clone().into_fields(), &config()).unwrap();
        assert_eq!(again, attrs);
    }

    #[test]
    fn test_sliced_axis() {
        let axes = AxisMeta {
            voxel_size: SmallVec::from_slice(&[2.0]),
            ..AxisMeta::defaults(1, &config())
        };
        let sliced = axes.sliced(&[AxisRange {
            start: 2,
            step: 2,
            len: 3,
        }]);
        assert_eq!(sliced.offsets.as_slice(), &[4.0]);
        assert_eq!(sliced.voxel_size.as_slice(), &[4.0]);
    }

    #[test]
    fn test_centroid() {
        let axes = AxisMeta {
            offsets: SmallVec::from_slice(&[10.0]),
            voxel_size: SmallVec::from_slice(&[2.0]),
            ..AxisMeta::defaults(1, &config())
        };
        // samples at 10, 12, 14, 16 -> center 13
        assert_eq!(axes.centroid(0, 4), 13.0);

        let collapsed = axes.reduced_keepdims(&[0], &[4]);
        assert_eq!(collapsed.offsets.as_slice(), &[13.0]);
        assert_eq!(collapsed.voxel_size.as_slice(), &[8.0]);
    }

    #[test]
    fn test_removed_demotes_into_metadata() {
        let axes = AxisMeta {
            labels: SmallVec::from_vec(vec!["z".to_string(), "x".to_string()]),
            units: SmallVec::from_vec(vec!["um".to_string(), "pix".to_string()]),
            ..AxisMeta::defaults(2, &config())
        };
        let mut metadata = Metadata::new();
        let kept = axes.removed(&[0], &[5, 6], &config(), &mut metadata);

        assert_eq!(kept.labels.as_slice(), &["x"]);
        assert_eq!(metadata.get("z_avg"), Some(&MetaValue::Float(2.0)));
        assert_eq!(metadata.get("z_unit"), Some(&MetaValue::Str("um".to_string())));
    }

    #[test]
    fn test_meta_value_accessors() {
        assert_eq!(MetaValue::from(3_i64).as_i64(), Some(3));
        assert_eq!(MetaValue::from(3_i64).as_f64(), Some(3.0));
        assert_eq!(MetaValue::from("a").as_str(), Some("a"));
        assert_eq!(MetaValue::from(true).as_bool(), Some(true));
        assert!(MetaValue::Null.is_null());
        assert!(MetaValue::from(Metadata::new()).as_map().is_some());
    }
}
