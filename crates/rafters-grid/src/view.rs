//! Views and Slicing - Buffer Indexing Operations
//!
//! Provides slice specifications and the index resolution shared by plain
//! buffers and grids. Range slices resolve exactly like Python's
//! `slice.indices`: negative bounds count from the end, omitted bounds depend
//! on the sign of the step, and a zero step is rejected.
//!
//! # Key Features
//! - Zero-copy strided slicing (including negative steps)
//! - Integer indexing that drops an axis
//! - New-axis insertion
//! - Boolean masking
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::Scalar;
use rafters_core::error::{Error, Result};

use crate::buffer::NdBuffer;
use crate::shape::{Shape, Strides};

// =============================================================================
// Slice Specification
// =============================================================================

/// Specifies how to index along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceSpec {
    /// Select a single index, removing the axis.
    Index(isize),
    /// Select `start..stop` in steps of `step`.
    Range {
        /// Start index, None = first element in step direction
        start: Option<isize>,
        /// Stop index (exclusive), None = past the last element in step direction
        stop: Option<isize>,
        /// Step size, must be non-zero
        step: isize,
    },
    /// Keep all elements in this axis.
    All,
    /// Insert a new axis of extent 1.
    NewAxis,
}

impl SliceSpec {
    /// Creates a range slice from start to stop.
    #[must_use]
    pub fn range(start: isize, stop: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }

    /// Creates a range slice with step.
    #[must_use]
    pub fn range_step(start: isize, stop: isize, step: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step,
        }
    }

    /// Creates a slice from start to the end.
    #[must_use]
    pub fn from(start: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: None,
            step: 1,
        }
    }

    /// Creates a slice from the beginning to stop.
    #[must_use]
    pub fn to(stop: isize) -> Self {
        Self::Range {
            start: None,
            stop: Some(stop),
            step: 1,
        }
    }

    /// Creates a slice over the whole axis with the given step (`::step`).
    #[must_use]
    pub fn step(step: isize) -> Self {
        Self::Range {
            start: None,
            stop: None,
            step,
        }
    }

    /// Returns true for specs that keep the axis as a strided range.
    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. } | Self::All)
    }

    /// Resolves a range spec against an axis of length `len`.
    ///
    /// Returns `None` for `Index` and `NewAxis`.
    pub fn resolve(&self, len: usize) -> Result<Option<AxisRange>> {
        match *self {
            Self::All => Ok(Some(AxisRange {
                start: 0,
                step: 1,
                len,
            })),
            Self::Range { start, stop, step } => resolve_range(start, stop, step, len).map(Some),
            Self::Index(_) | Self::NewAxis => Ok(None),
        }
    }
}

// =============================================================================
// Resolved Range
// =============================================================================

/// A range slice resolved against a concrete axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    /// Index of the first selected element.
    pub start: isize,
    /// Distance between selected elements.
    pub step: isize,
    /// Number of selected elements.
    pub len: usize,
}

impl AxisRange {
    /// Buffer stride of the selected axis given the parent stride.
    ///
    /// A step never reaches past a single selected element, so the parent
    /// stride is kept when fewer than two elements are selected.
    #[must_use]
    pub fn stride(&self, parent: isize) -> isize {
        if self.len > 1 {
            parent * self.step
        } else {
            parent
        }
    }
}

/// Resolves `start:stop:step` with Python `slice.indices` semantics.
pub fn resolve_range(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    len: usize,
) -> Result<AxisRange> {
    if step == 0 {
        return Err(Error::invalid_operation("slice step cannot be zero"));
    }

    let n = len as isize;
    let (lower, upper) = if step < 0 { (-1, n - 1) } else { (0, n) };

    let clamp = |bound: isize| {
        if bound < 0 {
            (bound + n).max(lower)
        } else {
            bound.min(upper)
        }
    };

    let start = start.map_or(if step < 0 { upper } else { lower }, clamp);
    let stop = stop.map_or(if step < 0 { lower } else { upper }, clamp);

    // Bounds are clamped to [-1, len], so only the step can be extreme.
    let span = if step > 0 { stop - start } else { start - stop };
    let count = if span > 0 {
        (span.unsigned_abs() - 1) / step.unsigned_abs() + 1
    } else {
        0
    };

    Ok(AxisRange {
        start,
        step,
        len: count,
    })
}

fn normalize_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };
    if resolved < 0 || resolved >= len as isize {
        return Err(Error::IndexOutOfBounds {
            index: index.unsigned_abs(),
            size: len,
        });
    }
    Ok(resolved as usize)
}

// =============================================================================
// Slicing Implementation
// =============================================================================

impl<T: Scalar> NdBuffer<T> {
    /// Returns a strided view selecting one resolved range per axis.
    pub fn slice(&self, ranges: &[AxisRange]) -> Result<Self> {
        if ranges.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Expected {} slice ranges, got {}",
                self.ndim(),
                ranges.len()
            )));
        }

        let mut offset = self.offset as isize;
        let mut shape = Shape::with_capacity(ranges.len());
        let mut strides = Strides::with_capacity(ranges.len());

        for (axis, range) in ranges.iter().enumerate() {
            if range.len > 0 {
                offset += range.start * self.strides[axis];
            }
            shape.push(range.len);
            strides.push(range.stride(self.strides[axis]));
        }

        Ok(Self {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Basic indexing: integers, ranges and new axes.
    ///
    /// Axes not covered by `specs` are kept whole.
    pub fn index(&self, specs: &[SliceSpec]) -> Result<Self> {
        let consumed = specs
            .iter()
            .filter(|s| !matches!(s, SliceSpec::NewAxis))
            .count();
        if consumed > self.ndim() {
            return Err(Error::invalid_operation(format!(
                "too many indices: buffer has {} axes, {consumed} were indexed",
                self.ndim()
            )));
        }

        let mut offset = self.offset as isize;
        let mut shape = Shape::new();
        let mut strides = Strides::new();
        let mut axis = 0;

        let trailing = core::iter::repeat(&SliceSpec::All).take(self.ndim() - consumed);
        for spec in specs.iter().chain(trailing) {
            match spec {
                SliceSpec::NewAxis => {
                    shape.push(1);
                    strides.push(0);
                }
                SliceSpec::Index(index) => {
                    let index = normalize_index(*index, self.shape[axis])?;
                    offset += index as isize * self.strides[axis];
                    axis += 1;
                }
                SliceSpec::Range { .. } | SliceSpec::All => {
                    if let Some(range) = spec.resolve(self.shape[axis])? {
                        if range.len > 0 {
                            offset += range.start * self.strides[axis];
                        }
                        shape.push(range.len);
                        strides.push(range.stride(self.strides[axis]));
                    }
                    axis += 1;
                }
            }
        }

        Ok(Self {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Returns a view selecting one index along an axis, removing that axis.
    pub fn select(&self, axis: usize, index: usize) -> Result<Self> {
        if axis >= self.ndim() {
            return Err(Error::InvalidDimension {
                index: axis as i64,
                ndim: self.ndim(),
            });
        }
        if index >= self.shape[axis] {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.shape[axis],
            });
        }

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        let offset = self.offset as isize + index as isize * strides[axis];
        shape.remove(axis);
        strides.remove(axis);

        Ok(Self {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Selects the elements where `mask` is true, in row-major order.
    ///
    /// The mask must have one entry per element.
    pub fn masked_select(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.numel() {
            return Err(Error::shape_mismatch(&[self.numel()], &[mask.len()]));
        }

        let data: Vec<T> = self
            .to_vec()
            .into_iter()
            .zip(mask)
            .filter_map(|(v, &keep)| keep.then_some(v))
            .collect();
        Ok(Self::from_vec_1d(data))
    }
}

// =============================================================================
// Tests
// =============================================================================
