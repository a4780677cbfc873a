//! Structural Transforms - Slicing and Axis Reordering
//!
//! Strided slices keep every axis, so metadata can follow them exactly: the
//! new origin is the coordinate of the first selected sample and the new
//! spacing is the old spacing times the step. Transposition reverses the
//! per-axis metadata in lockstep with the buffer axes. Both re-stride the
//! underlying storage without copying it.
//!
//! Any other indexing (integers, new axes, partial axis coverage, masks)
//! returns a plain buffer.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::Scalar;
use rafters_core::error::{Error, Result};
use tracing::debug;

use crate::buffer::NdBuffer;
use crate::grid::GridArray;
use crate::policy::{ArrayValue, Operation};
use crate::shape::normalize_axis;
use crate::view::{AxisRange, SliceSpec};

impl<T: Scalar> GridArray<T> {
    // =========================================================================
    // Slicing
    // =========================================================================

    /// Slices every axis with a strided range.
    ///
    /// Requires exactly one range spec (`Range` or `All`) per axis. Offsets
    /// move to the first selected sample and voxel sizes scale with the step.
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<Self> {
        if specs.len() != self.ndim() || !specs.iter().all(SliceSpec::is_range) {
            return Err(Error::invalid_operation(format!(
                "slice requires one range per axis ({} axes), got {specs:?}",
                self.ndim()
            )));
        }

        let ranges = specs
            .iter()
            .zip(self.shape())
            .map(|(spec, &len)| {
                spec.resolve(len)?
                    .ok_or_else(|| Error::invalid_operation("slice requires range specs"))
            })
            .collect::<Result<Vec<AxisRange>>>()?;

        let buffer = self.buffer.slice(&ranges)?;
        let mut attrs = self.attrs();
        attrs.axes = self.axes.sliced(&ranges);
        self.derive(buffer, attrs)
    }

    /// General indexing.
    ///
    /// A full set of strided ranges is a [`Self::slice`] and keeps metadata.
    /// Anything else returns a plain buffer.
    pub fn index(&self, specs: &[SliceSpec]) -> Result<ArrayValue<T>> {
        if specs.len() == self.ndim() && specs.iter().all(SliceSpec::is_range) {
            return self.slice(specs).map(ArrayValue::Grid);
        }

        debug!(operation = %Operation::Index, ?specs, "non-slice index; discarding axis metadata");
        self.buffer.index(specs).map(ArrayValue::Plain)
    }

    /// Selects samples where `mask` is true, as a flat plain buffer.
    pub fn masked_select(&self, mask: &[bool]) -> Result<NdBuffer<T>> {
        debug!(operation = %Operation::MaskedSelect, "discarding axis metadata");
        self.buffer.masked_select(mask)
    }

    // =========================================================================
    // Transposition
    // =========================================================================

    /// Reverses the axis order, carrying axis metadata along.
    #[must_use]
    pub fn transpose(&self) -> Self {
        self.with_axes(self.buffer.reversed_axes(), self.axes.reversed())
    }

    /// Alias of [`Self::transpose`].
    #[must_use]
    pub fn t(&self) -> Self {
        self.transpose()
    }

    /// Reorders axes.
    ///
    /// Only the identity and the full reversal are supported; any other order
    /// fails with `UnsupportedOperation`.
    pub fn permute(&self, axes: &[isize]) -> Result<Self> {
        let ndim = self.ndim();
        if axes.len() != ndim {
            return Err(Error::invalid_operation(format!(
                "permute expects {ndim} axes, got {}",
                axes.len()
            )));
        }
        let order = axes
            .iter()
            .map(|&a| normalize_axis(a, ndim))
            .collect::<Result<Vec<usize>>>()?;

        if order.iter().copied().eq(0..ndim) {
            return Ok(self.clone());
        }
        if order.iter().copied().eq((0..ndim).rev()) {
            return Ok(self.transpose());
        }

        Err(Error::unsupported(format!(
            "{} with axes {order:?}: only identity and full reversal keep axis metadata",
            Operation::Permute
        )))
    }

    /// Swaps two axes; supported when the swap is the identity or a full
    /// reversal.
    pub fn swap_axes(&self, a: isize, b: isize) -> Result<Self> {
        let ndim = self.ndim();
        let a = normalize_axis(a, ndim)?;
        let b = normalize_axis(b, ndim)?;

        let mut order: Vec<isize> = (0..ndim as isize).collect();
        order.swap(a, b);
        self.permute(&order).map_err(|err| match err {
            Error::UnsupportedOperation { .. } => Error::unsupported(format!(
                "{} of axes {a} and {b} in a {ndim}-d grid",
                Operation::SwapAxes
            )),
            other => other,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
