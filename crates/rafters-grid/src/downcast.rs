//! Downcasts - Operations That Return Plain Buffers
//!
//! Sorting, reshaping, selection and contraction scramble or merge axes, so
//! no per-axis coordinate survives them. On a grid they run on the samples
//! and hand back an `NdBuffer` with the metadata dropped.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::{Numeric, Scalar};
use rafters_core::error::Result;
use tracing::debug;

use crate::buffer::NdBuffer;
use crate::grid::GridArray;
use crate::ops;
use crate::policy::{MetadataPolicy, Operation};

/// Logs the discard and returns the plain buffer.
fn discard<R>(operation: Operation, shape: &[usize], result: R) -> R {
    debug_assert_eq!(operation.policy(), MetadataPolicy::Discard);
    debug!(%operation, ?shape, "discarding axis metadata");
    result
}

impl<T: Scalar> GridArray<T> {
    /// Reshapes the samples; one dimension may be `-1`.
    pub fn reshape(&self, shape: &[isize]) -> Result<NdBuffer<T>> {
        discard(Operation::Reshape, self.shape(), self.buffer.reshape(shape))
    }

    /// Copies the samples into a 1-D buffer.
    pub fn flatten(&self) -> NdBuffer<T> {
        discard(Operation::Flatten, self.shape(), self.buffer.flatten())
    }

    /// Returns the samples as a 1-D buffer, viewing when contiguous.
    pub fn ravel(&self) -> NdBuffer<T> {
        discard(Operation::Ravel, self.shape(), self.buffer.ravel())
    }

    /// Repeats each sample `repeats` times along `axis` (flattened when `None`).
    pub fn repeat(&self, repeats: usize, axis: Option<isize>) -> Result<NdBuffer<T>> {
        discard(Operation::Repeat, self.shape(), ops::repeat(&self.buffer, repeats, axis))
    }

    /// Gathers samples at `indices` along `axis`.
    pub fn take(&self, indices: &[isize], axis: Option<isize>) -> Result<NdBuffer<T>> {
        discard(Operation::Take, self.shape(), ops::take(&self.buffer, indices, axis))
    }

    /// Keeps the slices along `axis` where `condition` is true.
    pub fn compress(&self, condition: &[bool], axis: Option<isize>) -> Result<NdBuffer<T>> {
        discard(Operation::Compress, self.shape(), ops::compress(&self.buffer, condition, axis))
    }

    /// Extracts a diagonal of the `axis1`/`axis2` plane.
    pub fn diagonal(&self, offset: isize, axis1: isize, axis2: isize) -> Result<NdBuffer<T>> {
        discard(
            Operation::Diagonal,
            self.shape(),
            ops::diagonal(&self.buffer, offset, axis1, axis2),
        )
    }
}

impl<T: Numeric> GridArray<T> {
    /// Sorted copy of the samples along `axis`; NaN sorts last.
    pub fn sort(&self, axis: Option<isize>) -> Result<NdBuffer<T>> {
        discard(Operation::Sort, self.shape(), ops::sort(&self.buffer, axis))
    }

    /// Indices that sort the samples along `axis`.
    pub fn argsort(&self, axis: Option<isize>) -> Result<NdBuffer<i64>> {
        discard(Operation::Argsort, self.shape(), ops::argsort(&self.buffer, axis))
    }

    /// Partitions around the `kth` element along `axis`.
    pub fn partition(&self, kth: usize, axis: Option<isize>) -> Result<NdBuffer<T>> {
        discard(Operation::Partition, self.shape(), ops::partition(&self.buffer, kth, axis))
    }

    /// Indices that partition the samples around the `kth` element.
    pub fn argpartition(&self, kth: usize, axis: Option<isize>) -> Result<NdBuffer<i64>> {
        discard(
            Operation::Argpartition,
            self.shape(),
            ops::argpartition(&self.buffer, kth, axis),
        )
    }

    /// Index of the maximum along `axis`, or into the flattened samples.
    pub fn argmax(&self, axis: Option<isize>) -> Result<NdBuffer<i64>> {
        discard(Operation::Argmax, self.shape(), ops::argmax(&self.buffer, axis))
    }

    /// Index of the minimum along `axis`, or into the flattened samples.
    pub fn argmin(&self, axis: Option<isize>) -> Result<NdBuffer<i64>> {
        discard(Operation::Argmin, self.shape(), ops::argmin(&self.buffer, axis))
    }

    /// Coordinates of the nonzero samples, one row per hit.
    pub fn nonzero(&self) -> NdBuffer<i64> {
        discard(Operation::Nonzero, self.shape(), ops::nonzero(&self.buffer))
    }

    /// Sum along a diagonal of the `axis1`/`axis2` plane.
    pub fn trace(&self, offset: isize, axis1: isize, axis2: isize) -> Result<NdBuffer<T>> {
        discard(
            Operation::Trace,
            self.shape(),
            ops::trace(&self.buffer, offset, axis1, axis2),
        )
    }

    /// Dot product with another buffer.
    pub fn dot(&self, other: &NdBuffer<T>) -> Result<NdBuffer<T>> {
        discard(Operation::Dot, self.shape(), ops::dot(&self.buffer, other))
    }
}

// =============================================================================
// Tests
// =============================================================================
