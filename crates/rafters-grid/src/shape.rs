//! Shape and Strides - Buffer Dimension Management
//!
//! Provides types and functions for managing buffer shapes, strides and
//! axis arguments. Shapes define the extent of each axis, strides define how
//! a view walks the underlying storage.
//!
//! # Key Features
//! - Small-vector shape representation
//! - Stride computation for contiguous and re-strided views
//! - Broadcasting following `NumPy` rules
//! - Axis normalization (negative indices, canonical ascending sets)
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use smallvec::SmallVec;

use rafters_core::error::{Error, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - extent of each axis.
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - storage step for each axis (may be negative).
pub type Strides = SmallVec<[isize; 6]>;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Computes the total number of elements from a shape.
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Counts the elements of an untrusted shape.
///
/// Returns `None` when the nonzero extents multiply past `isize::MAX`, which
/// no buffer can address.
#[must_use]
pub fn checked_numel(shape: &[usize]) -> Option<usize> {
    let mut span = 1isize;
    for &dim in shape {
        span = span.checked_mul(isize::try_from(dim.max(1)).ok()?)?;
    }
    Some(if shape.contains(&0) { 0 } else { span as usize })
}

/// Computes row-major (C-order) strides for a shape.
#[must_use]
pub fn contiguous_strides(shape: &[usize]) -> Strides {
    if shape.is_empty() {
        return Strides::new();
    }

    let mut strides = Strides::with_capacity(shape.len());
    let mut stride = 1isize;

    // Compute strides from right to left
    for &dim in shape.iter().rev() {
        strides.push(stride);
        stride *= dim as isize;
    }

    strides.reverse();
    strides
}

/// Checks if strides represent a contiguous row-major layout.
///
/// Axes of extent 1 never move through storage, so their stride is ignored.
#[must_use]
pub fn is_contiguous(shape: &[usize], strides: &[isize]) -> bool {
    if shape.is_empty() {
        return true;
    }

    let expected = contiguous_strides(shape);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(&dim, (&actual, &wanted))| dim <= 1 || actual == wanted)
}

/// Computes the signed storage offset of multi-dimensional indices.
#[must_use]
pub fn linear_offset(indices: &[usize], strides: &[isize]) -> isize {
    debug_assert_eq!(indices.len(), strides.len());

    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx as isize * stride)
        .sum()
}

/// Converts a row-major linear index to multi-dimensional indices.
#[must_use]
pub fn unravel_index(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];

    for (i, &dim) in shape.iter().enumerate().rev() {
        if dim == 0 {
            continue;
        }
        indices[i] = linear % dim;
        linear /= dim;
    }

    indices
}

// =============================================================================
// Broadcasting
// =============================================================================

/// Computes the broadcast shape of two shapes.
///
/// Broadcasting follows `NumPy` rules:
/// 1. Shapes are aligned from the right
/// 2. Dimensions are compatible if equal or one of them is 1
/// 3. Missing dimensions are treated as 1
pub fn broadcast_shape(shape1: &[usize], shape2: &[usize]) -> Result<Shape> {
    let max_ndim = shape1.len().max(shape2.len());
    let mut result = Shape::with_capacity(max_ndim);

    for i in 0..max_ndim {
        let d1 = if i < shape1.len() {
            shape1[shape1.len() - 1 - i]
        } else {
            1
        };

        let d2 = if i < shape2.len() {
            shape2[shape2.len() - 1 - i]
        } else {
            1
        };

        if d1 == d2 || d2 == 1 {
            result.push(d1);
        } else if d1 == 1 {
            result.push(d2);
        } else {
            return Err(Error::BroadcastError {
                shape1: shape1.to_vec(),
                shape2: shape2.to_vec(),
            });
        }
    }

    result.reverse();
    Ok(result)
}

/// Computes strides that walk `shape` as if it had `target_shape`.
///
/// Broadcast axes get a zero stride.
#[must_use]
pub fn broadcast_strides(shape: &[usize], strides: &[isize], target_shape: &[usize]) -> Strides {
    let mut result = Strides::with_capacity(target_shape.len());
    let shape_offset = target_shape.len() - shape.len();

    for (i, &target_dim) in target_shape.iter().enumerate() {
        if i < shape_offset {
            result.push(0);
        } else {
            let orig_idx = i - shape_offset;
            if shape[orig_idx] == 1 && target_dim != 1 {
                result.push(0);
            } else {
                result.push(strides[orig_idx]);
            }
        }
    }

    result
}

// =============================================================================
// Shape Manipulation
// =============================================================================

/// Resolves a reshape target, validating that total elements match.
///
/// Supports -1 in one dimension to infer the size.
pub fn reshape(old_shape: &[usize], new_shape: &[isize]) -> Result<Shape> {
    let old_numel = numel(old_shape);
    let mut result = Shape::with_capacity(new_shape.len());
    let mut infer_idx = None;
    let mut known_numel = 1usize;

    for (i, &dim) in new_shape.iter().enumerate() {
        if dim == -1 {
            if infer_idx.is_some() {
                return Err(Error::invalid_operation("Can only have one -1 in reshape"));
            }
            infer_idx = Some(i);
            result.push(0);
        } else if dim < 0 {
            return Err(Error::invalid_operation("Invalid dimension in reshape"));
        } else {
            let d = dim as usize;
            known_numel *= d;
            result.push(d);
        }
    }

    if let Some(idx) = infer_idx {
        if known_numel == 0 || old_numel % known_numel != 0 {
            return Err(Error::invalid_operation(
                "Cannot infer dimension: not evenly divisible",
            ));
        }
        result[idx] = old_numel / known_numel;
    } else if known_numel != old_numel {
        return Err(Error::shape_mismatch(old_shape, &result));
    }

    Ok(result)
}

// =============================================================================
// Axis Arguments
// =============================================================================

/// Normalizes an axis index, supporting negative indexing.
pub fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    let ndim_i = ndim as isize;
    let normalized = if axis < 0 { axis + ndim_i } else { axis };

    if normalized < 0 || normalized >= ndim_i {
        return Err(Error::InvalidDimension {
            index: axis as i64,
            ndim,
        });
    }

    Ok(normalized as usize)
}

/// Normalizes an axis selection into a canonical ascending, duplicate-free set.
///
/// `None` selects every axis.
pub fn normalize_axes(axes: Option<&[isize]>, ndim: usize) -> Result<SmallVec<[usize; 6]>> {
    let mut result: SmallVec<[usize; 6]> = match axes {
        None => (0..ndim).collect(),
        Some(axes) => axes
            .iter()
            .map(|&axis| normalize_axis(axis, ndim))
            .collect::<Result<_>>()?,
    };

    result.sort_unstable();
    result.dedup();
    Ok(result)
}

/// Validates that indices are within bounds for a shape.
pub fn validate_indices(indices: &[usize], shape: &[usize]) -> Result<()> {
    if indices.len() != shape.len() {
        return Err(Error::invalid_operation(format!(
            "Expected {} indices, got {}",
            shape.len(),
            indices.len()
        )));
    }

    for (&idx, &dim) in indices.iter().zip(shape.iter()) {
        if idx >= dim {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                size: dim,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
