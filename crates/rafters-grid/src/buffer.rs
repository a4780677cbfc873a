//! NdBuffer - Plain N-Dimensional Sample Buffer
//!
//! The `NdBuffer` struct is the metadata-free array underlying every grid. It
//! represents an N-dimensional array of samples with support for broadcasting
//! and cheap views: slicing and axis reordering re-stride the view over the
//! same reference-counted storage instead of copying it.
//!
//! Whenever an operation cannot keep axis metadata consistent, the grid layer
//! hands back an `NdBuffer`.
//!
//! # Key Features
//! - Generic over element type (f32, f64, i8..i64, u8..u64)
//! - Views with shared storage and signed strides
//! - Broadcasting elementwise combination
//! - Lane iteration used by reductions and downcast kernels
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use core::fmt;

use num_traits::NumCast;
use rafters_core::dtype::{Numeric, Scalar};
use rafters_core::error::{Error, Result};
use rafters_core::storage::Storage;

use crate::shape::{
    broadcast_shape, broadcast_strides, contiguous_strides, is_contiguous, linear_offset,
    normalize_axis, numel, reshape, unravel_index, validate_indices, Shape, Strides,
};

// =============================================================================
// NdBuffer Struct
// =============================================================================

/// An N-dimensional array of samples without axis metadata.
#[derive(Clone)]
pub struct NdBuffer<T: Scalar> {
    /// Underlying data storage (reference-counted).
    pub(crate) storage: Storage<T>,
    /// Shape of the buffer.
    pub(crate) shape: Shape,
    /// Strides for each axis, in elements.
    pub(crate) strides: Strides,
    /// Storage position of the element at index `[0, 0, ...]`.
    pub(crate) offset: usize,
}

impl<T: Scalar> NdBuffer<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a new buffer from storage with the given shape.
    ///
    /// # Returns
    /// New buffer, or error if shape doesn't match storage size.
    pub fn from_storage(storage: Storage<T>, shape: &[usize]) -> Result<Self> {
        let total = numel(shape);
        if total != storage.len() {
            return Err(Error::shape_mismatch(shape, &[storage.len()]));
        }

        let shape = Shape::from_slice(shape);
        let strides = contiguous_strides(&shape);

        Ok(Self {
            storage,
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a new buffer from a vector with the given shape.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_storage(Storage::from_vec(data), shape)
    }

    /// Creates a new buffer from a slice with the given shape.
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_storage(Storage::from_slice(data), shape)
    }

    /// Creates a one-dimensional buffer owning `data`.
    #[must_use]
    pub fn from_vec_1d(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            storage: Storage::from_vec(data),
            shape: Shape::from_slice(&[len]),
            strides: Strides::from_slice(&[1]),
            offset: 0,
        }
    }

    /// Creates a rank-0 buffer.
    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self {
            storage: Storage::from_vec(vec![value]),
            shape: Shape::new(),
            strides: Strides::new(),
            offset: 0,
        }
    }

    /// Creates a buffer filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        crate::creation::zeros(shape)
    }

    /// Creates a buffer filled with ones.
    #[must_use]
    pub fn ones(shape: &[usize]) -> Self
    where
        T: Numeric,
    {
        crate::creation::ones(shape)
    }

    /// Creates a buffer filled with `value`.
    #[must_use]
    pub fn full(shape: &[usize], value: T) -> Self {
        crate::creation::full(shape, value)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the shape of the buffer.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the buffer.
    #[must_use]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the number of axes.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns true if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Returns true if this is a rank-0 buffer.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns true if the buffer walks its storage in row-major order.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides)
    }

    /// Returns the extent of an axis (supports negative indexing).
    pub fn size(&self, axis: isize) -> Result<usize> {
        let axis = normalize_axis(axis, self.ndim())?;
        Ok(self.shape[axis])
    }

    /// Returns true if both buffers view the same allocation.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        self.storage.shares_with(&other.storage)
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    fn storage_index(&self, indices: &[usize]) -> usize {
        (self.offset as isize + linear_offset(indices, &self.strides)) as usize
    }

    /// Returns the element at the given indices.
    pub fn get(&self, indices: &[usize]) -> Result<T> {
        validate_indices(indices, &self.shape)?;
        Ok(self.storage.as_slice()[self.storage_index(indices)])
    }

    /// Returns the value of a single-element buffer.
    pub fn item(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::invalid_operation(format!(
                "item() requires a single element, buffer has {}",
                self.numel()
            )));
        }
        Ok(self.storage.as_slice()[self.offset])
    }

    /// Returns the data as a row-major vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let storage = self.storage.as_slice();

        if self.is_contiguous() {
            return storage[self.offset..self.offset + self.numel()].to_vec();
        }

        let total = self.numel();
        let mut result = Vec::with_capacity(total);
        for i in 0..total {
            let indices = unravel_index(i, &self.shape);
            result.push(storage[self.storage_index(&indices)]);
        }
        result
    }

    /// Returns a contiguous buffer with its own storage if this one is a
    /// re-strided view, otherwise a cheap clone.
    #[must_use]
    pub fn contiguous(&self) -> Self {
        if self.is_contiguous() && self.offset == 0 && self.storage.len() == self.numel() {
            return self.clone();
        }
        self.deep_copy()
    }

    /// Copies the visible elements into fresh storage.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            storage: Storage::from_vec(self.to_vec()),
            strides: contiguous_strides(&self.shape),
            shape: self.shape.clone(),
            offset: 0,
        }
    }

    // =========================================================================
    // Shape Operations
    // =========================================================================

    /// Returns a buffer with the specified shape.
    ///
    /// Supports -1 in one dimension to infer the size.
    pub fn reshape(&self, new_shape: &[isize]) -> Result<Self> {
        let shape = reshape(&self.shape, new_shape)?;
        let source = self.contiguous_view();

        Ok(Self {
            storage: source.storage,
            strides: contiguous_strides(&shape),
            shape,
            offset: source.offset,
        })
    }

    /// Returns a one-dimensional copy of the buffer.
    #[must_use]
    pub fn flatten(&self) -> Self {
        Self::from_vec_1d(self.to_vec())
    }

    /// Returns a one-dimensional view of the buffer, copying only when the
    /// layout is not row-major.
    #[must_use]
    pub fn ravel(&self) -> Self {
        let source = self.contiguous_view();
        let len = source.numel();
        Self {
            storage: source.storage,
            shape: Shape::from_slice(&[len]),
            strides: Strides::from_slice(&[1]),
            offset: source.offset,
        }
    }

    fn contiguous_view(&self) -> Self {
        if self.is_contiguous() {
            self.clone()
        } else {
            self.deep_copy()
        }
    }

    /// Reverses the order of all axes without copying.
    #[must_use]
    pub fn reversed_axes(&self) -> Self {
        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.reverse();
        strides.reverse();

        Self {
            storage: self.storage.clone(),
            shape,
            strides,
            offset: self.offset,
        }
    }

    /// Reorders axes without copying.
    ///
    /// # Arguments
    /// * `axes` - New order of axes, a permutation of `0..ndim`
    pub fn permute(&self, axes: &[usize]) -> Result<Self> {
        if axes.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "Permute expects {} axes, got {}",
                self.ndim(),
                axes.len()
            )));
        }

        let mut seen = vec![false; self.ndim()];
        for &axis in axes {
            if axis >= self.ndim() {
                return Err(Error::InvalidDimension {
                    index: axis as i64,
                    ndim: self.ndim(),
                });
            }
            if seen[axis] {
                return Err(Error::invalid_operation("Duplicate axis in permute"));
            }
            seen[axis] = true;
        }

        Ok(Self {
            storage: self.storage.clone(),
            shape: axes.iter().map(|&a| self.shape[a]).collect(),
            strides: axes.iter().map(|&a| self.strides[a]).collect(),
            offset: self.offset,
        })
    }

    /// Returns a view with the given shape where broadcast axes repeat.
    pub fn broadcast_to(&self, target: &[usize]) -> Result<Self> {
        let shape = broadcast_shape(&self.shape, target)?;
        if shape.as_slice() != target {
            return Err(Error::BroadcastError {
                shape1: self.shape.to_vec(),
                shape2: target.to_vec(),
            });
        }

        Ok(Self {
            storage: self.storage.clone(),
            strides: broadcast_strides(&self.shape, &self.strides, target),
            shape,
            offset: self.offset,
        })
    }

    // =========================================================================
    // Lanes
    // =========================================================================

    /// Moves `axis` to the back, keeping the other axes in order.
    pub(crate) fn axis_to_back(&self, axis: usize) -> Result<Self> {
        let order: Vec<usize> = (0..self.ndim())
            .filter(|&a| a != axis)
            .chain(core::iter::once(axis))
            .collect();
        self.permute(&order)
    }

    /// Inverse of [`Self::axis_to_back`].
    pub(crate) fn axis_from_back(&self, axis: usize) -> Result<Self> {
        let last = self.ndim() - 1;
        let order: Vec<usize> = (0..self.ndim())
            .map(|a| match a.cmp(&axis) {
                core::cmp::Ordering::Less => a,
                core::cmp::Ordering::Equal => last,
                core::cmp::Ordering::Greater => a - 1,
            })
            .collect();
        self.permute(&order)
    }

    /// Applies `f` to every lane along `axis`.
    ///
    /// Each call receives the lane's values and must push exactly `out_len`
    /// outputs; the result has `axis` resized to `out_len`.
    pub(crate) fn map_lanes<U, F>(&self, axis: usize, out_len: usize, mut f: F) -> Result<NdBuffer<U>>
    where
        U: Scalar,
        F: FnMut(&[T], &mut Vec<U>) -> Result<()>,
    {
        let moved = self.axis_to_back(axis)?;
        let lane_len = self.shape[axis];
        let lanes = if lane_len == 0 {
            numel(&moved.shape[..moved.ndim() - 1])
        } else {
            moved.numel() / lane_len
        };
        let data = moved.to_vec();

        let mut out = Vec::with_capacity(lanes * out_len);
        for lane in 0..lanes {
            let before = out.len();
            f(&data[lane * lane_len..(lane + 1) * lane_len], &mut out)?;
            debug_assert_eq!(out.len() - before, out_len);
        }

        let mut out_shape = moved.shape.clone();
        let last = out_shape.len() - 1;
        out_shape[last] = out_len;

        NdBuffer::from_vec(out, &out_shape)?
            .axis_from_back(axis)
            .map(|b| b.contiguous())
    }

    // =========================================================================
    // Elementwise
    // =========================================================================

    /// Applies a function to every element, producing a new buffer.
    #[must_use]
    pub fn map<U: Scalar, F: Fn(T) -> U>(&self, f: F) -> NdBuffer<U> {
        let data: Vec<U> = self.to_vec().into_iter().map(f).collect();
        NdBuffer {
            storage: Storage::from_vec(data),
            strides: contiguous_strides(&self.shape),
            shape: self.shape.clone(),
            offset: 0,
        }
    }

    /// Combines two buffers elementwise after broadcasting them together.
    pub fn zip_with<U, R, F>(&self, other: &NdBuffer<U>, f: F) -> Result<NdBuffer<R>>
    where
        U: Scalar,
        R: Scalar,
        F: Fn(T, U) -> R,
    {
        let shape = broadcast_shape(&self.shape, &other.shape)?;
        let lhs = self.broadcast_to(&shape)?.to_vec();
        let rhs = other.broadcast_to(&shape)?.to_vec();

        let data: Vec<R> = lhs.into_iter().zip(rhs).map(|(a, b)| f(a, b)).collect();
        NdBuffer::from_vec(data, &shape)
    }

    /// Casts every element to another numeric type.
    pub fn cast<U: Numeric>(&self) -> Result<NdBuffer<U>>
    where
        T: Numeric,
    {
        let data = self
            .to_vec()
            .into_iter()
            .map(|v| {
                <U as NumCast>::from(v).ok_or_else(|| {
                    Error::invalid_operation(format!(
                        "cannot represent {v:?} as {}",
                        U::DTYPE
                    ))
                })
            })
            .collect::<Result<Vec<U>>>()?;
        NdBuffer::from_vec(data, &self.shape)
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

/// Integer addition, subtraction and multiplication wrap on overflow.
impl<T: Numeric> NdBuffer<T> {
    /// Elementwise addition with broadcasting.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a.acc_add(b))
    }

    /// Elementwise subtraction with broadcasting.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a.acc_sub(b))
    }

    /// Elementwise multiplication with broadcasting.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a.acc_mul(b))
    }

    /// Elementwise division with broadcasting.
    pub fn div(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Adds a scalar to every element.
    #[must_use]
    pub fn add_scalar(&self, scalar: T) -> Self {
        self.map(|v| v.acc_add(scalar))
    }

    /// Subtracts a scalar from every element.
    #[must_use]
    pub fn sub_scalar(&self, scalar: T) -> Self {
        self.map(|v| v.acc_sub(scalar))
    }

    /// Multiplies every element by a scalar.
    #[must_use]
    pub fn mul_scalar(&self, scalar: T) -> Self {
        self.map(|v| v.acc_mul(scalar))
    }

    /// Divides every element by a scalar.
    #[must_use]
    pub fn div_scalar(&self, scalar: T) -> Self {
        self.map(|v| v / scalar)
    }
}

// =============================================================================
// Equality
// =============================================================================

impl<T: Scalar + PartialEq> PartialEq for NdBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.to_vec() == other.to_vec()
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

/// Writes `data` (row-major over `shape`) as nested brackets.
pub(crate) fn write_nested<T: fmt::Debug>(
    f: &mut fmt::Formatter<'_>,
    data: &[T],
    shape: &[usize],
) -> fmt::Result {
    match shape.split_first() {
        None => match data.first() {
            Some(v) => write!(f, "{v:?}"),
            None => write!(f, "[]"),
        },
        Some((&len, rest)) => {
            let chunk = numel(rest);
            write!(f, "[")?;
            for i in 0..len {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_nested(f, &data[i * chunk..(i + 1) * chunk], rest)?;
            }
            write!(f, "]")
        }
    }
}

impl<T: Scalar> fmt::Debug for NdBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NdBuffer(shape={:?}, dtype={}", self.shape(), T::DTYPE)?;
        if self.numel() <= 10 {
            write!(f, ", data={:?}", self.to_vec())?;
        }
        write!(f, ")")
    }
}

impl<T: Scalar> fmt::Display for NdBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nested(f, &self.to_vec(), &self.shape)
    }
}

// =============================================================================
// Tests
// =============================================================================
