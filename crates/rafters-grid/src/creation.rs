//! Buffer Creation Functions
//!
//! Factory functions for plain buffers: constant fills, ranges and evenly
//! spaced samples. Grids are built by attaching metadata to one of these.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::{Float, Numeric, Scalar};
use rafters_core::storage::Storage;

use crate::buffer::NdBuffer;
use crate::shape::{contiguous_strides, numel, Shape};

// =============================================================================
// Constant Fills
// =============================================================================

/// Creates a buffer filled with zeros.
///
/// # Example
/// ```rust
/// use rafters_grid::creation::zeros;
/// let b = zeros::<f32>(&[2, 3]);
/// assert_eq!(b.numel(), 6);
/// ```
#[must_use]
pub fn zeros<T: Scalar>(shape: &[usize]) -> NdBuffer<T> {
    full(shape, T::zeroed())
}

/// Creates a buffer filled with ones.
#[must_use]
pub fn ones<T: Numeric>(shape: &[usize]) -> NdBuffer<T> {
    full(shape, T::one())
}

/// Creates a buffer filled with a specific value.
#[must_use]
pub fn full<T: Scalar>(shape: &[usize], value: T) -> NdBuffer<T> {
    let data = vec![value; numel(shape)];
    NdBuffer {
        storage: Storage::from_vec(data),
        shape: Shape::from_slice(shape),
        strides: contiguous_strides(shape),
        offset: 0,
    }
}

/// Creates a buffer shaped like `other`, filled with zeros.
#[must_use]
pub fn zeros_like<T: Scalar>(other: &NdBuffer<T>) -> NdBuffer<T> {
    zeros(other.shape())
}

// =============================================================================
// Ranges
// =============================================================================

/// Creates a 1-D buffer with values in `[start, end)` spaced by `step`.
///
/// A zero step yields an empty buffer.
#[must_use]
pub fn arange<T: Numeric>(start: T, end: T, step: T) -> NdBuffer<T> {
    let mut data = Vec::new();
    let mut current = start;

    if step > T::zero() {
        while current < end {
            data.push(current);
            current = current + step;
        }
    } else if step < T::zero() {
        while current > end {
            data.push(current);
            current = current + step;
        }
    }

    NdBuffer::from_vec_1d(data)
}

/// Creates a 1-D buffer of `num` evenly spaced values over `[start, end]`.
#[must_use]
pub fn linspace<T: Float>(start: T, end: T, num: usize) -> NdBuffer<T> {
    match num {
        0 => NdBuffer::from_vec_1d(Vec::new()),
        1 => NdBuffer::from_vec_1d(vec![start]),
        _ => {
            let denom = <T as num_traits::NumCast>::from(num - 1).unwrap_or_else(T::one);
            let step = (end - start) / denom;
            let data = (0..num)
                .map(|i| {
                    let i = <T as num_traits::NumCast>::from(i).unwrap_or_else(T::zero);
                    start + step * i
                })
                .collect();
            NdBuffer::from_vec_1d(data)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_ones_full() {
        assert!(zeros::<f64>(&[2, 2]).to_vec().iter().all(|&v| v == 0.0));
        assert!(ones::<i16>(&[3]).to_vec().iter().all(|&v| v == 1));
        assert_eq!(full(&[2], 7_u8).to_vec(), vec![7, 7]);
        assert_eq!(full::<f32>(&[], 2.5).item().unwrap(), 2.5);
        assert_eq!(zeros_like(&ones::<f32>(&[4, 1])).shape(), &[4, 1]);
    }

    #[test]
    fn test_arange() {
        assert_eq!(arange(0_i32, 5, 1).to_vec(), vec![0, 1, 2, 3, 4]);
        assert_eq!(arange(5_i32, 0, -2).to_vec(), vec![5, 3, 1]);
        assert!(arange(0_i32, 5, 0).is_empty());
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0_f64, 1.0, 5).to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0_f32, 9.0, 1).to_vec(), vec![3.0]);
        assert!(linspace(0.0_f32, 1.0, 0).is_empty());
    }
}
