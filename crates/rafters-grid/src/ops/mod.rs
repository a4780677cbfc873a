//! Buffer Operations - Kernels Returning Plain Buffers
//!
//! Sorting, selection, index queries and contractions. None of these can keep
//! per-axis coordinates meaningful, so grids expose them as downcasts: the
//! result is always a plain `NdBuffer`, and index-returning operations yield
//! `NdBuffer<i64>`.
//!
//! Axis arguments accept negative indices. Where `NumPy` takes `axis=None`,
//! these take `Option<isize>` and `None` works on the flattened buffer.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use core::cmp::Ordering;

use rafters_core::dtype::{Numeric, Scalar};
use rafters_core::error::{Error, Result};

use crate::buffer::NdBuffer;
use crate::reduce;
use crate::shape::{normalize_axis, unravel_index};

// =============================================================================
// Ordering
// =============================================================================

/// Total order used by sorting: NaN sorts last.
fn nan_last<T: Numeric>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| match (a.is_unordered(), b.is_unordered()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        _ => Ordering::Less,
    })
}

fn sort_indices<T: Numeric>(lane: &[T]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..lane.len()).collect();
    indices.sort_by(|&a, &b| nan_last(&lane[a], &lane[b]));
    indices
}

fn check_kth(kth: usize, len: usize) -> Result<()> {
    if kth >= len {
        return Err(Error::IndexOutOfBounds {
            index: kth,
            size: len,
        });
    }
    Ok(())
}

fn flat_or_axis<T: Scalar>(x: &NdBuffer<T>, axis: Option<isize>) -> Result<(NdBuffer<T>, usize)> {
    match axis {
        None => Ok((x.flatten(), 0)),
        Some(axis) => Ok((x.clone(), normalize_axis(axis, x.ndim())?)),
    }
}

fn to_i64(index: usize) -> i64 {
    index as i64
}

// =============================================================================
// Sorting
// =============================================================================

/// Returns a sorted copy of the buffer along an axis.
pub fn sort<T: Numeric>(x: &NdBuffer<T>, axis: Option<isize>) -> Result<NdBuffer<T>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    x.map_lanes(axis, len, |lane, out| {
        let mut values = lane.to_vec();
        values.sort_by(nan_last);
        out.extend(values);
        Ok(())
    })
}

/// Returns the indices that would sort the buffer along an axis.
///
/// The sort is stable: equal elements keep their relative order.
pub fn argsort<T: Numeric>(x: &NdBuffer<T>, axis: Option<isize>) -> Result<NdBuffer<i64>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    x.map_lanes(axis, len, |lane, out| {
        out.extend(sort_indices(lane).into_iter().map(to_i64));
        Ok(())
    })
}

/// Partially sorts along an axis so that position `kth` holds the value it
/// would hold in a full sort, with no larger value before it and no smaller
/// value after it.
pub fn partition<T: Numeric>(x: &NdBuffer<T>, kth: usize, axis: Option<isize>) -> Result<NdBuffer<T>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    check_kth(kth, len)?;
    x.map_lanes(axis, len, |lane, out| {
        let mut values = lane.to_vec();
        values.select_nth_unstable_by(kth, nan_last);
        out.extend(values);
        Ok(())
    })
}

/// Returns the indices that would partition the buffer along an axis.
pub fn argpartition<T: Numeric>(
    x: &NdBuffer<T>,
    kth: usize,
    axis: Option<isize>,
) -> Result<NdBuffer<i64>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    check_kth(kth, len)?;
    x.map_lanes(axis, len, |lane, out| {
        let mut indices: Vec<usize> = (0..lane.len()).collect();
        indices.select_nth_unstable_by(kth, |&a, &b| nan_last(&lane[a], &lane[b]));
        out.extend(indices.into_iter().map(to_i64));
        Ok(())
    })
}

// =============================================================================
// Index Queries
// =============================================================================

fn arg_extreme<T: Numeric>(
    x: &NdBuffer<T>,
    axis: Option<isize>,
    pick: fn(&[T]) -> Option<usize>,
) -> Result<NdBuffer<i64>> {
    match axis {
        None => {
            let index = pick(&x.to_vec()).ok_or(Error::EmptyBuffer)?;
            Ok(NdBuffer::scalar(to_i64(index)))
        }
        Some(axis) => {
            let axis = normalize_axis(axis, x.ndim())?;
            let picked = x.map_lanes(axis, 1, |lane, out| {
                out.push(to_i64(pick(lane).ok_or(Error::EmptyBuffer)?));
                Ok(())
            })?;
            Ok(picked.select(axis, 0)?.contiguous())
        }
    }
}

/// Returns the index of the maximum value along an axis.
///
/// With `None` the index is into the flattened buffer.
pub fn argmax<T: Numeric>(x: &NdBuffer<T>, axis: Option<isize>) -> Result<NdBuffer<i64>> {
    arg_extreme(x, axis, reduce::argmax)
}

/// Returns the index of the minimum value along an axis.
///
/// With `None` the index is into the flattened buffer.
pub fn argmin<T: Numeric>(x: &NdBuffer<T>, axis: Option<isize>) -> Result<NdBuffer<i64>> {
    arg_extreme(x, axis, reduce::argmin)
}

/// Returns the indices of non-zero elements.
///
/// # Returns
/// Buffer of shape `(num_nonzero, max(ndim, 1))`, one index tuple per row.
#[must_use]
pub fn nonzero<T: Numeric>(x: &NdBuffer<T>) -> NdBuffer<i64> {
    let width = x.ndim().max(1);
    let mut flat = Vec::new();
    let mut count = 0;

    for (linear, val) in x.to_vec().into_iter().enumerate() {
        if val != T::zero() {
            if x.ndim() == 0 {
                flat.push(0);
            } else {
                flat.extend(unravel_index(linear, x.shape()).into_iter().map(to_i64));
            }
            count += 1;
        }
    }

    let shape = [count, width];
    NdBuffer::from_vec(flat, &shape).unwrap_or_else(|_| NdBuffer::zeros(&[0, width]))
}

// =============================================================================
// Selection
// =============================================================================

fn resolve_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };
    if resolved < 0 || resolved as usize >= len {
        return Err(Error::IndexOutOfBounds {
            index: index.unsigned_abs(),
            size: len,
        });
    }
    Ok(resolved as usize)
}

/// Takes elements at `indices` along an axis.
///
/// With `None` the indices address the flattened buffer.
pub fn take<T: Scalar>(x: &NdBuffer<T>, indices: &[isize], axis: Option<isize>) -> Result<NdBuffer<T>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    let resolved = indices
        .iter()
        .map(|&i| resolve_index(i, len))
        .collect::<Result<Vec<_>>>()?;

    x.map_lanes(axis, resolved.len(), |lane, out| {
        out.extend(resolved.iter().map(|&i| lane[i]));
        Ok(())
    })
}

/// Keeps the slices along an axis where `condition` is true.
///
/// A condition shorter than the axis treats the missing entries as false.
pub fn compress<T: Scalar>(x: &NdBuffer<T>, condition: &[bool], axis: Option<isize>) -> Result<NdBuffer<T>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    if condition.len() > len {
        return Err(Error::IndexOutOfBounds {
            index: condition.len() - 1,
            size: len,
        });
    }

    let selected: Vec<isize> = condition
        .iter()
        .enumerate()
        .filter_map(|(i, &keep)| keep.then_some(i as isize))
        .collect();
    take(&x, &selected, Some(axis as isize))
}

/// Repeats every element `repeats` times along an axis.
///
/// With `None` the flattened buffer is repeated element by element.
pub fn repeat<T: Scalar>(x: &NdBuffer<T>, repeats: usize, axis: Option<isize>) -> Result<NdBuffer<T>> {
    let (x, axis) = flat_or_axis(x, axis)?;
    let len = x.shape()[axis];
    x.map_lanes(axis, len * repeats, |lane, out| {
        for &v in lane {
            out.extend(core::iter::repeat(v).take(repeats));
        }
        Ok(())
    })
}

/// Extracts a diagonal from the plane spanned by `axis1` and `axis2`.
///
/// The two axes are removed and the diagonal becomes the last axis. A
/// positive `offset` selects a diagonal above the main one.
pub fn diagonal<T: Scalar>(x: &NdBuffer<T>, offset: isize, axis1: isize, axis2: isize) -> Result<NdBuffer<T>> {
    let a1 = normalize_axis(axis1, x.ndim())?;
    let a2 = normalize_axis(axis2, x.ndim())?;
    if a1 == a2 {
        return Err(Error::invalid_operation("diagonal requires two distinct axes"));
    }

    let order: Vec<usize> = (0..x.ndim())
        .filter(|&a| a != a1 && a != a2)
        .chain([a1, a2])
        .collect();
    let moved = x.permute(&order)?;
    let rank = moved.ndim();
    let (rows, cols) = (moved.shape()[rank - 2], moved.shape()[rank - 1]);

    let (row0, col0) = if offset >= 0 {
        (0, offset.unsigned_abs())
    } else {
        (offset.unsigned_abs(), 0)
    };
    let diag_len = rows.saturating_sub(row0).min(cols.saturating_sub(col0));

    let outer_shape = &moved.shape()[..rank - 2];
    let outer: usize = outer_shape.iter().product();
    let data = moved.to_vec();
    let plane = rows * cols;

    let mut out = Vec::with_capacity(outer * diag_len);
    for o in 0..outer {
        for i in 0..diag_len {
            out.push(data[o * plane + (row0 + i) * cols + col0 + i]);
        }
    }

    let mut shape = outer_shape.to_vec();
    shape.push(diag_len);
    NdBuffer::from_vec(out, &shape)
}

/// Sums a diagonal (see [`diagonal`]).
pub fn trace<T: Numeric>(x: &NdBuffer<T>, offset: isize, axis1: isize, axis2: isize) -> Result<NdBuffer<T>> {
    let diag = diagonal(x, offset, axis1, axis2)?;
    let last = diag.ndim() - 1;
    diag.reduce_axes(reduce::Reducer::Sum, &[last], false)
}

// =============================================================================
// Contraction
// =============================================================================

/// Dot product following `NumPy` rules.
///
/// - rank 0 operands multiply elementwise
/// - 1-D with 1-D is the inner product (rank-0 result)
/// - otherwise sums over the last axis of `a` and the second-to-last axis of
///   `b` (the only axis when `b` is 1-D)
pub fn dot<T: Numeric>(a: &NdBuffer<T>, b: &NdBuffer<T>) -> Result<NdBuffer<T>> {
    if a.is_scalar() || b.is_scalar() {
        return a.mul(b);
    }

    let k = a.shape()[a.ndim() - 1];
    let contract_axis = if b.ndim() == 1 { 0 } else { b.ndim() - 2 };
    if b.shape()[contract_axis] != k {
        return Err(Error::shape_mismatch(a.shape(), b.shape()));
    }

    let rows = a.numel() / k.max(1);
    let lhs = a.to_vec();
    let rhs_view = if b.ndim() == 1 {
        b.clone()
    } else {
        let order: Vec<usize> = core::iter::once(contract_axis)
            .chain((0..b.ndim()).filter(|&ax| ax != contract_axis))
            .collect();
        b.permute(&order)?
    };
    let cols = if k == 0 { rhs_view.numel() } else { rhs_view.numel() / k };
    let rhs = rhs_view.to_vec();

    let mut out = vec![T::zero(); rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = T::zero();
            for i in 0..k {
                acc = acc.acc_add(lhs[r * k + i].acc_mul(rhs[i * cols + c]));
            }
            out[r * cols + c] = acc;
        }
    }

    let mut shape = a.shape()[..a.ndim() - 1].to_vec();
    if b.ndim() > 1 {
        shape.extend((0..b.ndim()).filter(|&ax| ax != contract_axis).map(|ax| b.shape()[ax]));
    }
    NdBuffer::from_vec(out, &shape)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(data: Vec<f64>, shape: &[usize]) -> NdBuffer<f64> {
        NdBuffer::from_vec(data, shape).unwrap()
    }

    #[test]
    fn test_sort_and_argsort() {
        let x = buf(vec![3.0, 1.0, 2.0, 9.0, 7.0, 8.0], &[2, 3]);
        assert_eq!(sort(&x, Some(-1)).unwrap().to_vec(), vec![1.0, 2.0, 3.0, 7.0, 8.0, 9.0]);
        assert_eq!(sort(&x, Some(0)).unwrap().to_vec(), vec![3.0, 1.0, 2.0, 9.0, 7.0, 8.0]);
        assert_eq!(argsort(&x, Some(1)).unwrap().to_vec(), vec![1, 2, 0, 1, 2, 0]);

        let flat = sort(&x, None).unwrap();
        assert_eq!(flat.shape(), &[6]);
    }

    #[test]
    fn test_sort_puts_nan_last() {
        let x = buf(vec![f64::NAN, 1.0, 0.5], &[3]);
        let sorted = sort(&x, Some(0)).unwrap().to_vec();
        assert_eq!(&sorted[..2], &[0.5, 1.0]);
        assert!(sorted[2].is_nan());
    }

    #[test]
    fn test_partition() {
        let x = buf(vec![5.0, 1.0, 4.0, 2.0, 3.0], &[5]);
        let p = partition(&x, 2, Some(0)).unwrap().to_vec();
        assert_eq!(p[2], 3.0);
        assert!(p[..2].iter().all(|&v| v <= 3.0));
        assert!(p[3..].iter().all(|&v| v >= 3.0));

        let idx = argpartition(&x, 0, Some(0)).unwrap().to_vec();
        assert_eq!(idx[0], 1);
        assert!(partition(&x, 5, Some(0)).is_err());
    }

    #[test]
    fn test_argmax_argmin() {
        let x = buf(vec![1.0, 9.0, 3.0, 4.0, 0.0, 6.0], &[2, 3]);
        assert_eq!(argmax(&x, None).unwrap().item().unwrap(), 1);
        assert_eq!(argmin(&x, None).unwrap().item().unwrap(), 4);

        let per_row = argmax(&x, Some(1)).unwrap();
        assert_eq!(per_row.shape(), &[2]);
        assert_eq!(per_row.to_vec(), vec![1, 2]);

        let empty = NdBuffer::<f64>::zeros(&[0]);
        assert_eq!(argmax(&empty, None).unwrap_err(), Error::EmptyBuffer);
    }

    #[test]
    fn test_nonzero() {
        let x = NdBuffer::<i32>::from_vec(vec![0, 1, 0, 2], &[2, 2]).unwrap();
        let nz = nonzero(&x);
        assert_eq!(nz.shape(), &[2, 2]);
        assert_eq!(nz.to_vec(), vec![0, 1, 1, 1]);
        assert_eq!(nonzero(&NdBuffer::<i32>::zeros(&[3])).shape(), &[0, 1]);
    }

    #[test]
    fn test_take_and_compress() {
        let x = buf(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        assert_eq!(take(&x, &[0, -1], None).unwrap().to_vec(), vec![1.0, 6.0]);

        let cols = take(&x, &[2, 0], Some(1)).unwrap();
        assert_eq!(cols.shape(), &[2, 2]);
        assert_eq!(cols.to_vec(), vec![3.0, 1.0, 6.0, 4.0]);
        assert!(take(&x, &[3], Some(1)).is_err());

        let kept = compress(&x, &[false, true], Some(0)).unwrap();
        assert_eq!(kept.shape(), &[1, 3]);
        assert_eq!(kept.to_vec(), vec![4.0, 5.0, 6.0]);
        assert!(compress(&x, &[true, true, true], Some(0)).is_err());
    }

    #[test]
    fn test_repeat() {
        let x = buf(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert_eq!(repeat(&x, 2, None).unwrap().to_vec(), vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);

        let rows = repeat(&x, 2, Some(0)).unwrap();
        assert_eq!(rows.shape(), &[4, 2]);
        assert_eq!(rows.to_vec(), vec![1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0]);
    }

    #[test]
    fn test_diagonal_and_trace() {
        let x = buf((0..9).map(f64::from).collect(), &[3, 3]);
        assert_eq!(diagonal(&x, 0, 0, 1).unwrap().to_vec(), vec![0.0, 4.0, 8.0]);
        assert_eq!(diagonal(&x, 1, 0, 1).unwrap().to_vec(), vec![1.0, 5.0]);
        assert_eq!(diagonal(&x, -2, 0, 1).unwrap().to_vec(), vec![6.0]);

        let tr = trace(&x, 0, 0, 1).unwrap();
        assert!(tr.is_scalar());
        assert_eq!(tr.item().unwrap(), 12.0);
        assert!(diagonal(&x, 0, 1, 1).is_err());
    }

    #[test]
    fn test_dot() {
        let v = buf(vec![1.0, 2.0, 3.0], &[3]);
        assert_eq!(dot(&v, &v).unwrap().item().unwrap(), 14.0);

        let a = buf(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = buf(vec![5.0, 6.0, 7.0, 8.0], &[2, 2]);
        let c = dot(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 2]);
        assert_eq!(c.to_vec(), vec![19.0, 22.0, 43.0, 50.0]);

        let m = buf(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        assert_eq!(dot(&m, &v).unwrap().to_vec(), vec![14.0, 32.0]);
        assert!(dot(&a, &v).is_err());
    }
}
