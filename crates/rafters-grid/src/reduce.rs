//! Reductions - Lane Kernels and Axis Reduction
//!
//! Defines the reducers understood by grids and plain buffers, the lane
//! kernels that implement them, and the buffer-level machinery that applies a
//! kernel over a set of axes (collapsing them) or along one axis (scanning it).
//!
//! Reducers come in two families:
//! - `KeepDims`: sum, mean, prod, max, min, var. Any axis set, optional keepdims.
//! - `AlongAxis`: cumsum, cumprod, ptp. One axis or none (flattened).
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use num_traits::{NumCast, ToPrimitive};
use rafters_core::dtype::Numeric;
use rafters_core::error::{Error, Result};

use crate::buffer::NdBuffer;
use crate::shape::{numel, Shape};

// =============================================================================
// Reducer
// =============================================================================

/// A named reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reducer {
    /// Sum of elements.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Product of elements.
    Prod,
    /// Maximum element.
    Max,
    /// Minimum element.
    Min,
    /// Population variance.
    Var,
    /// Running sum.
    CumSum,
    /// Running product.
    CumProd,
    /// Peak to peak (max - min).
    Ptp,
}

/// How a reducer treats its axis argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReducerFamily {
    /// Any set of axes, result may keep reduced axes as extent 1.
    KeepDims,
    /// At most one axis; with none the buffer is flattened first.
    AlongAxis,
}

impl Reducer {
    /// All reducers.
    pub const ALL: [Self; 9] = [
        Self::Sum,
        Self::Mean,
        Self::Prod,
        Self::Max,
        Self::Min,
        Self::Var,
        Self::CumSum,
        Self::CumProd,
        Self::Ptp,
    ];

    /// Returns the family of this reducer.
    #[must_use]
    pub const fn family(self) -> ReducerFamily {
        match self {
            Self::Sum | Self::Mean | Self::Prod | Self::Max | Self::Min | Self::Var => {
                ReducerFamily::KeepDims
            }
            Self::CumSum | Self::CumProd | Self::Ptp => ReducerFamily::AlongAxis,
        }
    }

    /// Returns true for reducers that keep the lane length.
    #[must_use]
    pub const fn is_cumulative(self) -> bool {
        matches!(self, Self::CumSum | Self::CumProd)
    }

    /// Returns the name of the reducer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Prod => "prod",
            Self::Max => "max",
            Self::Min => "min",
            Self::Var => "var",
            Self::CumSum => "cumsum",
            Self::CumProd => "cumprod",
            Self::Ptp => "ptp",
        }
    }

    /// Collapses a lane to a single value.
    pub fn reduce_lane<T: Numeric>(self, lane: &[T]) -> Result<T> {
        match self {
            Self::Sum => Ok(sum(lane)),
            Self::Prod => Ok(prod(lane)),
            Self::Max => max(lane).ok_or(Error::EmptyBuffer),
            Self::Min => min(lane).ok_or(Error::EmptyBuffer),
            Self::Mean => from_f64(mean_f64(lane).ok_or(Error::EmptyBuffer)?),
            Self::Var => from_f64(var_f64(lane).ok_or(Error::EmptyBuffer)?),
            Self::Ptp => match (max(lane), min(lane)) {
                (Some(hi), Some(lo)) => Ok(hi.acc_sub(lo)),
                _ => Err(Error::EmptyBuffer),
            },
            Self::CumSum | Self::CumProd => Err(Error::invalid_operation(format!(
                "{} does not collapse a lane",
                self.name()
            ))),
        }
    }

    /// Scans a lane, pushing one running value per element.
    pub fn scan_lane<T: Numeric>(self, lane: &[T], out: &mut Vec<T>) -> Result<()> {
        match self {
            Self::CumSum => {
                let mut acc = T::zero();
                for &v in lane {
                    acc = acc.acc_add(v);
                    out.push(acc);
                }
                Ok(())
            }
            Self::CumProd => {
                let mut acc = T::one();
                for &v in lane {
                    acc = acc.acc_mul(v);
                    out.push(acc);
                }
                Ok(())
            }
            _ => Err(Error::invalid_operation(format!(
                "{} is not a cumulative reduction",
                self.name()
            ))),
        }
    }
}

impl core::fmt::Display for Reducer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Lane Kernels
// =============================================================================

/// Computes the sum of all elements.
pub(crate) fn sum<T: Numeric>(a: &[T]) -> T {
    let mut result = T::zero();
    for &val in a {
        result = result.acc_add(val);
    }
    result
}

/// Computes the product of all elements.
pub(crate) fn prod<T: Numeric>(a: &[T]) -> T {
    let mut result = T::one();
    for &val in a {
        result = result.acc_mul(val);
    }
    result
}

/// Finds the maximum element; NaN propagates.
pub(crate) fn max<T: Numeric>(a: &[T]) -> Option<T> {
    let (&first, rest) = a.split_first()?;
    let mut result = first;
    for &val in rest {
        if val > result || val.is_unordered() {
            result = val;
        }
    }
    Some(result)
}

/// Finds the minimum element; NaN propagates.
pub(crate) fn min<T: Numeric>(a: &[T]) -> Option<T> {
    let (&first, rest) = a.split_first()?;
    let mut result = first;
    for &val in rest {
        if val < result || val.is_unordered() {
            result = val;
        }
    }
    Some(result)
}

/// Finds the index of the first maximum (or first NaN).
pub(crate) fn argmax<T: Numeric>(a: &[T]) -> Option<usize> {
    let (&first, _) = a.split_first()?;
    let mut best = first;
    let mut best_idx = 0;
    for (i, &val) in a.iter().enumerate() {
        if best.is_unordered() {
            break;
        }
        if val > best || val.is_unordered() {
            best = val;
            best_idx = i;
        }
    }
    Some(best_idx)
}

/// Finds the index of the first minimum (or first NaN).
pub(crate) fn argmin<T: Numeric>(a: &[T]) -> Option<usize> {
    let (&first, _) = a.split_first()?;
    let mut best = first;
    let mut best_idx = 0;
    for (i, &val) in a.iter().enumerate() {
        if best.is_unordered() {
            break;
        }
        if val < best || val.is_unordered() {
            best = val;
            best_idx = i;
        }
    }
    Some(best_idx)
}

fn mean_f64<T: Numeric>(a: &[T]) -> Option<f64> {
    if a.is_empty() {
        return None;
    }
    let total: f64 = a.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).sum();
    Some(total / a.len() as f64)
}

fn var_f64<T: Numeric>(a: &[T]) -> Option<f64> {
    let mean = mean_f64(a)?;
    let total: f64 = a
        .iter()
        .map(|v| {
            let d = v.to_f64().unwrap_or(f64::NAN) - mean;
            d * d
        })
        .sum();
    Some(total / a.len() as f64)
}

/// Converts an f64 statistic back into the element type.
///
/// Integer element types truncate toward zero.
fn from_f64<T: Numeric>(value: f64) -> Result<T> {
    <T as NumCast>::from(value).ok_or_else(|| {
        Error::invalid_operation(format!("statistic {value} is not representable as {}", T::DTYPE))
    })
}

// =============================================================================
// Buffer Reductions
// =============================================================================

impl<T: Numeric> NdBuffer<T> {
    /// Collapses the given axes with `reducer`.
    ///
    /// `axes` must be normalized (ascending, unique, in range). With `keepdims`
    /// each reduced axis remains with extent 1, otherwise it is removed.
    pub fn reduce_axes(&self, reducer: Reducer, axes: &[usize], keepdims: bool) -> Result<Self> {
        let kept: Vec<usize> = (0..self.ndim()).filter(|a| !axes.contains(a)).collect();
        let order: Vec<usize> = kept.iter().chain(axes.iter()).copied().collect();
        let data = self.permute(&order)?.to_vec();

        let lane_len: usize = axes.iter().map(|&a| self.shape[a]).product();
        let lanes = numel(&kept.iter().map(|&a| self.shape[a]).collect::<Vec<_>>());

        let mut out = Vec::with_capacity(lanes);
        for lane in 0..lanes {
            out.push(reducer.reduce_lane(&data[lane * lane_len..(lane + 1) * lane_len])?);
        }

        let shape: Shape = if keepdims {
            self.shape
                .iter()
                .enumerate()
                .map(|(a, &n)| if axes.contains(&a) { 1 } else { n })
                .collect()
        } else {
            kept.iter().map(|&a| self.shape[a]).collect()
        };

        Self::from_vec(out, &shape)
    }

    /// Scans along one axis with a cumulative reducer; the shape is unchanged.
    pub fn accumulate_axis(&self, reducer: Reducer, axis: usize) -> Result<Self> {
        if axis >= self.ndim() {
            return Err(Error::InvalidDimension {
                index: axis as i64,
                ndim: self.ndim(),
            });
        }
        let len = self.shape[axis];
        self.map_lanes(axis, len, |lane, out| reducer.scan_lane(lane, out))
    }

    /// Applies an along-axis reducer to the flattened buffer.
    ///
    /// Cumulative reducers return a 1-D buffer, ptp returns a rank-0 buffer.
    pub fn reduce_flat(&self, reducer: Reducer) -> Result<Self> {
        let data = self.to_vec();
        if reducer.is_cumulative() {
            let mut out = Vec::with_capacity(data.len());
            reducer.scan_lane(&data, &mut out)?;
            Ok(Self::from_vec_1d(out))
        } else {
            Ok(Self::scalar(reducer.reduce_lane(&data)?))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
