//! Grid Reductions - Metadata-Aware Aggregation
//!
//! Keepdims reducers (sum, mean, prod, max, min, var) accept any set of axes.
//! With `keepdims` a reduced axis survives as a single sample spanning the
//! whole axis: its voxel size becomes `voxel * count` and its offset moves to
//! the axis centroid. Without `keepdims` the axis is removed and its centroid
//! and unit are recorded in the metadata map under `"{label}_avg"` and
//! `"{label}_unit"`.
//!
//! Along-axis reducers (cumsum, cumprod, ptp) take one axis or none. Running
//! reductions keep the shape and all metadata; ptp removes its axis like a
//! keepdims reducer without `keepdims`. Without an axis the grid is flattened
//! and a plain buffer is returned.
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::Numeric;
use rafters_core::error::{Error, Result};
use tracing::debug;

use crate::grid::GridArray;
use crate::policy::{ArrayValue, MetadataPolicy, Operation};
use crate::reduce::{Reducer, ReducerFamily};
use crate::shape::{normalize_axes, normalize_axis};

impl<T: Numeric> GridArray<T> {
    // =========================================================================
    // Dispatcher
    // =========================================================================

    /// Applies any reducer.
    ///
    /// `axes = None` selects every axis for keepdims reducers and the
    /// flattened grid for along-axis reducers.
    pub fn reduce(&self, reducer: Reducer, axes: Option<&[isize]>, keepdims: bool) -> Result<ArrayValue<T>> {
        match Operation::from(reducer).policy() {
            MetadataPolicy::ReduceKeepdimsOrDrop => self
                .reduce_keepdims_or_drop(reducer, axes, keepdims)
                .map(ArrayValue::Grid),
            MetadataPolicy::AlongAxisOrRavel => self.reduce_along_axis(reducer, axes, keepdims),
            policy => Err(Error::invalid_operation(format!(
                "{reducer} has policy {policy:?}, not a reduction"
            ))),
        }
    }

    fn reduce_keepdims_or_drop(
        &self,
        reducer: Reducer,
        axes: Option<&[isize]>,
        keepdims: bool,
    ) -> Result<Self> {
        debug_assert_eq!(reducer.family(), ReducerFamily::KeepDims);
        let axes = normalize_axes(axes, self.ndim())?;
        let buffer = self.buffer.reduce_axes(reducer, &axes, keepdims)?;

        let mut attrs = self.attrs();
        attrs.axes = if keepdims {
            self.axes.reduced_keepdims(&axes, self.shape())
        } else {
            self.axes
                .removed(&axes, self.shape(), &self.config, &mut attrs.metadata)
        };
        self.derive(buffer, attrs)
    }

    fn reduce_along_axis(
        &self,
        reducer: Reducer,
        axes: Option<&[isize]>,
        keepdims: bool,
    ) -> Result<ArrayValue<T>> {
        if keepdims {
            return Err(Error::unsupported(format!("{reducer} with keepdims")));
        }

        let axis = match axes {
            None => {
                debug!(operation = %reducer, "no axis given; ravelling and discarding axis metadata");
                return self.buffer.reduce_flat(reducer).map(ArrayValue::Plain);
            }
            Some(&[axis]) => normalize_axis(axis, self.ndim())?,
            Some(axes) => {
                return Err(Error::unsupported(format!(
                    "{reducer} over axes {axes:?}: takes exactly one axis or none"
                )))
            }
        };

        if reducer.is_cumulative() {
            let buffer = self.buffer.accumulate_axis(reducer, axis)?;
            return self.derive(buffer, self.attrs()).map(ArrayValue::Grid);
        }

        let buffer = self.buffer.reduce_axes(reducer, &[axis], false)?;
        let mut attrs = self.attrs();
        attrs.axes = self
            .axes
            .removed(&[axis], self.shape(), &self.config, &mut attrs.metadata);
        self.derive(buffer, attrs).map(ArrayValue::Grid)
    }

    // =========================================================================
    // Keepdims Reducers
    // =========================================================================

    /// Sum over `axes` (all when `None`).
    pub fn sum(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Sum, axes, keepdims)
    }

    /// Arithmetic mean over `axes`; integer grids truncate toward zero.
    pub fn mean(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Mean, axes, keepdims)
    }

    /// Product over `axes`.
    pub fn prod(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Prod, axes, keepdims)
    }

    /// Maximum over `axes`.
    pub fn max(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Max, axes, keepdims)
    }

    /// Minimum over `axes`.
    pub fn min(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Min, axes, keepdims)
    }

    /// Population variance over `axes`.
    pub fn var(&self, axes: Option<&[isize]>, keepdims: bool) -> Result<Self> {
        self.reduce_keepdims_or_drop(Reducer::Var, axes, keepdims)
    }

    // =========================================================================
    // Along-Axis Reducers
    // =========================================================================

    /// Running sum along `axis`, or over the flattened grid.
    pub fn cumsum(&self, axis: Option<isize>) -> Result<ArrayValue<T>> {
        self.reduce_along_axis(Reducer::CumSum, axis.as_ref().map(core::slice::from_ref), false)
    }

    /// Running product along `axis`, or over the flattened grid.
    pub fn cumprod(&self, axis: Option<isize>) -> Result<ArrayValue<T>> {
        self.reduce_along_axis(Reducer::CumProd, axis.as_ref().map(core::slice::from_ref), false)
    }

    /// Peak to peak along `axis`, or over the flattened grid.
    pub fn ptp(&self, axis: Option<isize>) -> Result<ArrayValue<T>> {
        self.reduce_along_axis(Reducer::Ptp, axis.as_ref().map(core::slice::from_ref), false)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::NdBuffer;
    use crate::metadata::{GridFields, MetaValue};
    use crate::view::SliceSpec;

    fn plane() -> GridArray<f64> {
        GridArray::from_vec(
            (0..30).map(f64::from).collect(),
            &[5, 6],
            GridFields::new()
                .axis_labels(["z", "x"])
                .axis_units(["um", "px"])
                .axis_offsets(vec![10.0, 0.0])
                .voxel_size(vec![2.0, 0.5]),
        )
        .unwrap()
    }

    #[test]
    fn test_keepdims_collapses_axis() {
        let g = plane();
        let r = g.sum(Some(&[0]), true).unwrap();
        assert_eq!(r.shape(), &[1, 6]);
        assert_eq!(r.voxel_size(), &[10.0, 0.5]);
        // samples at 10..=18 step 2, centered on 14
        assert_eq!(r.axis_offsets(), &[14.0, 0.0]);
        assert_eq!(r.axis_labels(), g.axis_labels());
        assert_eq!(r.to_vec()[0], 0.0 + 6.0 + 12.0 + 18.0 + 24.0);
    }

    #[test]
    fn test_drop_demotes_axis() {
        let g = plane();
        let r = g.mean(Some(&[0]), false).unwrap();
        assert_eq!(r.shape(), &[6]);
        assert_eq!(r.axis_labels(), &["x"]);
        assert_eq!(r.axis_units(), &["px"]);
        assert_eq!(r.metadata().get("z_avg"), Some(&MetaValue::Float(g.axes().centroid(0, 5))));
        assert_eq!(r.metadata().get("z_avg").and_then(MetaValue::as_f64), Some(14.0));
        assert_eq!(r.metadata().get("z_unit").and_then(MetaValue::as_str), Some("um"));
        assert_eq!(r.to_vec()[0], 12.0);
    }

    #[test]
    fn test_axes_are_normalized() {
        let g = plane();
        let a = g.max(Some(&[-1, 1]), false).unwrap();
        let b = g.max(Some(&[1]), false).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_vec(), vec![5.0, 11.0, 17.0, 23.0, 29.0]);
        assert!(g.max(Some(&[2]), false).is_err());
    }

    #[test]
    fn test_reduce_all_axes() {
        let g = plane();
        let total = g.sum(None, false).unwrap();
        assert_eq!(total.ndim(), 0);
        assert_eq!(total.item().unwrap(), 435.0);
        assert!(total.axis_labels().is_empty());
        assert!(total.metadata().contains_key("z_avg"));
        assert!(total.metadata().contains_key("x_avg"));

        let kept = g.min(None, true).unwrap();
        assert_eq!(kept.shape(), &[1, 1]);
        assert_eq!(kept.item().unwrap(), 0.0);
    }

    #[test]
    fn test_variance_is_population() {
        let g = GridArray::new(NdBuffer::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[4]).unwrap());
        assert_eq!(g.var(None, false).unwrap().item().unwrap(), 1.25);
    }

    #[test]
    fn test_empty_lanes() {
        let g = GridArray::new(NdBuffer::<f64>::zeros(&[0, 3]));
        let s = g.sum(Some(&[0]), false).unwrap();
        assert_eq!(s.to_vec(), vec![0.0, 0.0, 0.0]);
        assert_eq!(g.prod(Some(&[0]), false).unwrap().to_vec(), vec![1.0, 1.0, 1.0]);
        assert_eq!(g.max(Some(&[0]), false).unwrap_err(), Error::EmptyBuffer);
        assert_eq!(g.mean(Some(&[0]), false).unwrap_err(), Error::EmptyBuffer);
    }

    #[test]
    fn test_empty_axis_keepdims() {
        let g = GridArray::with_fields(
            NdBuffer::<f64>::zeros(&[0, 3]),
            GridFields::new()
                .axis_labels(["z", "x"])
                .axis_offsets(vec![5.0, 0.0])
                .voxel_size(vec![2.0, 1.0]),
        )
        .unwrap();

        let kept = g.sum(Some(&[0]), true).unwrap();
        assert_eq!(kept.shape(), &[1, 3]);
        assert_eq!(kept.to_vec(), vec![0.0; 3]);
        // zero samples span nothing, centered half a voxel before sample 0
        assert_eq!(kept.voxel_size(), &[0.0, 1.0]);
        assert_eq!(kept.axis_offsets(), &[4.0, 0.0]);

        let dropped = g.prod(Some(&[0]), false).unwrap();
        assert_eq!(dropped.metadata().get("z_avg").and_then(MetaValue::as_f64), Some(4.0));
    }

    #[test]
    fn test_empty_axis_list_reduces_nothing() {
        let g = plane();
        for keepdims in [false, true] {
            assert_eq!(g.sum(Some(&[]), keepdims).unwrap(), g);
            assert_eq!(g.var(Some(&[]), keepdims).unwrap().to_vec(), vec![0.0; 30]);
        }
        assert!(g.max(Some(&[]), false).unwrap().metadata().is_empty());
    }

    #[test]
    fn test_integer_reductions_wrap() {
        let g = GridArray::new(NdBuffer::from_vec(vec![200_u8, 100], &[2]).unwrap());
        assert_eq!(g.sum(None, false).unwrap().item().unwrap(), 44);
        assert_eq!(g.prod(Some(&[0]), true).unwrap().to_vec(), vec![32]);
        assert_eq!(g.cumsum(Some(0)).unwrap().buffer().to_vec(), vec![200, 44]);
        assert_eq!(g.ptp(None).unwrap().buffer().to_vec(), vec![100]);
    }

    #[test]
    fn test_cumulative_on_strided_views() {
        let g = plane().slice(&[SliceSpec::step(2), SliceSpec::step(-1)]).unwrap();
        assert_eq!(g.shape(), &[3, 6]);

        let across = g.cumsum(Some(1)).unwrap().into_grid().unwrap();
        assert_eq!(across.attrs(), g.attrs());
        assert_eq!(&across.to_vec()[..6], &[5.0, 9.0, 12.0, 14.0, 15.0, 15.0]);
        assert_eq!(&across.to_vec()[6..12], &[17.0, 33.0, 48.0, 62.0, 75.0, 87.0]);

        let down = g.cumsum(Some(0)).unwrap();
        let column: Vec<f64> = down.buffer().to_vec().iter().step_by(6).copied().collect();
        assert_eq!(column, vec![5.0, 22.0, 51.0]);
        assert_eq!(g.axis_offsets(), &[10.0, 2.5]);
    }

    #[test]
    fn test_cumulative_keeps_metadata() {
        let g = plane();
        let c = g.cumsum(Some(1)).unwrap().into_grid().unwrap();
        assert_eq!(c.shape(), g.shape());
        assert_eq!(c.attrs(), g.attrs());
        assert_eq!(&c.to_vec()[..3], &[0.0, 1.0, 3.0]);

        let p = g.cumprod(Some(-2)).unwrap();
        assert!(p.is_grid());
    }

    #[test]
    fn test_ptp_removes_axis() {
        let g = plane();
        let p = g.ptp(Some(0)).unwrap().into_grid().unwrap();
        assert_eq!(p.shape(), &[6]);
        assert!(p.to_vec().iter().all(|&v| v == 24.0));
        assert_eq!(p.metadata().get("z_avg").and_then(MetaValue::as_f64), Some(14.0));
    }

    #[test]
    fn test_along_axis_without_axis_ravels() {
        let g = plane();
        let c = g.cumsum(None).unwrap();
        assert!(c.is_plain());
        assert_eq!(c.shape(), &[30]);

        let p = g.ptp(None).unwrap();
        assert!(p.is_plain());
        assert_eq!(p.buffer().item().unwrap(), 29.0);
    }

    #[test]
    fn test_along_axis_errors() {
        let g = plane();
        assert!(matches!(
            g.reduce(Reducer::Ptp, Some(&[0, 1]), false),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            g.reduce(Reducer::CumSum, Some(&[0]), true),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_dispatcher() {
        let g = plane();
        for reducer in Reducer::ALL {
            let result = g.reduce(reducer, Some(&[1]), false).unwrap();
            assert!(result.is_grid(), "{reducer}");
            let grid = result.as_grid().unwrap();
            assert_eq!(grid.axis_labels().len(), grid.ndim());
            assert_eq!(grid.axis_units().len(), grid.ndim());
            assert_eq!(grid.axis_offsets().len(), grid.ndim());
            assert_eq!(grid.voxel_size().len(), grid.ndim());
        }
    }

    #[test]
    fn test_custom_demotion_suffixes() {
        let config = rafters_core::GridConfig {
            avg_suffix: ".center".to_string(),
            unit_suffix: ".unit".to_string(),
            ..rafters_core::GridConfig::default()
        };
        let g = GridArray::with_config(NdBuffer::<f32>::ones(&[3]), GridFields::new().axis_labels(["t"]), config)
            .unwrap();
        let r = g.sum(None, false).unwrap();
        assert_eq!(r.metadata().get("t.center").and_then(MetaValue::as_f64), Some(1.0));
        assert!(r.metadata().contains_key("t.unit"));
    }
}
