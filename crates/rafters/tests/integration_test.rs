//! End-to-end tests for Rafters.
//! Each test walks a grid through a chain of operations the way a caller would.

use rafters::prelude::*;

fn assert_consistent<T: Scalar>(grid: &GridArray<T>) {
    let ndim = grid.ndim();
    assert_eq!(grid.axis_labels().len(), ndim);
    assert_eq!(grid.axis_units().len(), ndim);
    assert_eq!(grid.axis_offsets().len(), ndim);
    assert_eq!(grid.voxel_size().len(), ndim);
}

fn volume() -> GridArray<f64> {
    GridArray::from_vec(
        (0..60).map(f64::from).collect(),
        &[3, 4, 5],
        GridFields::new()
            .axis_labels(["z", "y", "x"])
            .axis_units(["um", "um", "um"])
            .axis_offsets(vec![100.0, 0.0, -2.0])
            .voxel_size(vec![5.0, 0.5, 0.25])
            .id("stack-01")
            .data_unit("photons"),
    )
    .unwrap()
}

/// Test 1: default metadata is filled in per axis
#[test]
fn test_defaults() {
    let g = GridArray::new(rafters::grid::zeros::<f32>(&[2, 3]));
    assert_consistent(&g);
    assert_eq!(g.axis_labels(), &["0", "1"]);
    assert_eq!(g.voxel_size(), &[1.0, 1.0]);
    assert_eq!(g.axis_offsets(), &[0.0, 0.0]);
    assert_eq!(g.data_unit(), "");
    assert!(g.metadata().is_empty());

    let err = GridArray::with_fields(
        NdBuffer::<f32>::zeros(&[2, 3]),
        GridFields::new().axis_labels(["only-one"]),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidMetadata { .. }));
}

/// Test 2: slicing then reducing keeps coordinates exact
#[test]
fn test_slice_then_reduce() {
    let g = volume();
    let roi = g
        .slice(&[SliceSpec::All, SliceSpec::range(1, 3), SliceSpec::step(2)])
        .unwrap();
    assert_consistent(&roi);
    assert_eq!(roi.shape(), &[3, 2, 3]);
    assert_eq!(roi.axis_offsets(), &[100.0, 0.5, -2.0]);
    assert_eq!(roi.voxel_size(), &[5.0, 0.5, 0.5]);

    let mip = roi.max(Some(&[0]), false).unwrap();
    assert_consistent(&mip);
    assert_eq!(mip.axis_labels(), &["y", "x"]);
    assert_eq!(mip.metadata().get("z_avg").and_then(MetaValue::as_f64), Some(105.0));
    assert_eq!(mip.get(&[0, 0]).unwrap(), 45.0);
    assert_eq!(mip.id(), Some("stack-01"));
}

/// Test 3: slice linearity on a single axis
#[test]
fn test_slice_linearity() {
    let line = GridArray::from_vec(
        (0..10).map(f64::from).collect(),
        &[10],
        GridFields::new().voxel_size(vec![2.0]).axis_offsets(vec![0.0]),
    )
    .unwrap();
    let s = line.slice(&[SliceSpec::range_step(2, 8, 2)]).unwrap();
    assert_eq!(s.voxel_size(), &[4.0]);
    assert_eq!(s.axis_offsets(), &[4.0]);
}

/// Test 4: keepdims and drop reductions
#[test]
fn test_keepdims_and_drop() {
    let plane = GridArray::from_vec(
        vec![1.0_f64; 30],
        &[5, 6],
        GridFields::new().axis_labels(["row", "col"]).voxel_size(vec![3.0, 1.0]),
    )
    .unwrap();

    let kept = plane.sum(Some(&[0]), true).unwrap();
    assert_eq!(kept.shape(), &[1, 6]);
    assert_eq!(kept.voxel_size()[0], 3.0 * 5.0);
    assert_consistent(&kept);

    let dropped = plane.sum(Some(&[0]), false).unwrap();
    assert_eq!(dropped.shape(), &[6]);
    let centroid = plane.axes().centroid(0, 5);
    assert_eq!(dropped.metadata().get("row_avg").and_then(MetaValue::as_f64), Some(centroid));
    assert_eq!(centroid, 6.0);
}

/// Test 5: transpose is an involution and reduces consistently
#[test]
fn test_transpose() {
    let g = volume();
    let t = g.transpose();
    assert_consistent(&t);
    assert_eq!(t.axis_labels(), &["x", "y", "z"]);
    assert_eq!(t.transpose(), g);

    let a = g.mean(Some(&[2]), false).unwrap();
    let b = t.mean(Some(&[0]), false).unwrap().transpose();
    assert_eq!(a, b);

    assert!(matches!(
        g.permute(&[1, 0, 2]),
        Err(Error::UnsupportedOperation { .. })
    ));
}

/// Test 6: every operation is classified and downcasts return plain buffers
#[test]
fn test_policy_table() {
    let discards = Operation::ALL
        .iter()
        .filter(|op| op.policy() == MetadataPolicy::Discard)
        .count();
    assert_eq!(discards, 19);
    assert_eq!(Operation::Slice.policy(), MetadataPolicy::SliceAdjust);
    assert_eq!(Operation::Transpose.policy(), MetadataPolicy::ReverseAxes);

    let g = volume();
    let sorted: NdBuffer<f64> = g.sort(Some(-1)).unwrap();
    assert_eq!(sorted.shape(), g.shape());
    let flat: NdBuffer<f64> = g.ravel();
    assert_eq!(flat.shape(), &[60]);
    let index = g.index(&[SliceSpec::Index(0)]).unwrap();
    assert!(index.is_plain());
    assert_eq!(index.shape(), &[4, 5]);
}

/// Test 7: elementwise operations keep metadata unless broadcasting grows the shape
#[test]
fn test_elementwise() {
    let g = volume();
    let scaled = g.mul_scalar(2.0).add_scalar(1.0);
    assert_eq!(scaled.attrs(), g.attrs());

    let same = g.sub(&NdBuffer::full(&[5], 1.0)).unwrap();
    assert!(same.is_grid());

    let grown = g.add(&NdBuffer::zeros(&[2, 1, 1, 1])).unwrap();
    assert!(grown.is_plain());
    assert_eq!(grown.shape(), &[2, 3, 4, 5]);
}

/// Test 8: along-axis reducers
#[test]
fn test_along_axis_reducers() {
    let g = volume();
    let running = g.cumsum(Some(0)).unwrap();
    assert_eq!(running.as_grid().map(GridArray::attrs), Some(g.attrs()));

    assert!(g.cumprod(None).unwrap().is_plain());
    let spread = g.ptp(Some(1)).unwrap().into_grid().unwrap();
    assert_eq!(spread.axis_labels(), &["z", "x"]);
    assert!(spread.metadata().contains_key("y_avg"));

    assert!(matches!(
        g.reduce(Reducer::Ptp, Some(&[0, 1]), false),
        Err(Error::UnsupportedOperation { .. })
    ));
}

/// Test 9: freeze, encode and restore
#[test]
fn test_serialization_round_trip() {
    let g = volume().slice(&[SliceSpec::All, SliceSpec::All, SliceSpec::step(-1)]).unwrap();

    let (raw, fields) = g.freeze();
    assert_eq!(GridArray::<f64>::thaw(&raw, fields).unwrap(), g);

    let dir = tempfile::tempdir().unwrap();
    for name in ["stack.rgrid", "stack.json"] {
        let path = dir.path().join(name);
        save_grid(&g, &path).unwrap();
        let back: GridArray<f64> = load_grid(&path).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.voxel_size(), &[5.0, 0.5, -0.25]);
    }
}

/// Test 10: custom configuration flows into derived grids
#[test]
fn test_custom_config() {
    let config = GridConfig::from_toml_str(
        r#"
axis_unit = "mm"
voxel_size = 0.5
avg_suffix = "_mean"
"#,
    )
    .unwrap();
    let g = GridArray::with_config(NdBuffer::<f64>::ones(&[4, 2]), GridFields::new(), config).unwrap();
    assert_eq!(g.axis_units(), &["mm", "mm"]);

    let r = g.sum(Some(&[0]), false).unwrap();
    assert_eq!(r.config().avg_suffix, "_mean");
    assert_eq!(r.metadata().get("0_mean").and_then(MetaValue::as_f64), Some(0.75));
    assert_eq!(r.metadata().get("0_unit").and_then(MetaValue::as_str), Some("mm"));
}
