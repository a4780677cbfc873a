//! Metadata Policy - What Each Operation Does to Axis Metadata
//!
//! Every operation a grid exposes appears once in [`Operation`], and
//! [`Operation::policy`] maps it to exactly one [`MetadataPolicy`]. Grid methods
//! dispatch on this table explicitly; results that may or may not keep
//! metadata are returned as an [`ArrayValue`].
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use rafters_core::dtype::Scalar;

use crate::buffer::NdBuffer;
use crate::grid::GridArray;
use crate::reduce::Reducer;

// =============================================================================
// Policies
// =============================================================================

/// How an operation treats the metadata of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataPolicy {
    /// Shape is unchanged; metadata is copied as is.
    PreserveAsIs,
    /// Offsets and voxel sizes follow the slice start and step.
    SliceAdjust,
    /// Per-axis metadata is reordered with the axes.
    ReverseAxes,
    /// Reduced axes collapse to their centroid or are demoted into metadata.
    ReduceKeepdimsOrDrop,
    /// Works along one axis, or ravels to a plain buffer.
    AlongAxisOrRavel,
    /// The result is a plain buffer.
    Discard,
}

// =============================================================================
// Operations
// =============================================================================

/// Every operation exposed by [`GridArray`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Elementwise
    Map,
    AddScalar,
    SubScalar,
    MulScalar,
    DivScalar,
    Add,
    Sub,
    Mul,
    Div,
    // Views
    Slice,
    Index,
    Transpose,
    Permute,
    SwapAxes,
    // Reductions
    Sum,
    Mean,
    Prod,
    Max,
    Min,
    Var,
    CumSum,
    CumProd,
    Ptp,
    // Downcasts
    Sort,
    Argsort,
    Argmax,
    Argmin,
    Partition,
    Argpartition,
    Reshape,
    Repeat,
    Take,
    Compress,
    MaskedSelect,
    Diagonal,
    Trace,
    Nonzero,
    Dot,
    Flatten,
    Ravel,
    IntoPlain,
    Item,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 42] = [
        Self::Map,
        Self::AddScalar,
        Self::SubScalar,
        Self::MulScalar,
        Self::DivScalar,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Slice,
        Self::Index,
        Self::Transpose,
        Self::Permute,
        Self::SwapAxes,
        Self::Sum,
        Self::Mean,
        Self::Prod,
        Self::Max,
        Self::Min,
        Self::Var,
        Self::CumSum,
        Self::CumProd,
        Self::Ptp,
        Self::Sort,
        Self::Argsort,
        Self::Argmax,
        Self::Argmin,
        Self::Partition,
        Self::Argpartition,
        Self::Reshape,
        Self::Repeat,
        Self::Take,
        Self::Compress,
        Self::MaskedSelect,
        Self::Diagonal,
        Self::Trace,
        Self::Nonzero,
        Self::Dot,
        Self::Flatten,
        Self::Ravel,
        Self::IntoPlain,
        Self::Item,
    ];

    /// Returns the metadata policy of this operation.
    ///
    /// Binary elementwise operations preserve metadata unless broadcasting
    /// changes the shape, in which case the result is a plain buffer. `Index`
    /// adjusts metadata for full strided slices and discards it otherwise.
    #[must_use]
    pub const fn policy(self) -> MetadataPolicy {
        match self {
            Self::Map
            | Self::AddScalar
            | Self::SubScalar
            | Self::MulScalar
            | Self::DivScalar
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div => MetadataPolicy::PreserveAsIs,

            Self::Slice | Self::Index => MetadataPolicy::SliceAdjust,

            Self::Transpose | Self::Permute | Self::SwapAxes => MetadataPolicy::ReverseAxes,

            Self::Sum | Self::Mean | Self::Prod | Self::Max | Self::Min | Self::Var => {
                MetadataPolicy::ReduceKeepdimsOrDrop
            }

            Self::CumSum | Self::CumProd | Self::Ptp => MetadataPolicy::AlongAxisOrRavel,

            Self::Sort
            | Self::Argsort
            | Self::Argmax
            | Self::Argmin
            | Self::Partition
            | Self::Argpartition
            | Self::Reshape
            | Self::Repeat
            | Self::Take
            | Self::Compress
            | Self::MaskedSelect
            | Self::Diagonal
            | Self::Trace
            | Self::Nonzero
            | Self::Dot
            | Self::Flatten
            | Self::Ravel
            | Self::IntoPlain
            | Self::Item => MetadataPolicy::Discard,
        }
    }

    /// Returns the operation name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::AddScalar => "add_scalar",
            Self::SubScalar => "sub_scalar",
            Self::MulScalar => "mul_scalar",
            Self::DivScalar => "div_scalar",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Slice => "slice",
            Self::Index => "index",
            Self::Transpose => "transpose",
            Self::Permute => "permute",
            Self::SwapAxes => "swap_axes",
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Prod => "prod",
            Self::Max => "max",
            Self::Min => "min",
            Self::Var => "var",
            Self::CumSum => "cumsum",
            Self::CumProd => "cumprod",
            Self::Ptp => "ptp",
            Self::Sort => "sort",
            Self::Argsort => "argsort",
            Self::Argmax => "argmax",
            Self::Argmin => "argmin",
            Self::Partition => "partition",
            Self::Argpartition => "argpartition",
            Self::Reshape => "reshape",
            Self::Repeat => "repeat",
            Self::Take => "take",
            Self::Compress => "compress",
            Self::MaskedSelect => "masked_select",
            Self::Diagonal => "diagonal",
            Self::Trace => "trace",
            Self::Nonzero => "nonzero",
            Self::Dot => "dot",
            Self::Flatten => "flatten",
            Self::Ravel => "ravel",
            Self::IntoPlain => "into_plain",
            Self::Item => "item",
        }
    }
}

impl From<Reducer> for Operation {
    fn from(reducer: Reducer) -> Self {
        match reducer {
            Reducer::Sum => Self::Sum,
            Reducer::Mean => Self::Mean,
            Reducer::Prod => Self::Prod,
            Reducer::Max => Self::Max,
            Reducer::Min => Self::Min,
            Reducer::Var => Self::Var,
            Reducer::CumSum => Self::CumSum,
            Reducer::CumProd => Self::CumProd,
            Reducer::Ptp => Self::Ptp,
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Array Value
// =============================================================================

/// Result of an operation that may or may not keep axis metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue<T: Scalar> {
    /// A grid with consistent axis metadata.
    Grid(GridArray<T>),
    /// A plain buffer.
    Plain(NdBuffer<T>),
}

impl<T: Scalar> ArrayValue<T> {
    /// Returns true if the value kept its metadata.
    #[must_use]
    pub fn is_grid(&self) -> bool {
        matches!(self, Self::Grid(_))
    }

    /// Returns true if the value is a plain buffer.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }

    /// Returns the grid, if any.
    #[must_use]
    pub fn as_grid(&self) -> Option<&GridArray<T>> {
        match self {
            Self::Grid(g) => Some(g),
            Self::Plain(_) => None,
        }
    }

    /// Consumes the value, returning the grid if any.
    #[must_use]
    pub fn into_grid(self) -> Option<GridArray<T>> {
        match self {
            Self::Grid(g) => Some(g),
            Self::Plain(_) => None,
        }
    }

    /// Returns the samples, whichever variant holds them.
    #[must_use]
    pub fn buffer(&self) -> &NdBuffer<T> {
        match self {
            Self::Grid(g) => g.as_plain(),
            Self::Plain(b) => b,
        }
    }

    /// Consumes the value, returning its samples.
    #[must_use]
    pub fn into_buffer(self) -> NdBuffer<T> {
        match self {
            Self::Grid(g) => g.into_plain(),
            Self::Plain(b) => b,
        }
    }

    /// Returns the shape of the samples.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.buffer().shape()
    }
}

impl<T: Scalar> From<GridArray<T>> for ArrayValue<T> {
    fn from(grid: GridArray<T>) -> Self {
        Self::Grid(grid)
    }
}

impl<T: Scalar> From<NdBuffer<T>> for ArrayValue<T> {
    fn from(buffer: NdBuffer<T>) -> Self {
        Self::Plain(buffer)
    }
}

// =============================================================================
// Tests
// =============================================================================
