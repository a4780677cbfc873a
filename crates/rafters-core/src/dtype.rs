//! Data Types - Rafters Element Type System
//!
//! Defines the element types a grid buffer can hold and the traits that
//! separate plain storage (`Scalar`), arithmetic (`Numeric`) and floating
//! point statistics (`Float`).
//!
//! # Key Features
//! - Runtime dtype information via `DType`, recorded when a buffer is frozen
//! - `bytemuck::Pod` elements so buffers can cross a byte boundary
//! - Numeric traits built on `num_traits`
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use bytemuck::{Pod, Zeroable};
use num_traits::{Float as NumFloat, Num, NumCast, One, WrappingAdd, WrappingMul, WrappingSub, Zero};
use serde::{Deserialize, Serialize};

use core::fmt::Debug;

// =============================================================================
// DType Enum
// =============================================================================

/// Runtime representation of buffer element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
}

impl DType {
    /// Returns the size in bytes of this data type.
    #[must_use]
    pub const fn size_of(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 | Self::I64 | Self::U64 => 8,
        }
    }

    /// Returns true if this is a floating point type.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true if this is an integer type.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns the name of this data type as a string.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Scalar Trait
// =============================================================================

/// Trait for all element types that can be stored in a buffer.
pub trait Scalar: Copy + Clone + Debug + Default + Send + Sync + Pod + Zeroable + 'static {
    /// The runtime dtype for this scalar type.
    const DTYPE: DType;

    /// Returns the dtype for this type.
    #[must_use]
    fn dtype() -> DType {
        Self::DTYPE
    }
}

// =============================================================================
// Numeric Trait
// =============================================================================

/// Trait for element types that support arithmetic and ordering.
///
/// Accumulation wraps on integer overflow, matching fixed-width array
/// arithmetic, and is plain IEEE arithmetic for floats.
pub trait Numeric: Scalar + Num + NumCast + PartialOrd + Zero + One {
    /// Adds two values, wrapping integers on overflow.
    #[must_use]
    fn acc_add(self, rhs: Self) -> Self;

    /// Subtracts two values, wrapping integers on overflow.
    #[must_use]
    fn acc_sub(self, rhs: Self) -> Self;

    /// Multiplies two values, wrapping integers on overflow.
    #[must_use]
    fn acc_mul(self, rhs: Self) -> Self;

    /// True for values unordered against themselves (NaN).
    fn is_unordered(self) -> bool;
}

/// Floating point element types.
pub trait Float: Numeric + NumFloat {}

// =============================================================================
// Scalar Implementations
// =============================================================================

macro_rules! impl_scalar {
    ($ty:ty, $dtype:expr) => {
        impl Scalar for $ty {
            const DTYPE: DType = $dtype;
        }
    };
}

impl_scalar!(f32, DType::F32);
impl_scalar!(f64, DType::F64);
impl_scalar!(i8, DType::I8);
impl_scalar!(i16, DType::I16);
impl_scalar!(i32, DType::I32);
impl_scalar!(i64, DType::I64);
impl_scalar!(u8, DType::U8);
impl_scalar!(u16, DType::U16);
impl_scalar!(u32, DType::U32);
impl_scalar!(u64, DType::U64);

// =============================================================================
// Numeric Implementations
// =============================================================================

macro_rules! impl_numeric_int {
    ($($ty:ty),*) => {$(
        impl Numeric for $ty {
            fn acc_add(self, rhs: Self) -> Self {
                WrappingAdd::wrapping_add(&self, &rhs)
            }

            fn acc_sub(self, rhs: Self) -> Self {
                WrappingSub::wrapping_sub(&self, &rhs)
            }

            fn acc_mul(self, rhs: Self) -> Self {
                WrappingMul::wrapping_mul(&self, &rhs)
            }

            fn is_unordered(self) -> bool {
                false
            }
        }
    )*};
}

macro_rules! impl_numeric_float {
    ($($ty:ty),*) => {$(
        impl Numeric for $ty {
            fn acc_add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn acc_sub(self, rhs: Self) -> Self {
                self - rhs
            }

            fn acc_mul(self, rhs: Self) -> Self {
                self * rhs
            }

            fn is_unordered(self) -> bool {
                self.is_nan()
            }
        }

        impl Float for $ty {}
    )*};
}

impl_numeric_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_numeric_float!(f32, f64);

// =============================================================================
// Tests
// =============================================================================
