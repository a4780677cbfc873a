//! Storage - Sample Memory for Grid Buffers
//!
//! Provides the contiguous, reference-counted memory underlying every buffer
//! view. Slicing and transposition re-stride a view over the same storage;
//! only operations that produce new values allocate. Samples are never
//! written after construction, so views can share them freely across threads.
//!
//! # Example
//! ```rust
//! use rafters_core::Storage;
//!
//! let storage = Storage::from_vec(vec![1.0_f64, 2.0, 3.0]);
//! let view = storage.clone();
//! assert!(view.shares_with(&storage));
//! assert_eq!(view.as_slice(), &[1.0, 2.0, 3.0]);
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

use std::sync::Arc;

use crate::dtype::Scalar;

// =============================================================================
// Storage Struct
// =============================================================================

/// Immutable sample memory shared between buffer views.
#[derive(Debug)]
pub struct Storage<T: Scalar> {
    inner: Arc<[T]>,
}

impl<T: Scalar> Storage<T> {
    /// Creates storage that takes ownership of a vector.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { inner: data.into() }
    }

    /// Creates storage from a slice by copying the data.
    #[must_use]
    pub fn from_slice(data: &[T]) -> Self {
        Self { inner: data.into() }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns true if both views point into the same allocation.
    #[must_use]
    pub fn shares_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the elements.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.inner
    }
}

impl<T: Scalar> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
