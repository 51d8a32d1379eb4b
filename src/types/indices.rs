//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up different kinds of indices
//! (cell vs transported component).

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// First index (0).
            pub const ZERO: Self = Self(0);

            /// Create an iterator over [0, n) indices.
            pub fn iter(n: usize) -> impl Iterator<Item = $name> + ExactSizeIterator {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        // Allow using as array index
        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Cell index in a (possibly partitioned) mesh.
    ///
    /// Owned cells come first, ghost cells are appended after them.
    ///
    /// # Example
    ///
    /// ```
    /// use porous_transport::types::CellIndex;
    ///
    /// let cell = CellIndex::new(42);
    /// assert_eq!(cell.get(), 42);
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Index of a transported component (aqueous components first, then gaseous).
    ComponentIndex,
    "K"
);

// =============================================================================
// Cell layout
// =============================================================================

/// Owned/ghost split of a partition's cell numbering.
///
/// Cells `0..n_owned` belong to this partition; `n_owned..n_owned + n_ghost`
/// are read-only copies of cells owned by neighbouring partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellLayout {
    /// Number of cells owned by this partition.
    pub n_owned: usize,
    /// Number of ghost cells appended after the owned ones.
    pub n_ghost: usize,
}

impl CellLayout {
    /// Create a new layout.
    pub const fn new(n_owned: usize, n_ghost: usize) -> Self {
        Self { n_owned, n_ghost }
    }

    /// Layout with no ghost layer (single partition).
    pub const fn serial(n_owned: usize) -> Self {
        Self {
            n_owned,
            n_ghost: 0,
        }
    }

    /// Total number of cells including ghosts.
    #[inline]
    pub const fn n_total(&self) -> usize {
        self.n_owned + self.n_ghost
    }

    /// Whether `cell` is owned by this partition.
    #[inline]
    pub const fn is_owned(&self, cell: usize) -> bool {
        cell < self.n_owned
    }

    /// Whether `cell` is a ghost of a neighbouring partition.
    #[inline]
    pub const fn is_ghost(&self, cell: usize) -> bool {
        cell >= self.n_owned && cell < self.n_total()
    }
}

// =============================================================================
// Tests
// =============================================================================
