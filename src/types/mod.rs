//! Strongly-typed domain types for safer APIs.
//!
//! Index newtypes keep cell, face, and component numbering apart, and
//! [`CellLayout`] records the owned/ghost split of a partition.
//!
//! # Example
//!
//! ```
//! use porous_transport::types::{CellIndex, CellLayout};
//!
//! let layout = CellLayout::new(10, 2);
//! assert!(layout.is_ghost(CellIndex::new(11).get()));
//! assert_eq!(layout.n_total(), 12);
//! ```

mod indices;

pub use indices::{CellIndex, CellLayout, ComponentIndex};
