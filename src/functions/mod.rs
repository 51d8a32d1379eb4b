//! Scalar functions used to drive time-dependent boundary and source data.

mod tabular;

pub use tabular::{FunctionError, TabularForm, TabularFunction};
