//! Time integration methods.

mod integrator;
mod interpolation;

pub use integrator::{ExplicitRungeKutta, Integrable, IntegratorInfo, RkMethod};
pub use interpolation::interpolate_cell_vector;
