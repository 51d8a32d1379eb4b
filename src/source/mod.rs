//! Source terms for solute transport.
//!
//! Sources inject or extract solute mass in cells (wells, reactions lumped
//! into a rate, leakage). Every applied rate is also booked in the mass
//! balance so the realized change in stored mass can be compared against
//! the exact one.
//!
//! - [`TransportSource`]: source interface
//! - [`ConstantSource`], [`TabularSource`]: fixed and time-series rates
//! - [`apply_sources`]: add the current rates to a conservative field

mod solute;

pub use solute::{apply_sources, ConstantSource, TabularSource, TransportSource};
