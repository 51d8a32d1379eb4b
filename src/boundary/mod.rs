//! Boundary conditions for solute transport.
//!
//! Boundary conditions prescribe the concentration of water entering the
//! domain through inflow boundary faces. Outflow faces need no data: the
//! donor cell's concentration leaves with the flux.
//!
//! # Available Boundary Conditions
//!
//! | BC Type | Description |
//! |---------|-------------|
//! | `ConstantBoundary` | Fixed inflow concentrations |
//! | `TabularBoundary` | Inflow concentrations from time series |

mod concentration;

pub use concentration::{ConstantBoundary, TabularBoundary, TransportBoundary};
