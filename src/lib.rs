//! # porous-transport
//!
//! Explicit sub-cycled finite-volume transport of solutes through porous media.
//!
//! This crate provides the time-stepping engine of a solute transport
//! process coupled to an external flow solver:
//! - Unstructured polyhedral meshes, including non-manifold (fracture) faces
//! - Upwind stencils built from face flux snapshots
//! - Stable explicit time step estimation
//! - Sub-cycling of macro steps with saturation interpolation
//! - Donor upwind, predictor-corrector and generic Runge-Kutta updaters
//! - Exact mass bookkeeping for sources and boundaries
//! - Ghost-cell communication for domain decomposition
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use porous_transport::{
//!     CellLayout, ComponentField, ComponentIndex, ConstantBoundary, ExplicitTransport,
//!     FlowFields, FluxSnapshot, PolyMesh, TransportConfig, TransportState,
//! };
//!
//! // Rightward flow through a 10 cell column, clean water entering on the left
//! let mesh = PolyMesh::uniform_1d(10, 1.0, 1.0);
//! let mut q = vec![1e-3; 11];
//! q[0] = -1e-3;
//! let flux = FluxSnapshot::from_face_fluxes(&mesh, &q).unwrap();
//! let flow = FlowFields::steady(flux, vec![0.3; 10], vec![1.0; 10]);
//! let tcc = ComponentField::from_components(CellLayout::serial(10), vec![vec![1.0; 10]]).unwrap();
//! let mut state = TransportState::new(tcc, flow);
//!
//! let mut transport = ExplicitTransport::new(TransportConfig::default(), Arc::new(mesh)).unwrap();
//! transport
//!     .add_boundary(ConstantBoundary::new(vec![0], vec![(ComponentIndex::ZERO, 0.0)]))
//!     .unwrap();
//! transport.advance_step(&mut state, 0.0, 100.0).unwrap();
//!
//! assert!(state.tcc.get(ComponentIndex::ZERO, 0) < 1.0);
//! assert!((state.tcc.get(ComponentIndex::ZERO, 9) - 1.0).abs() < 1e-12);
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod functions;
pub mod mesh;
pub mod parallel;
pub mod source;
pub mod state;
pub mod time;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use boundary::{ConstantBoundary, TabularBoundary, TransportBoundary};
pub use config::{TailPolicy, TransportConfig, UpdaterKind};
pub use error::{Result, TransportError};
pub use functions::{TabularForm, TabularFunction};
pub use mesh::{PolyMesh, TransportMesh, UpwindStencil};
pub use parallel::{Communicator, LoopbackCommunicator, SerialCommunicator};
pub use source::{ConstantSource, TabularSource, TransportSource};
pub use state::{ComponentField, FlowFields, FlowInterval, FluxSnapshot, TransportState};
pub use time::{interpolate_cell_vector, ExplicitRungeKutta, RkMethod};
pub use transport::{
    estimate_stable_step, CycleUpdater, DispersionSolver, DualPorosity, ExplicitTransport,
    LinearReconstruction, MassBalance, MultiscaleExchange, StableStep, StepReport,
    SubcycleController,
};
pub use types::{CellIndex, CellLayout, ComponentIndex};
