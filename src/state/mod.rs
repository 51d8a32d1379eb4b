//! Persistent transport state: concentrations plus the flow fields driving them.
//!
//! [`TransportState`] plays the role of the external field store. The
//! engine reads it at the start of a macro step and writes concentrations
//! back only after the whole step succeeded.
//!
//! # Example
//! ```
//! use porous_transport::mesh::PolyMesh;
//! use porous_transport::state::{ComponentField, FlowFields, FluxSnapshot, TransportState};
//! use porous_transport::types::CellLayout;
//!
//! let mesh = PolyMesh::uniform_1d(2, 2.0, 1.0);
//! let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 1.0, 1.0]).unwrap();
//! let flow = FlowFields::steady(flux, vec![1.0; 2], vec![1.0; 2]);
//! let tcc = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 0.0]]).unwrap();
//! let state = TransportState::new(tcc, flow);
//! assert_eq!(state.tcc.n_components(), 1);
//! ```

mod field;
mod flow;

pub use field::ComponentField;
pub use flow::{FlowFields, FlowInterval, FluxSnapshot};

use crate::error::{Result, TransportError};
use crate::mesh::TransportMesh;

/// Concentrations and flow fields of one partition.
#[derive(Clone, Debug)]
pub struct TransportState {
    /// Total component concentrations (aqueous first, then gaseous).
    pub tcc: ComponentField,
    /// Flow fields for the current macro step.
    pub flow: FlowFields,
}

impl TransportState {
    /// Bundle concentrations with flow fields.
    pub fn new(tcc: ComponentField, flow: FlowFields) -> Self {
        Self { tcc, flow }
    }

    /// Check field sizes against the mesh.
    pub fn validate<M: TransportMesh + ?Sized>(&self, mesh: &M) -> Result<()> {
        let layout = mesh.cell_layout();
        let field = self.tcc.layout();
        if field.n_total() != layout.n_total() {
            return Err(TransportError::Synchronization {
                expected: layout.n_total(),
                actual: field.n_total(),
            });
        }
        if field.n_owned != layout.n_owned {
            return Err(TransportError::Synchronization {
                expected: layout.n_owned,
                actual: field.n_owned,
            });
        }
        self.flow.validate(mesh)
    }
}
