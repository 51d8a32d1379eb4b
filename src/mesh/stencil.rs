//! Upwind/downwind stencil derived from a flux snapshot.

use crate::error::{Result, TransportError};
use crate::state::FluxSnapshot;

use super::traits::TransportMesh;

/// A cell attached to a face together with the magnitude of its partial flux.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilEntry {
    /// Cell index (owned or ghost).
    pub cell: usize,
    /// Magnitude of the partial flux through the face.
    pub flux: f64,
}

/// Per-face upwind and downwind cell lists.
///
/// A cell whose outward partial flux is positive is upwind of the face; a
/// negative partial flux makes it downwind. Zero partial fluxes are dropped,
/// so inflow boundary faces have no upwind cell and outflow boundary faces
/// have no downwind cell.
#[derive(Clone, Debug, Default)]
pub struct UpwindStencil {
    up_offsets: Vec<usize>,
    upwind: Vec<StencilEntry>,
    down_offsets: Vec<usize>,
    downwind: Vec<StencilEntry>,
}

impl UpwindStencil {
    /// Classify the cells of every face by the sign of their partial flux.
    pub fn build<M: TransportMesh + ?Sized>(mesh: &M, flux: &FluxSnapshot) -> Result<Self> {
        TransportError::check_len("face fluxes", mesh.n_faces(), flux.n_faces())?;

        let n_faces = mesh.n_faces();
        let mut stencil = Self {
            up_offsets: Vec::with_capacity(n_faces + 1),
            upwind: Vec::with_capacity(n_faces),
            down_offsets: Vec::with_capacity(n_faces + 1),
            downwind: Vec::with_capacity(n_faces),
        };
        stencil.up_offsets.push(0);
        stencil.down_offsets.push(0);

        for f in 0..n_faces {
            let cells = mesh.face_cells(f);
            let partial = flux.face(f);
            TransportError::check_len("partial fluxes of a face", cells.len(), partial.len())?;

            for (&cell, &q) in cells.iter().zip(partial) {
                if q > 0.0 {
                    stencil.upwind.push(StencilEntry { cell, flux: q });
                } else if q < 0.0 {
                    stencil.downwind.push(StencilEntry { cell, flux: -q });
                }
            }
            stencil.up_offsets.push(stencil.upwind.len());
            stencil.down_offsets.push(stencil.downwind.len());
        }
        Ok(stencil)
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.up_offsets.len().saturating_sub(1)
    }

    /// Upwind cells of a face.
    #[inline]
    pub fn upwind(&self, face: usize) -> &[StencilEntry] {
        &self.upwind[self.up_offsets[face]..self.up_offsets[face + 1]]
    }

    /// Downwind cells of a face.
    #[inline]
    pub fn downwind(&self, face: usize) -> &[StencilEntry] {
        &self.downwind[self.down_offsets[face]..self.down_offsets[face + 1]]
    }

    /// Total outflow magnitude of every cell (owned and ghost).
    pub fn cell_outflux(&self, n_cells: usize) -> Vec<f64> {
        let mut outflux = vec![0.0; n_cells];
        for entry in &self.upwind {
            outflux[entry.cell] += entry.flux;
        }
        outflux
    }
}
