//! Mesh contract required by the transport engine.
//!
//! The engine never inspects vertices or face normals. It only needs cell
//! volumes, the cells adjacent to each face, and the owned/ghost split of a
//! partition. Faces may border more than two cells on non-manifold meshes
//! (fracture intersections).
//!
//! Cell and face centroids are optional. Only the second-order limited
//! reconstruction needs them; first-order updaters run without geometry.
//!
//! # Example
//! ```ignore
//! use porous_transport::mesh::TransportMesh;
//!
//! fn pore_volume<M: TransportMesh + ?Sized>(mesh: &M, porosity: &[f64]) -> f64 {
//!     (0..mesh.n_cells_owned())
//!         .map(|c| mesh.cell_volume(c) * porosity[c])
//!         .sum()
//! }
//! ```

use crate::types::CellLayout;

/// Topology and geometry queries used by the transport engine.
///
/// Cell numbering follows [`CellLayout`]: owned cells first, ghosts appended.
/// Face numbering likewise puts owned faces first; faces with index
/// `>= n_faces_owned()` are ghost faces whose flux is needed to complete
/// stencils of owned cells.
pub trait TransportMesh: Send + Sync {
    /// Owned/ghost split of the cell numbering.
    fn cell_layout(&self) -> CellLayout;

    /// Number of faces owned by this partition.
    fn n_faces_owned(&self) -> usize;

    /// Number of faces including ghost faces.
    fn n_faces(&self) -> usize;

    /// Volume of a cell (owned or ghost).
    fn cell_volume(&self, cell: usize) -> f64;

    /// Cells adjacent to a face.
    ///
    /// For manifold interior faces this is `[first, second]`, with the flux
    /// orientation pointing from `first` to `second`. Boundary faces list a
    /// single cell. Non-manifold faces may list more than two cells.
    fn face_cells(&self, face: usize) -> &[usize];

    /// Whether every face borders at most two cells.
    fn is_manifold(&self) -> bool;

    /// Centroid of a cell, if the mesh carries geometry.
    fn cell_centroid(&self, _cell: usize) -> Option<[f64; 3]> {
        None
    }

    /// Centroid of a face, if the mesh carries geometry.
    fn face_centroid(&self, _face: usize) -> Option<[f64; 3]> {
        None
    }

    /// Number of owned cells.
    #[inline]
    fn n_cells_owned(&self) -> usize {
        self.cell_layout().n_owned
    }

    /// Number of cells including ghosts.
    #[inline]
    fn n_cells(&self) -> usize {
        self.cell_layout().n_total()
    }

    /// Whether a face lies on the domain boundary (borders a single cell).
    #[inline]
    fn is_boundary_face(&self, face: usize) -> bool {
        self.face_cells(face).len() == 1
    }
}
