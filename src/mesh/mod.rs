//! Mesh representation.
//!
//! Provides the mesh data needed by finite-volume transport:
//! - [`TransportMesh`]: the mesh contract (volumes, face adjacency, ghost layout)
//! - [`PolyMesh`]: unstructured manifold or non-manifold mesh with ghost cells
//! - [`UpwindStencil`]: upwind/downwind cells of each face for a flux snapshot

mod poly;
mod stencil;
mod traits;

pub use poly::PolyMesh;
pub use stencil::{StencilEntry, UpwindStencil};
pub use traits::TransportMesh;
