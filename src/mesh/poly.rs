//! General polyhedral mesh described by its face-to-cell adjacency.

use crate::error::{Result, TransportError};
use crate::types::CellLayout;

use super::traits::TransportMesh;

/// Unstructured mesh given as cell volumes plus face adjacency lists.
///
/// Areas and normals are not stored: the engine works with volumetric face
/// fluxes, so they are already folded into the flux field. Centroids are
/// optional and only needed for second-order reconstruction.
#[derive(Clone, Debug)]
pub struct PolyMesh {
    layout: CellLayout,
    volumes: Vec<f64>,
    /// CSR offsets into `adjacency`, length `n_faces + 1`
    offsets: Vec<usize>,
    adjacency: Vec<usize>,
    n_faces_owned: usize,
    manifold: bool,
    centroids: Option<Centroids>,
}

#[derive(Clone, Debug)]
struct Centroids {
    cells: Vec<[f64; 3]>,
    faces: Vec<[f64; 3]>,
}

impl PolyMesh {
    /// Create a mesh from explicit adjacency.
    ///
    /// # Arguments
    /// * `layout` - Owned/ghost split of the cells
    /// * `volumes` - Volume of every cell, owned and ghost
    /// * `face_cells` - Adjacent cells of every face, owned faces first
    /// * `n_faces_owned` - Number of owned faces
    pub fn new(
        layout: CellLayout,
        volumes: Vec<f64>,
        face_cells: Vec<Vec<usize>>,
        n_faces_owned: usize,
    ) -> Result<Self> {
        TransportError::check_len("cell volumes", layout.n_total(), volumes.len())?;
        if n_faces_owned > face_cells.len() {
            return Err(TransportError::dimension(
                "owned faces",
                face_cells.len(),
                n_faces_owned,
            ));
        }
        if let Some(c) = volumes.iter().position(|v| !(*v > 0.0) || !v.is_finite()) {
            return Err(TransportError::Config(format!(
                "cell {} has non-positive volume {}",
                c, volumes[c]
            )));
        }

        let mut offsets = Vec::with_capacity(face_cells.len() + 1);
        let mut adjacency = Vec::new();
        let mut manifold = true;
        offsets.push(0);

        for (f, cells) in face_cells.iter().enumerate() {
            if cells.is_empty() {
                return Err(TransportError::Config(format!("face {} has no cells", f)));
            }
            if let Some(&c) = cells.iter().find(|&&c| c >= layout.n_total()) {
                return Err(TransportError::Config(format!(
                    "face {} references cell {} outside the {} mesh cells",
                    f,
                    c,
                    layout.n_total()
                )));
            }
            manifold &= cells.len() <= 2;
            adjacency.extend_from_slice(cells);
            offsets.push(adjacency.len());
        }

        Ok(Self {
            layout,
            volumes,
            offsets,
            adjacency,
            n_faces_owned,
            manifold,
            centroids: None,
        })
    }

    /// Attach cell and face centroids, one per cell and face including ghosts.
    pub fn with_centroids(mut self, cells: Vec<[f64; 3]>, faces: Vec<[f64; 3]>) -> Result<Self> {
        TransportError::check_len("cell centroids", self.layout.n_total(), cells.len())?;
        TransportError::check_len("face centroids", self.n_faces(), faces.len())?;
        let finite = |p: &[f64; 3]| p.iter().all(|x| x.is_finite());
        if let Some(c) = cells.iter().position(|p| !finite(p)) {
            return Err(TransportError::Config(format!(
                "cell {} has a non-finite centroid",
                c
            )));
        }
        if let Some(f) = faces.iter().position(|p| !finite(p)) {
            return Err(TransportError::Config(format!(
                "face {} has a non-finite centroid",
                f
            )));
        }
        self.centroids = Some(Centroids { cells, faces });
        Ok(self)
    }

    /// Whether centroids are attached.
    pub fn has_centroids(&self) -> bool {
        self.centroids.is_some()
    }

    /// Create a uniform 1D column of `n_cells` cells.
    ///
    /// Face 0 is the left boundary, face `i` (1..n) joins cells `i-1` and
    /// `i`, face `n` is the right boundary. Positive interior flux points to
    /// the right.
    pub fn uniform_1d(n_cells: usize, length: f64, area: f64) -> Self {
        assert!(n_cells > 0, "Need at least one cell");
        assert!(length > 0.0 && area > 0.0, "Length and area must be positive");

        let volume = length / n_cells as f64 * area;
        let mut face_cells = Vec::with_capacity(n_cells + 1);
        face_cells.push(vec![0]);
        for i in 1..n_cells {
            face_cells.push(vec![i - 1, i]);
        }
        face_cells.push(vec![n_cells - 1]);

        let h = length / n_cells as f64;
        let mut mesh =
            Self::from_parts(CellLayout::serial(n_cells), vec![volume; n_cells], face_cells);
        mesh.centroids = Some(Centroids {
            cells: (0..n_cells).map(|i| [(i as f64 + 0.5) * h, 0.0, 0.0]).collect(),
            faces: (0..=n_cells).map(|i| [i as f64 * h, 0.0, 0.0]).collect(),
        });
        mesh
    }

    /// Create a periodic 1D ring of `n_cells` owned cells with two ghost cells.
    ///
    /// Ghost `n_cells` is the image of cell 0 and ghost `n_cells + 1` the
    /// image of cell `n_cells - 1`. Owned faces `0..n_cells` join cell `i`
    /// to its right neighbour (the last one to the image of cell 0); the
    /// single ghost face joins the image of the last cell to cell 0.
    ///
    /// Ghost centroids sit where the images lie along the axis, just past
    /// either end of the ring.
    pub fn periodic_1d(n_cells: usize, length: f64, area: f64) -> Self {
        assert!(n_cells > 1, "Need at least two cells");
        assert!(length > 0.0 && area > 0.0, "Length and area must be positive");

        let volume = length / n_cells as f64 * area;
        let mut face_cells: Vec<Vec<usize>> = (0..n_cells - 1).map(|i| vec![i, i + 1]).collect();
        face_cells.push(vec![n_cells - 1, n_cells]);
        face_cells.push(vec![n_cells + 1, 0]);

        let mut mesh = Self::from_parts(
            CellLayout::new(n_cells, 2),
            vec![volume; n_cells + 2],
            face_cells,
        );
        mesh.n_faces_owned = n_cells;

        let h = length / n_cells as f64;
        let mut cells: Vec<[f64; 3]> =
            (0..=n_cells).map(|i| [(i as f64 + 0.5) * h, 0.0, 0.0]).collect();
        cells.push([-0.5 * h, 0.0, 0.0]);
        let mut faces: Vec<[f64; 3]> =
            (0..n_cells).map(|i| [(i as f64 + 1.0) * h, 0.0, 0.0]).collect();
        faces.push([0.0; 3]);
        mesh.centroids = Some(Centroids { cells, faces });
        mesh
    }

    fn from_parts(layout: CellLayout, volumes: Vec<f64>, face_cells: Vec<Vec<usize>>) -> Self {
        let mut offsets = vec![0];
        let mut adjacency = Vec::new();
        for cells in &face_cells {
            adjacency.extend_from_slice(cells);
            offsets.push(adjacency.len());
        }
        Self {
            layout,
            volumes,
            offsets,
            adjacency,
            n_faces_owned: face_cells.len(),
            manifold: face_cells.iter().all(|c| c.len() <= 2),
            centroids: None,
        }
    }

    /// All cell volumes.
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }
}

impl TransportMesh for PolyMesh {
    fn cell_layout(&self) -> CellLayout {
        self.layout
    }

    fn n_faces_owned(&self) -> usize {
        self.n_faces_owned
    }

    fn n_faces(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    fn cell_volume(&self, cell: usize) -> f64 {
        self.volumes[cell]
    }

    #[inline]
    fn face_cells(&self, face: usize) -> &[usize] {
        &self.adjacency[self.offsets[face]..self.offsets[face + 1]]
    }

    fn is_manifold(&self) -> bool {
        self.manifold
    }

    fn cell_centroid(&self, cell: usize) -> Option<[f64; 3]> {
        self.centroids.as_ref().map(|g| g.cells[cell])
    }

    fn face_centroid(&self, face: usize) -> Option<[f64; 3]> {
        self.centroids.as_ref().map(|g| g.faces[face])
    }
}
