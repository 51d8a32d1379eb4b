//! Limited linear reconstruction for second-order upwinding.
//!
//! Each owned cell gets a least-squares gradient fitted to the cell values
//! across its faces, plus prescribed boundary values where a face carries
//! one. The gradient is then scaled with the Barth-Jespersen limiter so that
//! the reconstructed value at every face centroid stays within the range
//! spanned by the cell and its neighbours. Ghost gradients are filled by the
//! communicator.
//!
//! The upwind updaters use [`LinearReconstruction::face_value`] in place of
//! the upwind cell average, which makes them second order in space on smooth
//! fields and first order near extrema.

use crate::error::{Result, TransportError};
use crate::mesh::TransportMesh;
use crate::parallel::Communicator;

/// Relative pivot threshold of the 3x3 normal-equation solve.
const RANK_TOLERANCE: f64 = 1e-12;

/// Per-cell gradients of one scalar field.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGradients {
    axes: [Vec<f64>; 3],
    n_limited: usize,
}

impl CellGradients {
    /// Gradient of a cell (owned or ghost).
    #[inline]
    pub fn get(&self, cell: usize) -> [f64; 3] {
        [self.axes[0][cell], self.axes[1][cell], self.axes[2][cell]]
    }

    /// Owned cells whose gradient the limiter reduced.
    pub fn n_limited(&self) -> usize {
        self.n_limited
    }
}

/// Geometry of the reconstruction, built once per mesh.
#[derive(Clone, Debug)]
pub struct LinearReconstruction {
    cell_centroids: Vec<[f64; 3]>,
    face_centroids: Vec<[f64; 3]>,
    /// CSR offsets into `cell_faces`, one row per owned cell
    offsets: Vec<usize>,
    cell_faces: Vec<usize>,
}

impl LinearReconstruction {
    /// Collect centroids and the faces of every owned cell.
    ///
    /// # Errors
    /// Returns [`TransportError::Config`] if the mesh carries no centroids.
    pub fn new(mesh: &dyn TransportMesh) -> Result<Self> {
        let missing = || {
            TransportError::Config(
                "second-order reconstruction needs cell and face centroids".to_string(),
            )
        };
        let cell_centroids = (0..mesh.n_cells())
            .map(|c| mesh.cell_centroid(c).ok_or_else(missing))
            .collect::<Result<Vec<_>>>()?;
        let face_centroids = (0..mesh.n_faces())
            .map(|f| mesh.face_centroid(f).ok_or_else(missing))
            .collect::<Result<Vec<_>>>()?;

        let n_owned = mesh.n_cells_owned();
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); n_owned];
        for f in 0..mesh.n_faces() {
            for &c in mesh.face_cells(f) {
                if c < n_owned {
                    rows[c].push(f);
                }
            }
        }
        let mut offsets = Vec::with_capacity(n_owned + 1);
        offsets.push(0);
        let mut cell_faces = Vec::new();
        for row in rows {
            cell_faces.extend(row);
            offsets.push(cell_faces.len());
        }

        Ok(Self {
            cell_centroids,
            face_centroids,
            offsets,
            cell_faces,
        })
    }

    fn faces_of(&self, cell: usize) -> &[usize] {
        &self.cell_faces[self.offsets[cell]..self.offsets[cell + 1]]
    }

    /// Limited gradients of `conc` on every cell.
    ///
    /// `conc` must hold exchanged ghost values. `boundary` gives, per face,
    /// the prescribed value on boundary faces that have one; it is ignored on
    /// interior faces.
    pub fn compute(
        &self,
        mesh: &dyn TransportMesh,
        comm: &dyn Communicator,
        conc: &[f64],
        boundary: &[Option<f64>],
    ) -> Result<CellGradients> {
        let layout = mesh.cell_layout();
        TransportError::check_len("reconstructed values", layout.n_total(), conc.len())?;
        TransportError::check_len("boundary values", mesh.n_faces(), boundary.len())?;

        let mut axes = [
            vec![0.0; layout.n_total()],
            vec![0.0; layout.n_total()],
            vec![0.0; layout.n_total()],
        ];
        let mut n_limited = 0;

        for c in 0..layout.n_owned {
            let xc = self.cell_centroids[c];
            let uc = conc[c];
            let (mut u_min, mut u_max) = (uc, uc);
            let mut normal = [[0.0; 3]; 3];
            let mut rhs = [0.0; 3];
            let mut fit = |x: [f64; 3], u: f64| {
                let d = sub(x, xc);
                for i in 0..3 {
                    for j in 0..3 {
                        normal[i][j] += d[i] * d[j];
                    }
                    rhs[i] += d[i] * (u - uc);
                }
                u_min = u_min.min(u);
                u_max = u_max.max(u);
            };

            for &f in self.faces_of(c) {
                let cells = mesh.face_cells(f);
                if cells.len() == 1 {
                    if let Some(value) = boundary[f] {
                        fit(self.face_centroids[f], value);
                    }
                } else {
                    for &n in cells.iter().filter(|&&n| n != c) {
                        fit(self.cell_centroids[n], conc[n]);
                    }
                }
            }

            let grad = solve_normal_equations(normal, rhs);

            // Barth-Jespersen
            let mut phi: f64 = 1.0;
            for &f in self.faces_of(c) {
                let delta = dot(grad, sub(self.face_centroids[f], xc));
                if delta > 0.0 {
                    phi = phi.min((u_max - uc) / delta);
                } else if delta < 0.0 {
                    phi = phi.min((u_min - uc) / delta);
                }
            }
            let phi = phi.max(0.0);
            if phi < 1.0 {
                n_limited += 1;
            }
            for (axis, g) in axes.iter_mut().zip(grad) {
                axis[c] = phi * g;
            }
        }

        for axis in axes.iter_mut() {
            comm.scatter_to_ghosts(layout, axis)?;
        }
        log::trace!(
            "limiter reduced {} of {} gradients",
            n_limited,
            layout.n_owned
        );

        Ok(CellGradients { axes, n_limited })
    }

    /// Reconstructed value of `cell` at the centroid of `face`.
    #[inline]
    pub fn face_value(&self, grads: &CellGradients, conc: &[f64], cell: usize, face: usize) -> f64 {
        let d = sub(self.face_centroids[face], self.cell_centroids[cell]);
        conc[cell] + dot(grads.get(cell), d)
    }
}

#[inline]
fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Gauss-Jordan solve of the symmetric normal equations.
///
/// Directions without data (on 1D and 2D meshes, or around cells with a
/// single collinear neighbourhood) give vanishing pivots; their gradient
/// component is zero.
fn solve_normal_equations(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> [f64; 3] {
    let tol = RANK_TOLERANCE * (a[0][0] + a[1][1] + a[2][2]);
    let mut pivot_rows: [Option<usize>; 3] = [None; 3];
    let mut row = 0;

    for col in 0..3 {
        let Some(p) = (row..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs())) else {
            break;
        };
        if a[p][col].abs() <= tol {
            continue;
        }
        a.swap(row, p);
        b.swap(row, p);

        let inv = 1.0 / a[row][col];
        for v in a[row].iter_mut() {
            *v *= inv;
        }
        b[row] *= inv;

        let pivot = a[row];
        let pivot_b = b[row];
        for i in (0..3).filter(|&i| i != row) {
            let factor = a[i][col];
            if factor != 0.0 {
                for j in 0..3 {
                    a[i][j] -= factor * pivot[j];
                }
                b[i] -= factor * pivot_b;
            }
        }
        pivot_rows[col] = Some(row);
        row += 1;
    }

    let mut x = [0.0; 3];
    for (xi, pr) in x.iter_mut().zip(pivot_rows) {
        if let Some(r) = pr {
            *xi = b[r];
        }
    }
    x
}
