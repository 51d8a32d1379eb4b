//! Flow fields supplied by the coupled flow solver.
//!
//! The transport engine only reads these: a face flux snapshot, porosity and
//! the water saturation at the start and end of the flow interval.

use crate::error::{Result, TransportError};
use crate::mesh::TransportMesh;

/// Per-face volumetric fluxes, one partial flux per adjacent cell.
///
/// Each partial flux is signed outward-positive relative to its cell, so on
/// a manifold interior face the two entries are `[q, -q]`. Non-manifold
/// faces carry one entry per adjacent cell; the entries of a conservative
/// face sum to zero.
#[derive(Clone, Debug, PartialEq)]
pub struct FluxSnapshot {
    offsets: Vec<usize>,
    values: Vec<f64>,
}

impl FluxSnapshot {
    /// Build from one signed flux per face.
    ///
    /// Interior faces are oriented from their first cell to their second;
    /// boundary faces are oriented out of the domain. Non-manifold faces are
    /// rejected because a single value cannot describe their split.
    pub fn from_face_fluxes<M: TransportMesh + ?Sized>(mesh: &M, flux: &[f64]) -> Result<Self> {
        TransportError::check_len("face fluxes", mesh.n_faces(), flux.len())?;

        let mut offsets = Vec::with_capacity(flux.len() + 1);
        let mut values = Vec::with_capacity(2 * flux.len());
        offsets.push(0);
        for (f, &q) in flux.iter().enumerate() {
            match mesh.face_cells(f).len() {
                1 => values.push(q),
                2 => values.extend_from_slice(&[q, -q]),
                n => {
                    return Err(TransportError::Config(format!(
                        "face {} borders {} cells and needs partial fluxes",
                        f, n
                    )))
                }
            }
            offsets.push(values.len());
        }
        Ok(Self { offsets, values })
    }

    /// Build from explicit partial fluxes, one list per face matching
    /// [`TransportMesh::face_cells`].
    pub fn from_partial_fluxes<M: TransportMesh + ?Sized>(
        mesh: &M,
        partial: Vec<Vec<f64>>,
    ) -> Result<Self> {
        TransportError::check_len("face flux lists", mesh.n_faces(), partial.len())?;

        let mut offsets = Vec::with_capacity(partial.len() + 1);
        let mut values = Vec::new();
        offsets.push(0);
        for (f, fluxes) in partial.iter().enumerate() {
            TransportError::check_len(
                "partial fluxes of a face",
                mesh.face_cells(f).len(),
                fluxes.len(),
            )?;
            values.extend_from_slice(fluxes);
            offsets.push(values.len());
        }
        Ok(Self { offsets, values })
    }

    /// Number of faces.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Partial fluxes of a face, aligned with the face's adjacent cells.
    #[inline]
    pub fn face(&self, face: usize) -> &[f64] {
        &self.values[self.offsets[face]..self.offsets[face + 1]]
    }

    /// Multiply every flux by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.values {
            *v *= factor;
        }
    }
}

/// Times bracketing the flow interval the saturation pair belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowInterval {
    /// Time of `ws_prev`.
    pub t_initial: f64,
    /// Time at which the current transport step begins.
    pub t_intermediate: f64,
    /// Time of `ws`.
    pub t_final: f64,
}

/// Flux, porosity and saturation seen by one transport macro step.
#[derive(Clone, Debug)]
pub struct FlowFields {
    /// Face flux snapshot.
    pub flux: FluxSnapshot,
    /// Porosity of every cell (owned and ghost).
    pub porosity: Vec<f64>,
    /// Water saturation at the start of the flow interval.
    pub ws_prev: Vec<f64>,
    /// Water saturation at the end of the flow interval.
    pub ws: Vec<f64>,
    /// Flow interval, when transport sub-steps a longer flow step.
    pub interval: Option<FlowInterval>,
}

impl FlowFields {
    /// Create flow fields with distinct start and end saturations.
    pub fn new(flux: FluxSnapshot, porosity: Vec<f64>, ws_prev: Vec<f64>, ws: Vec<f64>) -> Self {
        Self {
            flux,
            porosity,
            ws_prev,
            ws,
            interval: None,
        }
    }

    /// Create flow fields with a saturation that does not change in time.
    pub fn steady(flux: FluxSnapshot, porosity: Vec<f64>, ws: Vec<f64>) -> Self {
        Self::new(flux, porosity, ws.clone(), ws)
    }

    /// Register the flow interval the saturation pair spans.
    pub fn with_interval(mut self, t_initial: f64, t_intermediate: f64, t_final: f64) -> Self {
        self.interval = Some(FlowInterval {
            t_initial,
            t_intermediate,
            t_final,
        });
        self
    }

    /// Check all sizes against the mesh.
    pub fn validate<M: TransportMesh + ?Sized>(&self, mesh: &M) -> Result<()> {
        let n = mesh.n_cells();
        TransportError::check_len("face fluxes", mesh.n_faces(), self.flux.n_faces())?;
        TransportError::check_len("porosity", n, self.porosity.len())?;
        TransportError::check_len("previous saturation", n, self.ws_prev.len())?;
        TransportError::check_len("saturation", n, self.ws.len())?;
        if let Some(interval) = self.interval {
            if !(interval.t_final > interval.t_initial) {
                return Err(TransportError::Config(format!(
                    "flow interval [{}, {}] is empty",
                    interval.t_initial, interval.t_final
                )));
            }
        }
        Ok(())
    }
}
