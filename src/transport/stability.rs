//! Stable explicit time step for donor-cell advection.
//!
//! A donor-cell update keeps every cell's mass non-negative as long as the
//! mass leaving a cell in one step does not exceed the mass stored in it:
//!
//! ```text
//! dt * sum(outflow fluxes of c) * c_c <= V_c * phi_c * ws_c * c_c
//! ```
//!
//! The saturation used is the smaller of the two interval snapshots so the
//! bound also holds for any saturation interpolated between them.

use crate::error::{Result, TransportError};
use crate::mesh::{TransportMesh, UpwindStencil};
use crate::parallel::Communicator;
use crate::state::FlowFields;
use crate::types::CellIndex;

/// Step returned when no owned cell has outflow.
pub const LARGE_TIME_STEP: f64 = 1e99;

/// Result of the stable-step estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StableStep {
    /// Largest stable sub-step, after the CFL factor and global reduction.
    pub dt: f64,
    /// Local owned cell limiting the step, if any cell has outflow.
    pub limiting_cell: Option<CellIndex>,
}

/// Estimate the largest stable donor-cell step.
///
/// # Errors
/// Returns [`TransportError::Stability`] if an owned cell has a non-positive
/// or non-finite pore volume, or if the reduced step is not positive.
pub fn estimate_stable_step(
    mesh: &dyn TransportMesh,
    stencil: &UpwindStencil,
    flow: &FlowFields,
    cfl: f64,
    comm: &dyn Communicator,
) -> Result<StableStep> {
    let outflux = stencil.cell_outflux(mesh.n_cells());

    let cell_step = |c: usize| -> Result<f64> {
        let (ws_prev, ws_next) = (flow.ws_prev[c], flow.ws[c]);
        if !ws_prev.is_finite() || !ws_next.is_finite() {
            return Err(TransportError::stability(
                0.0,
                format!("cell {} has saturation {:e} -> {:e}", c, ws_prev, ws_next),
            ));
        }
        let pore_volume = mesh.cell_volume(c) * flow.porosity[c] * ws_prev.min(ws_next);
        if !(pore_volume > 0.0) || !pore_volume.is_finite() {
            return Err(TransportError::stability(
                0.0,
                format!("cell {} has pore volume {:e}", c, pore_volume),
            ));
        }
        if outflux[c] > 0.0 {
            Ok(pore_volume / outflux[c])
        } else {
            Ok(LARGE_TIME_STEP)
        }
    };

    let (dt_local, cell) = min_cell_step(mesh.n_cells_owned(), cell_step)?;
    let limiting_cell = cell
        .filter(|_| dt_local < LARGE_TIME_STEP)
        .map(CellIndex::new);

    let dt = comm.min_all((cfl * dt_local).min(LARGE_TIME_STEP));
    if !(dt > 0.0) || !dt.is_finite() {
        return Err(TransportError::stability(dt, "stable time step is not positive"));
    }

    log::trace!(
        "stable step {:e} limited by cell {:?}",
        dt,
        limiting_cell
    );
    Ok(StableStep { dt, limiting_cell })
}

/// Smallest cell step; ties go to the lower cell index.
#[inline]
fn pick(a: (f64, Option<usize>), b: (f64, Option<usize>)) -> (f64, Option<usize>) {
    if b.0 < a.0 || (b.0 == a.0 && b.1 < a.1 && b.1.is_some()) {
        b
    } else {
        a
    }
}

#[cfg(not(feature = "parallel"))]
fn min_cell_step<F>(n_owned: usize, cell_step: F) -> Result<(f64, Option<usize>)>
where
    F: Fn(usize) -> Result<f64>,
{
    (0..n_owned).try_fold((LARGE_TIME_STEP, None), |best, c| {
        Ok(pick(best, (cell_step(c)?, Some(c))))
    })
}

#[cfg(feature = "parallel")]
fn min_cell_step<F>(n_owned: usize, cell_step: F) -> Result<(f64, Option<usize>)>
where
    F: Fn(usize) -> Result<f64> + Sync,
{
    use rayon::prelude::*;

    (0..n_owned)
        .into_par_iter()
        .map(|c| cell_step(c).map(|dt| (dt, Some(c))))
        .try_reduce(|| (LARGE_TIME_STEP, None), |a, b| Ok(pick(a, b)))
}
