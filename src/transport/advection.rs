//! Upwind advection operator in rate form.
//!
//! Used by the multi-stage updaters, which need `dm/dt` for a given
//! concentration field instead of a complete donor-cell step. The operator
//! handles faces with any number of upwind and downwind cells: the solute
//! leaving the upwind cells of a face is shared among its downwind cells in
//! proportion to their inflow.
//!
//! With a [`LinearReconstruction`](super::LinearReconstruction) in the
//! context, each upwind cell contributes its limited face value instead of
//! its cell average.

use crate::error::Result;
use crate::types::ComponentIndex;

use super::updaters::CycleContext;

/// Floor for the total downwind flux of a face.
pub(crate) const MIN_FLUX_IN: f64 = 1e-12;

/// Advective mass rate of one component.
///
/// `conc` holds concentrations on owned and ghost cells (ghosts already
/// exchanged). On return `rate` holds the mass rate of every owned cell and
/// zero on ghosts. The returned value is the net mass rate entering the
/// owned cells through domain boundary faces.
pub(crate) fn advective_mass_rate(
    ctx: &CycleContext<'_>,
    k: ComponentIndex,
    conc: &[f64],
    rate: &mut [f64],
) -> Result<f64> {
    let layout = ctx.mesh.cell_layout();
    let stencil = ctx.stencil;
    rate.iter_mut().for_each(|r| *r = 0.0);
    let mut boundary_net = 0.0;

    let grads = match ctx.reconstruction {
        Some(rec) => {
            let values = boundary_values(ctx, k);
            Some(rec.compute(ctx.mesh, ctx.comm, conc, &values)?)
        }
        None => None,
    };
    let upwind_value = |cell: usize, face: usize| match (ctx.reconstruction, &grads) {
        (Some(rec), Some(grads)) => rec.face_value(grads, conc, cell, face),
        _ => conc[cell],
    };

    for f in 0..stencil.n_faces() {
        let upwind = stencil.upwind(f);
        if upwind.is_empty() {
            continue;
        }
        let downwind = stencil.downwind(f);

        let tcc_out: f64 = upwind.iter().map(|u| u.flux * upwind_value(u.cell, f)).sum();
        let mut flux_in: f64 = downwind.iter().map(|d| d.flux).sum();
        if flux_in == 0.0 {
            flux_in = MIN_FLUX_IN;
        }

        for u in upwind.iter().filter(|u| layout.is_owned(u.cell)) {
            let out = u.flux * upwind_value(u.cell, f);
            rate[u.cell] -= out;
            if downwind.is_empty() && ctx.mesh.is_boundary_face(f) {
                boundary_net -= out;
            }
        }
        for d in downwind.iter().filter(|d| layout.is_owned(d.cell)) {
            rate[d.cell] += d.flux / flux_in * tcc_out;
        }
    }

    for bc in ctx.boundaries {
        let Some(j) = bc.component_indices().iter().position(|&kk| kk == k) else {
            continue;
        };
        for (i, &f) in bc.faces().iter().enumerate() {
            let value = bc.value(i, j);
            for d in stencil.downwind(f).iter().filter(|d| layout.is_owned(d.cell)) {
                let inflow = d.flux * value;
                rate[d.cell] += inflow;
                boundary_net += inflow;
            }
        }
    }

    Ok(boundary_net)
}

/// Prescribed values of component `k` on every face, `None` where no
/// boundary condition covers it.
fn boundary_values(ctx: &CycleContext<'_>, k: ComponentIndex) -> Vec<Option<f64>> {
    let mut values = vec![None; ctx.mesh.n_faces()];
    for bc in ctx.boundaries {
        let Some(j) = bc.component_indices().iter().position(|&kk| kk == k) else {
            continue;
        };
        for (i, &f) in bc.faces().iter().enumerate() {
            values[f] = Some(bc.value(i, j));
        }
    }
    values
}
