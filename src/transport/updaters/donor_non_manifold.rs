//! First-order donor upwind with flux splitting for non-manifold meshes.

use crate::error::Result;
use crate::source::apply_sources;
use crate::state::ComponentField;
use crate::transport::advection::MIN_FLUX_IN;
use crate::transport::balance::MassBalance;

use super::{to_concentration, to_mass, CycleContext, CycleUpdater};

/// Donor-cell upwind update for faces shared by more than two cells.
///
/// Per face, the solute leaving all upwind cells is pooled and handed to the
/// downwind cells in proportion to their share of the total inflow
/// `flux_in`. When a face has no actual downwind flow, `flux_in` is floored
/// so the split stays finite.
#[derive(Clone, Debug, Default)]
pub struct DonorUpwindNonManifold {
    tcc_out: Vec<f64>,
}

impl DonorUpwindNonManifold {
    /// Create the updater.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CycleUpdater for DonorUpwindNonManifold {
    fn name(&self) -> &'static str {
        "donor-upwind-non-manifold"
    }

    fn advance_one_cycle(
        &mut self,
        ctx: &CycleContext<'_>,
        prev: &mut ComponentField,
        next: &mut ComponentField,
        balance: &mut MassBalance,
    ) -> Result<()> {
        let layout = ctx.mesh.cell_layout();
        let dt = ctx.dt;
        ctx.comm.scatter_field(prev)?;
        to_mass(ctx, prev, next);
        self.tcc_out.resize(ctx.num_advect, 0.0);

        for f in 0..ctx.stencil.n_faces() {
            let upwind = ctx.stencil.upwind(f);
            if upwind.is_empty() {
                continue;
            }
            let downwind = ctx.stencil.downwind(f);

            for (k, out) in ctx.advected().zip(self.tcc_out.iter_mut()) {
                *out = upwind.iter().map(|u| u.flux * prev.get(k, u.cell)).sum();
            }
            let mut flux_in: f64 = downwind.iter().map(|d| d.flux).sum();
            if flux_in == 0.0 {
                flux_in = MIN_FLUX_IN;
            }

            for u in upwind.iter().filter(|u| layout.is_owned(u.cell)) {
                for k in ctx.advected() {
                    let tcc_flux = dt * u.flux * prev.get(k, u.cell);
                    next.component_mut(k)[u.cell] -= tcc_flux;
                    if downwind.is_empty() && ctx.mesh.is_boundary_face(f) {
                        balance.add_boundary(k.get(), -tcc_flux);
                    }
                }
            }

            for d in downwind.iter().filter(|d| layout.is_owned(d.cell)) {
                let share = d.flux / flux_in;
                for (k, out) in ctx.advected().zip(&self.tcc_out) {
                    next.component_mut(k)[d.cell] += dt * share * out;
                }
            }
        }

        for bc in ctx.boundaries {
            for (i, &f) in bc.faces().iter().enumerate() {
                for d in ctx.stencil.downwind(f).iter().filter(|d| layout.is_owned(d.cell)) {
                    for (j, &k) in bc.component_indices().iter().enumerate() {
                        if k.get() < ctx.num_advect {
                            let tcc_flux = dt * d.flux * bc.value(i, j);
                            next.component_mut(k)[d.cell] += tcc_flux;
                            balance.add_boundary(k.get(), tcc_flux);
                        }
                    }
                }
            }
        }

        let totals = apply_sources(ctx.sources, dt, next, 0..ctx.num_advect);
        balance.add_source(&totals, dt);

        to_concentration(ctx, next);
        Ok(())
    }
}
