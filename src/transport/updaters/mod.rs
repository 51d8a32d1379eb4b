//! Single-cycle update rules.
//!
//! Each updater advances the advected (aqueous) components by one sub-cycle
//! of fixed length. The rule is chosen once from [`UpdaterKind`] and then
//! driven through the [`CycleUpdater`] trait, so the controller never
//! branches on the discretization.
//!
//! | Updater | Mesh | Order |
//! |---------|------|-------|
//! | [`DonorUpwind`] | manifold | 1st in space and time |
//! | [`DonorUpwindNonManifold`] | non-manifold | 1st in space and time |
//! | [`PredictorCorrector`] | manifold | 2nd in space and time |
//! | [`GenericRungeKutta`] | any | 2nd in space, 1st to 4th in time |
//!
//! The second-order updaters take face values from the limited linear
//! reconstruction in [`CycleContext::reconstruction`].

mod donor;
mod donor_non_manifold;
mod generic_rk;
mod predictor_corrector;

pub use donor::DonorUpwind;
pub use donor_non_manifold::DonorUpwindNonManifold;
pub use generic_rk::GenericRungeKutta;
pub use predictor_corrector::PredictorCorrector;

use crate::boundary::TransportBoundary;
use crate::config::UpdaterKind;
use crate::error::Result;
use crate::mesh::{TransportMesh, UpwindStencil};
use crate::parallel::Communicator;
use crate::source::TransportSource;
use crate::state::ComponentField;
use crate::types::ComponentIndex;

use super::balance::MassBalance;
use super::reconstruction::LinearReconstruction;

/// Everything an updater reads during one sub-cycle.
pub struct CycleContext<'a> {
    /// Mesh of this partition.
    pub mesh: &'a dyn TransportMesh,
    /// Ghost exchange and reductions.
    pub comm: &'a dyn Communicator,
    /// Upwind/downwind cells of every face.
    pub stencil: &'a UpwindStencil,
    /// Porosity of every cell.
    pub porosity: &'a [f64],
    /// Saturation at the start of the sub-cycle.
    pub ws_start: &'a [f64],
    /// Saturation at the end of the sub-cycle.
    pub ws_end: &'a [f64],
    /// Boundary conditions, already evaluated for this sub-cycle.
    pub boundaries: &'a [Box<dyn TransportBoundary>],
    /// Sources, already evaluated for this sub-cycle.
    pub sources: &'a [Box<dyn TransportSource>],
    /// Limited reconstruction for second-order face values; `None` gives
    /// first-order upwinding.
    pub reconstruction: Option<&'a LinearReconstruction>,
    /// Number of advected components (a prefix of the component ordering).
    pub num_advect: usize,
    /// Physical time at the start of the sub-cycle.
    pub t_start: f64,
    /// Sub-cycle length.
    pub dt: f64,
}

impl CycleContext<'_> {
    /// `volume × porosity × saturation` of a cell.
    #[inline]
    pub fn pore_volume(&self, cell: usize, ws: &[f64]) -> f64 {
        self.mesh.cell_volume(cell) * self.porosity[cell] * ws[cell]
    }

    /// Advected component indices.
    #[inline]
    pub fn advected(&self) -> impl Iterator<Item = ComponentIndex> {
        ComponentIndex::iter(self.num_advect)
    }

    /// Source rates of the advected components on owned cells.
    ///
    /// Returns the per-cell rates and the per-component totals.
    pub(crate) fn source_rates(&self, template: &ComponentField) -> (ComponentField, Vec<f64>) {
        let mut rates = ComponentField::new(template.layout(), template.n_components());
        let totals = crate::source::apply_sources(self.sources, 1.0, &mut rates, 0..self.num_advect);
        (rates, totals)
    }
}

/// One sub-cycle of an explicit transport scheme.
pub trait CycleUpdater: Send {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Advance the advected components of `prev` by `ctx.dt` into `next`.
    ///
    /// `prev` holds concentrations at the start of the sub-cycle; its ghost
    /// entries are refreshed by the updater. On return the owned entries of
    /// the advected components of `next` hold the new concentrations.
    /// Source and boundary mass is booked in `balance`.
    fn advance_one_cycle(
        &mut self,
        ctx: &CycleContext<'_>,
        prev: &mut ComponentField,
        next: &mut ComponentField,
        balance: &mut MassBalance,
    ) -> Result<()>;
}

/// Create the updater for a selected kind.
pub fn build_updater(kind: UpdaterKind) -> Box<dyn CycleUpdater> {
    match kind {
        UpdaterKind::DonorUpwind => Box::new(DonorUpwind::new()),
        UpdaterKind::DonorUpwindNonManifold => Box::new(DonorUpwindNonManifold::new()),
        UpdaterKind::PredictorCorrector => Box::new(PredictorCorrector::new()),
        UpdaterKind::GenericRungeKutta(method) => Box::new(GenericRungeKutta::new(method)),
    }
}

/// Convert owned concentrations of the advected components to stored mass.
pub(crate) fn to_mass(ctx: &CycleContext<'_>, conc: &ComponentField, mass: &mut ComponentField) {
    let n_owned = ctx.mesh.n_cells_owned();
    for k in ctx.advected() {
        let c_in = conc.component(k);
        let m_out = mass.component_mut(k);
        for c in 0..n_owned {
            m_out[c] = c_in[c] * ctx.pore_volume(c, ctx.ws_start);
        }
    }
}

/// Convert owned stored mass of the advected components back to concentration.
pub(crate) fn to_concentration(ctx: &CycleContext<'_>, field: &mut ComponentField) {
    let n_owned = ctx.mesh.n_cells_owned();
    for k in ctx.advected() {
        let values = field.component_mut(k);
        for c in 0..n_owned {
            values[c] /= ctx.pore_volume(c, ctx.ws_end);
        }
    }
}

/// Zero the ghost entries of the advected components.
pub(crate) fn clear_ghosts(ctx: &CycleContext<'_>, field: &mut ComponentField) {
    let n_owned = ctx.mesh.n_cells_owned();
    for k in ctx.advected() {
        field.component_mut(k)[n_owned..].iter_mut().for_each(|v| *v = 0.0);
    }
}
