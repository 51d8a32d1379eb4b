//! The explicit transport process kernel.
//!
//! [`ExplicitTransport`] advances the concentrations of a [`TransportState`]
//! over a macro step `[t_old, t_new]`:
//!
//! 1. build the upwind stencil from the flux snapshot and estimate the stable step
//! 2. walk the macro step with a [`SubcycleController`], interpolating the
//!    saturation between its snapshots when the flow interval is longer than
//!    the stable step
//! 3. per sub-cycle, evaluate boundaries at the midpoint and sources at the
//!    end, run the selected [`CycleUpdater`], then the optional multiscale
//!    exchange and internal checks
//! 4. run the optional dispersion solve and commit
//!
//! All work happens on private buffers. The state and the mass balance are
//! written only once the whole macro step succeeded; a failed step leaves
//! them untouched.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use porous_transport::config::TransportConfig;
//! use porous_transport::mesh::PolyMesh;
//! use porous_transport::state::{ComponentField, FlowFields, FluxSnapshot, TransportState};
//! use porous_transport::transport::ExplicitTransport;
//! use porous_transport::types::CellLayout;
//!
//! let mesh = PolyMesh::uniform_1d(4, 4.0, 1.0);
//! let flux = FluxSnapshot::from_face_fluxes(&mesh, &[0.0, 0.5, 0.5, 0.5, 0.0]).unwrap();
//! let flow = FlowFields::steady(flux, vec![0.5; 4], vec![1.0; 4]);
//! let tcc = ComponentField::from_components(CellLayout::serial(4), vec![vec![1.0, 0.0, 0.0, 0.0]]).unwrap();
//! let mut state = TransportState::new(tcc, flow);
//!
//! let mut transport = ExplicitTransport::new(TransportConfig::default(), Arc::new(mesh)).unwrap();
//! let report = transport.advance_step(&mut state, 0.0, 3.0).unwrap();
//!
//! assert_eq!(report.n_subcycles, 3);
//! assert_eq!(transport.stable_time_step(), Some(1.0));
//! ```

use std::mem;
use std::sync::Arc;

use crate::boundary::TransportBoundary;
use crate::config::{TransportConfig, UpdaterKind};
use crate::error::{Result, TransportError};
use crate::mesh::{TransportMesh, UpwindStencil};
use crate::parallel::{Communicator, SerialCommunicator};
use crate::source::TransportSource;
use crate::state::{ComponentField, FlowFields, TransportState};
use crate::time::interpolate_cell_vector;

use super::balance::MassBalance;
use super::checks::{check_non_negative, report_fault};
use super::diagnostics::solute_extrema;
use super::dispersion::DispersionSolver;
use super::multiscale::MultiscaleExchange;
use super::reconstruction::LinearReconstruction;
use super::stability::{self, StableStep};
use super::subcycle::{ControllerPhase, SubcycleController};
use super::updaters::{build_updater, CycleContext, CycleUpdater};

/// Outcome of one macro step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Number of sub-cycles taken.
    pub n_subcycles: usize,
    /// Stable sub-step the macro step was walked with.
    pub dt_stable: f64,
    /// Length of the macro step.
    pub dt_mpc: f64,
    /// Physical time reached.
    pub final_time: f64,
}

/// Explicit sub-cycled advection of multi-component solutes.
pub struct ExplicitTransport {
    config: TransportConfig,
    mesh: Arc<dyn TransportMesh>,
    comm: Box<dyn Communicator>,
    kind: UpdaterKind,
    updater: Box<dyn CycleUpdater>,
    reconstruction: Option<LinearReconstruction>,
    boundaries: Vec<Box<dyn TransportBoundary>>,
    sources: Vec<Box<dyn TransportSource>>,
    multiscale: Option<Box<dyn MultiscaleExchange>>,
    dispersion: Option<Box<dyn DispersionSolver>>,
    balance: MassBalance,
    last_report: Option<StepReport>,
}

impl ExplicitTransport {
    /// Create the kernel for a mesh.
    ///
    /// The updater is selected here, once, from the configuration and the
    /// manifold-ness of the mesh. Spatial order 2 also builds the limited
    /// reconstruction, which needs mesh centroids.
    ///
    /// # Errors
    /// Returns [`TransportError::Config`] for invalid configurations and for
    /// second-order runs on meshes without centroids.
    pub fn new(config: TransportConfig, mesh: Arc<dyn TransportMesh>) -> Result<Self> {
        let kind = UpdaterKind::select(&config, mesh.is_manifold())?;
        let updater = build_updater(kind);
        let reconstruction = if config.spatial_order == 2 {
            Some(LinearReconstruction::new(mesh.as_ref())?)
        } else {
            None
        };
        log::debug!(
            "transport setup: updater={}, components={}+{}, cells={}+{}",
            updater.name(),
            config.num_aqueous,
            config.num_gaseous,
            mesh.n_cells_owned(),
            mesh.cell_layout().n_ghost
        );

        Ok(Self {
            balance: MassBalance::new(config.n_components()),
            config,
            mesh,
            comm: Box::new(SerialCommunicator),
            kind,
            updater,
            reconstruction,
            boundaries: Vec::new(),
            sources: Vec::new(),
            multiscale: None,
            dispersion: None,
            last_report: None,
        })
    }

    /// Use a communicator other than the serial one.
    pub fn with_communicator(mut self, comm: impl Communicator + 'static) -> Self {
        self.comm = Box::new(comm);
        self
    }

    /// Install a multiscale exchange model.
    pub fn with_multiscale(mut self, model: impl MultiscaleExchange + 'static) -> Self {
        self.multiscale = Some(Box::new(model));
        self
    }

    /// Install a dispersion solver.
    pub fn with_dispersion(mut self, solver: impl DispersionSolver + 'static) -> Self {
        self.dispersion = Some(Box::new(solver));
        self
    }

    /// Register a boundary condition.
    pub fn add_boundary(&mut self, bc: impl TransportBoundary + 'static) -> Result<()> {
        bc.validate(self.mesh.as_ref(), self.config.n_components())?;
        self.boundaries.push(Box::new(bc));
        Ok(())
    }

    /// Register a source.
    pub fn add_source(&mut self, source: impl TransportSource + 'static) -> Result<()> {
        source.validate(self.mesh.as_ref(), self.config.n_components())?;
        self.sources.push(Box::new(source));
        Ok(())
    }

    /// Configuration in use.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Selected single-cycle update rule.
    pub fn updater_kind(&self) -> UpdaterKind {
        self.kind
    }

    /// Sub-cycles taken by the last successful macro step.
    pub fn num_subcycles(&self) -> usize {
        self.last_report.map_or(0, |r| r.n_subcycles)
    }

    /// Stable sub-step of the last successful macro step.
    pub fn stable_time_step(&self) -> Option<f64> {
        self.last_report.map(|r| r.dt_stable)
    }

    /// Report of the last successful macro step.
    pub fn last_report(&self) -> Option<StepReport> {
        self.last_report
    }

    /// Accumulated source and boundary mass.
    pub fn mass_balance(&self) -> &MassBalance {
        &self.balance
    }

    /// Clear the accumulated mass balance.
    pub fn reset_mass_balance(&mut self) {
        self.balance.reset();
    }

    /// Stable sub-step for a set of flow fields.
    pub fn estimate_stable_step(&self, flow: &FlowFields) -> Result<StableStep> {
        flow.validate(self.mesh.as_ref())?;
        let stencil = UpwindStencil::build(self.mesh.as_ref(), &flow.flux)?;
        stability::estimate_stable_step(
            self.mesh.as_ref(),
            &stencil,
            flow,
            self.config.cfl,
            self.comm.as_ref(),
        )
    }

    /// Advance the concentrations of `state` from `t_old` to `t_new`.
    ///
    /// On success the new concentrations are written into `state.tcc`, the
    /// mass balance is updated and the step report is returned. On failure
    /// `state`, the mass balance and any multiscale state are left as they
    /// were; no retry with a smaller step is attempted.
    pub fn advance_step(
        &mut self,
        state: &mut TransportState,
        t_old: f64,
        t_new: f64,
    ) -> Result<StepReport> {
        match self.run_macro_step(state, t_old, t_new) {
            Ok((tcc, balance, report)) => {
                state.tcc = tcc;
                self.balance = balance;
                if let Some(model) = self.multiscale.as_mut() {
                    model.commit();
                }
                self.last_report = Some(report);
                self.log_step(state, &report);
                Ok(report)
            }
            Err(err) => {
                if let Some(model) = self.multiscale.as_mut() {
                    model.discard();
                }
                log::error!("transport step [{}, {}] failed: {}", t_old, t_new, err);
                Err(err)
            }
        }
    }

    fn run_macro_step(
        &mut self,
        state: &TransportState,
        t_old: f64,
        t_new: f64,
    ) -> Result<(ComponentField, MassBalance, StepReport)> {
        let dt_mpc = t_new - t_old;
        if !(dt_mpc > 0.0) || !dt_mpc.is_finite() {
            return Err(TransportError::stability(dt_mpc, "macro step must be positive"));
        }
        let n_components = self.config.n_components();
        if state.tcc.n_components() != n_components {
            return Err(TransportError::dimension(
                "concentration components",
                n_components,
                state.tcc.n_components(),
            ));
        }

        let Self {
            config,
            mesh,
            comm,
            updater,
            reconstruction,
            boundaries,
            sources,
            multiscale,
            dispersion,
            balance: committed_balance,
            ..
        } = self;
        let mesh: &dyn TransportMesh = &**mesh;
        let comm: &dyn Communicator = &**comm;
        let flow = &state.flow;
        state.validate(mesh)?;

        let stencil = UpwindStencil::build(mesh, &flow.flux)?;
        let stable = stability::estimate_stable_step(mesh, &stencil, flow, config.cfl, comm)?;
        let dt_stable = stable.dt;

        let (dt_shift, dt_global) = match flow.interval {
            Some(interval) => (
                interval.t_intermediate - interval.t_initial,
                interval.t_final - interval.t_initial,
            ),
            None => (0.0, dt_mpc),
        };
        let interpolate_ws = dt_stable < dt_global;

        let (mut ws_start, mut ws_end) = if interpolate_ws {
            let mut start = vec![0.0; flow.ws.len()];
            interpolate_cell_vector(&flow.ws_prev, &flow.ws, dt_shift, dt_global, &mut start)?;
            (start.clone(), start)
        } else {
            (flow.ws_prev.clone(), flow.ws.clone())
        };

        let mut prev = state.tcc.clone();
        let mut next = state.tcc.clone();
        let mut balance = committed_balance.clone();
        let passive = config.num_aqueous..n_components;

        let mut controller = SubcycleController::new(t_old, t_new, dt_stable, config.tail_policy);
        while let Some(cycle) = controller.next_cycle() {
            if interpolate_ws {
                if cycle.index > 0 {
                    mem::swap(&mut ws_start, &mut ws_end);
                }
                interpolate_cell_vector(
                    &flow.ws_prev,
                    &flow.ws,
                    cycle.elapsed + dt_shift,
                    dt_global,
                    &mut ws_end,
                )?;
            }

            for bc in boundaries.iter_mut() {
                bc.compute(cycle.t_mid());
            }
            for source in sources.iter_mut() {
                source.compute(cycle.t_end());
            }
            next.copy_components_from(&prev, passive.clone())?;

            let ctx = CycleContext {
                mesh,
                comm,
                stencil: &stencil,
                porosity: &flow.porosity,
                ws_start: &ws_start,
                ws_end: &ws_end,
                boundaries: boundaries.as_slice(),
                sources: sources.as_slice(),
                reconstruction: reconstruction.as_ref(),
                num_advect: config.num_aqueous,
                t_start: cycle.t_start,
                dt: cycle.dt,
            };
            let outcome = run_cycle(
                &mut **updater,
                multiscale,
                &ctx,
                &mut prev,
                &mut next,
                &mut balance,
                config.internal_tests,
            );
            if let Err(err) = outcome {
                controller.fail();
                log::warn!(
                    "sub-cycle {} at t={} (dt={:e}) failed",
                    cycle.index,
                    cycle.t_start,
                    cycle.dt
                );
                return Err(err);
            }

            log::debug!(
                "sub-cycle {}: t={} dt={:e}{}",
                cycle.index,
                cycle.t_end(),
                cycle.dt,
                if cycle.final_cycle { " (final)" } else { "" }
            );

            if !cycle.final_cycle {
                mem::swap(&mut prev, &mut next);
            }
        }
        debug_assert_eq!(controller.phase(), ControllerPhase::Done);

        if let Some(solver) = dispersion.as_mut() {
            log::debug!("applying {} over [{}, {}]", solver.name(), t_old, t_new);
            solver.solve(mesh, flow, &state.tcc, &mut next, t_old, t_new)?;
        }
        comm.scatter_field(&mut next)?;

        let report = StepReport {
            n_subcycles: controller.n_cycles(),
            dt_stable: controller.dt_stable(),
            dt_mpc,
            final_time: t_new,
        };
        Ok((next, balance, report))
    }

    fn log_step(&self, state: &TransportState, report: &StepReport) {
        if self.config.verbose {
            log::info!(
                "{} sub-cycles, dt_stable={:e} [sec], dt_MPC={:e} [sec]",
                report.n_subcycles,
                report.dt_stable,
                report.dt_mpc
            );
        } else {
            log::debug!(
                "{} sub-cycles, dt_stable={:e} [sec], dt_MPC={:e} [sec]",
                report.n_subcycles,
                report.dt_stable,
                report.dt_mpc
            );
        }

        if log::log_enabled!(log::Level::Trace) {
            let stats = solute_extrema(
                &state.tcc,
                self.config.num_aqueous,
                self.mesh.as_ref(),
                &state.flow.porosity,
                &state.flow.ws,
                self.comm.as_ref(),
            );
            for s in stats {
                log::trace!(
                    "component {}: min={:e} max={:e} mass={:e}",
                    s.component,
                    s.min,
                    s.max,
                    s.total_mass
                );
            }
        }
    }
}

/// Updater, multiscale exchange and checks for one sub-cycle.
fn run_cycle(
    updater: &mut dyn CycleUpdater,
    multiscale: &mut Option<Box<dyn MultiscaleExchange>>,
    ctx: &CycleContext<'_>,
    prev: &mut ComponentField,
    next: &mut ComponentField,
    balance: &mut MassBalance,
    internal_tests: bool,
) -> Result<()> {
    updater.advance_one_cycle(ctx, prev, next, balance)?;

    if let Some(model) = multiscale.as_mut() {
        model.apply(ctx, next, ctx.t_start, ctx.t_start + ctx.dt)?;
    }

    if internal_tests {
        if let Err(fault) = check_non_negative(next, ctx.num_advect, ctx.comm) {
            report_fault(fault)?;
        }
    }
    Ok(())
}
