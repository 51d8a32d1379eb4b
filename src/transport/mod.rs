//! Explicit sub-cycled solute transport.
//!
//! The engine advances multi-component concentrations over a macro step by
//! splitting it into stable explicit sub-cycles of upwind finite-volume
//! advection.
//!
//! # Structure
//!
//! | Part | Role |
//! |------|------|
//! | [`estimate_stable_step`] | Largest non-negativity preserving sub-step |
//! | [`SubcycleController`] | Sub-cycle sizing state machine |
//! | [`CycleUpdater`] | One sub-cycle: donor upwind, non-manifold donor upwind, predictor-corrector or generic Runge-Kutta |
//! | [`LinearReconstruction`] | Limited face values for the second-order updaters |
//! | [`MassBalance`] | Source and boundary mass bookkeeping |
//! | [`MultiscaleExchange`] | Optional matrix-fracture exchange after each sub-cycle |
//! | [`DispersionSolver`] | Optional operator-split dispersion after the sub-cycles |
//! | [`ExplicitTransport`] | Process kernel tying the above together |
//!
//! Concentrations are converted to stored mass `c × V × phi × ws` for the
//! update, so every updater conserves mass exactly up to boundary and
//! source exchange, even while the saturation changes.

mod advection;
mod balance;
mod checks;
mod diagnostics;
mod dispersion;
mod explicit;
mod multiscale;
mod reconstruction;
mod stability;
mod subcycle;
pub mod updaters;

pub use balance::MassBalance;
pub use checks::{check_non_negative, report_fault, NEGATIVE_TOLERANCE};
pub use diagnostics::{solute_extrema, total_mass, SoluteExtrema};
pub use dispersion::DispersionSolver;
pub use explicit::{ExplicitTransport, StepReport};
pub use multiscale::{DualPorosity, MultiscaleExchange};
pub use reconstruction::{CellGradients, LinearReconstruction};
pub use stability::{estimate_stable_step, StableStep, LARGE_TIME_STEP};
pub use subcycle::{
    next_cycle_size, ControllerPhase, SubCycle, SubcycleController, TAIL_TOLERANCE,
};
pub use updaters::{
    build_updater, CycleContext, CycleUpdater, DonorUpwind, DonorUpwindNonManifold,
    GenericRungeKutta, PredictorCorrector,
};
