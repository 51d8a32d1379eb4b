//! Hook for an operator-split dispersion/diffusion solve.

use crate::error::Result;
use crate::mesh::TransportMesh;
use crate::state::{ComponentField, FlowFields};

/// Implicit dispersion or diffusion step applied once per macro step, after
/// all advective sub-cycles.
///
/// The solve itself lives outside this crate; implementations receive the
/// concentrations before (`tcc_prev`) and after (`tcc_next`) advection and
/// update `tcc_next` in place.
pub trait DispersionSolver: Send {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Apply dispersion over `[t_old, t_new]`.
    fn solve(
        &mut self,
        mesh: &dyn TransportMesh,
        flow: &FlowFields,
        tcc_prev: &ComponentField,
        tcc_next: &mut ComponentField,
        t_old: f64,
        t_new: f64,
    ) -> Result<()>;
}
