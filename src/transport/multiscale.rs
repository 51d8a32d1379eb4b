//! Exchange between mobile (fracture) and immobile (matrix) pore water.

use crate::error::{Result, TransportError};
use crate::state::ComponentField;

use super::updaters::CycleContext;

/// Solute exchange with an immobile pore region, applied after each sub-cycle.
///
/// Implementations keep their own state. Changes made by
/// [`apply`](MultiscaleExchange::apply) become permanent only on
/// [`commit`](MultiscaleExchange::commit); [`discard`](MultiscaleExchange::discard)
/// restores the last committed state when a macro step fails.
pub trait MultiscaleExchange: Send {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Exchange over `[t_int1, t_int2]`, updating the owned advected
    /// concentrations of `tcc` in place.
    fn apply(
        &mut self,
        ctx: &CycleContext<'_>,
        tcc: &mut ComponentField,
        t_int1: f64,
        t_int2: f64,
    ) -> Result<()>;

    /// Keep the state reached by the applied exchanges.
    fn commit(&mut self);

    /// Drop exchanges applied since the last commit.
    fn discard(&mut self);
}

/// First-order dual porosity model.
///
/// With mobile water content `theta_f = phi × ws` and matrix water content
/// `theta_m`, each advected component obeys
///
/// ```text
/// theta_f dc_f/dt = -omega (c_f - c_m)
/// theta_m dc_m/dt =  omega (c_f - c_m)
/// ```
///
/// integrated with backward Euler, which keeps `theta_f c_f + theta_m c_m`
/// unchanged for any step length.
#[derive(Clone, Debug)]
pub struct DualPorosity {
    omega: f64,
    theta_m: Vec<f64>,
    matrix: ComponentField,
    trial: ComponentField,
}

impl DualPorosity {
    /// Create the model.
    ///
    /// # Arguments
    /// * `omega` - Exchange coefficient (per unit time), non-negative
    /// * `theta_m` - Matrix water content of every cell, positive
    /// * `matrix` - Initial matrix concentrations
    pub fn new(omega: f64, theta_m: Vec<f64>, matrix: ComponentField) -> Result<Self> {
        if !(omega >= 0.0) || !omega.is_finite() {
            return Err(TransportError::Config(format!(
                "exchange coefficient must be non-negative, got {}",
                omega
            )));
        }
        TransportError::check_len("matrix water content", matrix.layout().n_total(), theta_m.len())?;
        if let Some(c) = theta_m.iter().position(|t| !(*t > 0.0)) {
            return Err(TransportError::Config(format!(
                "matrix water content of cell {} must be positive",
                c
            )));
        }
        Ok(Self {
            omega,
            theta_m,
            trial: matrix.clone(),
            matrix,
        })
    }

    /// Committed matrix concentrations.
    pub fn matrix_concentration(&self) -> &ComponentField {
        &self.matrix
    }

    /// Matrix water content.
    pub fn theta_m(&self) -> &[f64] {
        &self.theta_m
    }
}

impl MultiscaleExchange for DualPorosity {
    fn name(&self) -> &'static str {
        "dual-porosity"
    }

    fn apply(
        &mut self,
        ctx: &CycleContext<'_>,
        tcc: &mut ComponentField,
        t_int1: f64,
        t_int2: f64,
    ) -> Result<()> {
        self.trial.check_compatible(tcc)?;
        let dt = t_int2 - t_int1;
        let n_owned = ctx.mesh.n_cells_owned();

        for k in ctx.advected() {
            let cf = tcc.component_mut(k);
            let cm = self.trial.component_mut(k);
            for c in 0..n_owned {
                let theta_f = ctx.porosity[c] * ctx.ws_end[c];
                let a = self.omega * dt / theta_f;
                let b = self.omega * dt / self.theta_m[c];
                let d = (cf[c] - cm[c]) / (1.0 + a + b);
                cf[c] -= a * d;
                cm[c] += b * d;
            }
        }
        Ok(())
    }

    fn commit(&mut self) {
        self.matrix.clone_from(&self.trial);
    }

    fn discard(&mut self) {
        self.trial.clone_from(&self.matrix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{PolyMesh, UpwindStencil};
    use crate::parallel::SerialCommunicator;
    use crate::state::FluxSnapshot;
    use crate::types::{CellLayout, ComponentIndex};

    #[test]
    fn test_exchange_conserves_total() {
        let mesh = PolyMesh::uniform_1d(2, 2.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[0.0, 0.0, 0.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let phi = vec![0.3, 0.3];
        let ws = vec![1.0, 0.5];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &SerialCommunicator,
            stencil: &stencil,
            porosity: &phi,
            ws_start: &ws,
            ws_end: &ws,
            boundaries: &[],
            sources: &[],
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 1.0,
        };

        let layout = CellLayout::serial(2);
        let matrix = ComponentField::new(layout, 1);
        let mut model = DualPorosity::new(0.2, vec![0.1, 0.1], matrix).unwrap();
        let mut tcc = ComponentField::from_components(layout, vec![vec![1.0, 2.0]]).unwrap();

        model.apply(&ctx, &mut tcc, 0.0, 1.0).unwrap();
        model.commit();

        let k = ComponentIndex::ZERO;
        for c in 0..2 {
            let theta_f = phi[c] * ws[c];
            let total = theta_f * tcc.get(k, c) + 0.1 * model.matrix_concentration().get(k, c);
            let initial = theta_f * [1.0, 2.0][c];
            assert!((total - initial).abs() < 1e-14);
            assert!(model.matrix_concentration().get(k, c) > 0.0);
            assert!(tcc.get(k, c) > model.matrix_concentration().get(k, c));
        }
    }

    #[test]
    fn test_discard_restores_matrix() {
        let mesh = PolyMesh::uniform_1d(1, 1.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[0.0, 0.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let ones = vec![1.0];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &SerialCommunicator,
            stencil: &stencil,
            porosity: &ones,
            ws_start: &ones,
            ws_end: &ones,
            boundaries: &[],
            sources: &[],
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 1.0,
        };

        let layout = CellLayout::serial(1);
        let mut model = DualPorosity::new(1.0, vec![1.0], ComponentField::new(layout, 1)).unwrap();
        let mut tcc = ComponentField::from_components(layout, vec![vec![1.0]]).unwrap();

        model.apply(&ctx, &mut tcc, 0.0, 1.0).unwrap();
        model.discard();
        assert_eq!(model.matrix_concentration().get(ComponentIndex::ZERO, 0), 0.0);

        model.apply(&ctx, &mut tcc, 0.0, 1.0).unwrap();
        model.commit();
        assert!(model.matrix_concentration().get(ComponentIndex::ZERO, 0) > 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let layout = CellLayout::serial(2);
        assert!(DualPorosity::new(-1.0, vec![0.1; 2], ComponentField::new(layout, 1)).is_err());
        assert!(DualPorosity::new(1.0, vec![0.1], ComponentField::new(layout, 1)).is_err());
        assert!(DualPorosity::new(1.0, vec![0.1, 0.0], ComponentField::new(layout, 1)).is_err());
    }
}
