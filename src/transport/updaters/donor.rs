//! First-order donor upwind on manifold meshes.

use crate::error::Result;
use crate::source::apply_sources;
use crate::state::ComponentField;
use crate::transport::balance::MassBalance;

use super::{clear_ghosts, to_concentration, to_mass, CycleContext, CycleUpdater};

/// Donor-cell upwind update for meshes whose faces join at most two cells.
///
/// Each face moves `dt × |q| × c_upwind` of mass from its upwind cell to its
/// downwind cell. A face shared with another partition only updates the
/// owned side; the neighbour partition sees the same face and updates its
/// own side.
#[derive(Clone, Debug, Default)]
pub struct DonorUpwind;

impl DonorUpwind {
    /// Create the updater.
    pub fn new() -> Self {
        Self
    }
}

impl CycleUpdater for DonorUpwind {
    fn name(&self) -> &'static str {
        "donor-upwind"
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

        for f in 0..ctx.stencil.n_faces() {
            let Some(up) = ctx.stencil.upwind(f).first() else {
                continue;
            };
            let down = ctx.stencil.downwind(f).first();
            let c1 = up.cell;
            let c2_owned = down.filter(|d| layout.is_owned(d.cell));

            if layout.is_owned(c1) {
                for k in ctx.advected() {
                    let tcc_flux = dt * up.flux * prev.get(k, c1);
                    let values = next.component_mut(k);
                    values[c1] -= tcc_flux;
                    if let Some(d) = c2_owned {
                        values[d.cell] += tcc_flux;
                    } else if down.is_none() && ctx.mesh.is_boundary_face(f) {
                        balance.add_boundary(k.get(), -tcc_flux);
                    }
                }
            } else if let Some(d) = c2_owned {
                for k in ctx.advected() {
                    let tcc_flux = dt * up.flux * prev.get(k, c1);
                    next.component_mut(k)[d.cell] += tcc_flux;
                }
            }
        }

        // Boundary inflow may land in ghost cells owned elsewhere
        clear_ghosts(ctx, next);
        let mut cross_partition = false;
        let n_faces_owned = ctx.mesh.n_faces_owned();

        for bc in ctx.boundaries {
            for (i, &f) in bc.faces().iter().enumerate() {
                if f >= n_faces_owned {
                    continue;
                }
                for d in ctx.stencil.downwind(f) {
                    if layout.is_ghost(d.cell) {
                        cross_partition = true;
                    }
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

        let flag = ctx.comm.max_all(if cross_partition { 1.0 } else { 0.0 });
        if flag > 0.0 {
            for k in ctx.advected() {
                ctx.comm.gather_ghosts_to_owners(layout, next.component_mut(k))?;
            }
        }

        let totals = apply_sources(ctx.sources, dt, next, 0..ctx.num_advect);
        balance.add_source(&totals, dt);

        to_concentration(ctx, next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{ConstantBoundary, TransportBoundary};
    use crate::mesh::{PolyMesh, TransportMesh, UpwindStencil};
    use crate::parallel::{LoopbackCommunicator, SerialCommunicator};
    use crate::source::{ConstantSource, TransportSource};
    use crate::state::FluxSnapshot;
    use crate::types::{CellLayout, ComponentIndex};

    const K0: ComponentIndex = ComponentIndex::ZERO;

    #[test]
    fn test_two_cell_step() {
        // Unit volumes, porosity 0.5, flux 1: dt_stable = 0.5, use dt = 0.25
        let mesh = PolyMesh::uniform_1d(2, 2.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 1.0, 1.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let phi = vec![0.5; 2];
        let ws = vec![1.0; 2];
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
            dt: 0.25,
        };

        let mut prev = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 0.0]])
            .unwrap();
        let mut next = prev.clone();
        let mut balance = MassBalance::new(1);
        DonorUpwind::new()
            .advance_one_cycle(&ctx, &mut prev, &mut next, &mut balance)
            .unwrap();

        // Transported mass 0.25; pore volume 0.5
        assert!((next.get(K0, 0) - 0.5).abs() < 1e-14);
        assert!((next.get(K0, 1) - 0.5).abs() < 1e-14);
        assert_eq!(balance.boundary(), &[0.0]);
    }

    #[test]
    fn test_boundary_inflow_and_outflow() {
        let mesh = PolyMesh::uniform_1d(2, 2.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 1.0, 1.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let ones = vec![1.0; 2];
        let boundaries: Vec<Box<dyn TransportBoundary>> = vec![Box::new(ConstantBoundary::new(
            vec![0],
            vec![(K0, 2.0)],
        ))];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &SerialCommunicator,
            stencil: &stencil,
            porosity: &ones,
            ws_start: &ones,
            ws_end: &ones,
            boundaries: &boundaries,
            sources: &[],
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 0.5,
        };

        let mut prev = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 1.0]])
            .unwrap();
        let mut next = prev.clone();
        let mut balance = MassBalance::new(1);
        DonorUpwind::new()
            .advance_one_cycle(&ctx, &mut prev, &mut next, &mut balance)
            .unwrap();

        assert!((next.get(K0, 0) - 1.5).abs() < 1e-14);
        assert!((next.get(K0, 1) - 1.0).abs() < 1e-14);
        // In 1.0, out 0.5
        assert!((balance.boundary()[0] - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_sources_are_booked() {
        let mesh = PolyMesh::uniform_1d(1, 1.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[0.0, 0.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let ones = vec![1.0; 1];
        let sources: Vec<Box<dyn TransportSource>> =
            vec![Box::new(ConstantSource::new(vec![0], vec![(K0, 3.0)]))];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &SerialCommunicator,
            stencil: &stencil,
            porosity: &ones,
            ws_start: &ones,
            ws_end: &ones,
            boundaries: &[],
            sources: &sources,
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 0.5,
        };

        let mut prev = ComponentField::new(CellLayout::serial(1), 1);
        let mut next = prev.clone();
        let mut balance = MassBalance::new(1);
        DonorUpwind::new()
            .advance_one_cycle(&ctx, &mut prev, &mut next, &mut balance)
            .unwrap();

        assert!((next.get(K0, 0) - 1.5).abs() < 1e-14);
        assert_eq!(balance.exact(), &[1.5]);
    }

    #[test]
    fn test_boundary_inflow_into_ghost_reaches_owner() {
        // Two owned cells and a ghost image of cell 0; the inflow face only
        // touches the ghost, so its mass must travel back to the owner.
        let mesh = PolyMesh::new(
            CellLayout::new(2, 1),
            vec![1.0; 3],
            vec![vec![2], vec![0, 1]],
            2,
        )
        .unwrap();
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 0.0]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let comm = LoopbackCommunicator::new(vec![0]);
        let ones = vec![1.0; 3];
        let boundaries: Vec<Box<dyn TransportBoundary>> =
            vec![Box::new(ConstantBoundary::new(vec![0], vec![(K0, 1.0)]))];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &comm,
            stencil: &stencil,
            porosity: &ones,
            ws_start: &ones,
            ws_end: &ones,
            boundaries: &boundaries,
            sources: &[],
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 0.5,
        };

        let mut prev = ComponentField::new(CellLayout::new(2, 1), 1);
        let mut next = prev.clone();
        let mut balance = MassBalance::new(1);
        DonorUpwind::new()
            .advance_one_cycle(&ctx, &mut prev, &mut next, &mut balance)
            .unwrap();

        assert!((next.get(K0, 0) - 0.5).abs() < 1e-14);
        assert_eq!(next.get(K0, 1), 0.0);
        assert_eq!(next.get(K0, 2), 0.0);
        // Booked once, on the partition owning the boundary face
        assert!((balance.boundary()[0] - 0.5).abs() < 1e-14);
        let total: f64 = next.owned(K0).iter().sum();
        assert!((total - balance.boundary()[0]).abs() < 1e-14);
    }

    #[test]
    fn test_periodic_ring_conserves_mass() {
        let mesh = PolyMesh::periodic_1d(4, 4.0, 1.0);
        let flux = FluxSnapshot::from_face_fluxes(&mesh, &vec![1.0; mesh.n_faces()]).unwrap();
        let stencil = UpwindStencil::build(&mesh, &flux).unwrap();
        let comm = LoopbackCommunicator::periodic_1d(4);
        let ones = vec![1.0; mesh.n_cells()];
        let ctx = CycleContext {
            mesh: &mesh,
            comm: &comm,
            stencil: &stencil,
            porosity: &ones,
            ws_start: &ones,
            ws_end: &ones,
            boundaries: &[],
            sources: &[],
            reconstruction: None,
            num_advect: 1,
            t_start: 0.0,
            dt: 0.5,
        };

        let mut prev = ComponentField::from_components(
            CellLayout::new(4, 2),
            vec![vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0]],
        )
        .unwrap();
        let mut next = prev.clone();
        let mut balance = MassBalance::new(1);
        DonorUpwind::new()
            .advance_one_cycle(&ctx, &mut prev, &mut next, &mut balance)
            .unwrap();

        // Half of the last cell wraps around into cell 0
        assert_eq!(next.owned(K0), &[2.0, 0.0, 0.0, 2.0]);
        let total: f64 = next.owned(K0).iter().sum();
        assert!((total - 4.0).abs() < 1e-14);
    }
}
