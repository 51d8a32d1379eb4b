//! Integration tests for mass conservation.
//!
//! These tests verify:
//! 1. Closed domains keep their stored mass for every updater
//! 2. Open domains change their stored mass by exactly the booked source
//!    and boundary mass
//! 3. Conservation while the saturation changes over the macro step
//! 4. Dual porosity exchange only moves mass out of the mobile region

use std::sync::Arc;

use porous_transport::boundary::ConstantBoundary;
use porous_transport::config::{TransportConfig, UpdaterKind};
use porous_transport::mesh::{PolyMesh, TransportMesh};
use porous_transport::parallel::LoopbackCommunicator;
use porous_transport::source::ConstantSource;
use porous_transport::state::{ComponentField, FlowFields, FluxSnapshot, TransportState};
use porous_transport::time::RkMethod;
use porous_transport::transport::{total_mass, DualPorosity, ExplicitTransport};
use porous_transport::types::{CellLayout, ComponentIndex};

const K0: ComponentIndex = ComponentIndex::ZERO;
const TOL: f64 = 1e-12;

/// Configurations selecting each manifold updater.
fn manifold_configs() -> Vec<(TransportConfig, UpdaterKind)> {
    let second = TransportConfig::default()
        .with_spatial_order(2)
        .with_temporal_order(2);
    vec![
        (TransportConfig::default(), UpdaterKind::DonorUpwind),
        (second.clone(), UpdaterKind::PredictorCorrector),
        (
            second.clone().with_generic_rk(true),
            UpdaterKind::GenericRungeKutta(RkMethod::HeunEuler),
        ),
        (
            second.clone().with_generic_rk(true).with_temporal_order(3),
            UpdaterKind::GenericRungeKutta(RkMethod::Tvd3),
        ),
        (
            second.with_generic_rk(true).with_temporal_order(4),
            UpdaterKind::GenericRungeKutta(RkMethod::Rk4),
        ),
    ]
}

fn stored_mass(state: &TransportState, mesh: &dyn TransportMesh, ws: &[f64]) -> Vec<f64> {
    total_mass(&state.tcc, mesh, &state.flow.porosity, ws)
}

/// Periodic ring of `n` cells with ghost images of both ends.
fn periodic_ring(n: usize) -> (Arc<PolyMesh>, TransportState) {
    let mesh = PolyMesh::periodic_1d(n, 2.0, 1.0);
    let flux = FluxSnapshot::from_face_fluxes(&mesh, &vec![0.3; n + 1]).unwrap();
    let n_total = n + 2;
    let flow = FlowFields::steady(flux, vec![0.35; n_total], vec![0.9; n_total]);

    let mut c: Vec<f64> = (0..n).map(|i| 1.0 + (i as f64 * 0.7).sin()).collect();
    c.extend([c[0], c[n - 1]]);
    let tcc = ComponentField::from_components(CellLayout::new(n, 2), vec![c]).unwrap();
    (Arc::new(mesh), TransportState::new(tcc, flow))
}

/// Y-shaped junction: inflow into cell 0, split 70/30 to cells 1 and 2,
/// which drain through their own boundary faces.
fn junction() -> (Arc<PolyMesh>, FlowFields) {
    let mesh = PolyMesh::new(
        CellLayout::serial(3),
        vec![1.0, 0.8, 0.6],
        vec![vec![0], vec![0, 1, 2], vec![1], vec![2]],
        4,
    )
    .unwrap()
    .with_centroids(
        vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.0], [1.0, -0.5, 0.0]],
        vec![
            [-0.5, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.5, 0.5, 0.0],
            [1.5, -0.5, 0.0],
        ],
    )
    .unwrap();
    let flux = FluxSnapshot::from_partial_fluxes(
        &mesh,
        vec![vec![-1.0], vec![1.0, -0.7, -0.3], vec![0.7], vec![0.3]],
    )
    .unwrap();
    let flow = FlowFields::steady(flux, vec![0.4; 3], vec![1.0; 3]);
    (Arc::new(mesh), flow)
}

// ============================================================================
// Closed domains
// ============================================================================

#[test]
fn test_periodic_ring_conserves_mass_for_all_updaters() {
    for (config, kind) in manifold_configs() {
        let (mesh, mut state) = periodic_ring(8);
        let ws = state.flow.ws.clone();
        let before = stored_mass(&state, mesh.as_ref(), &ws);

        let mut transport = ExplicitTransport::new(config, mesh.clone())
            .unwrap()
            .with_communicator(LoopbackCommunicator::periodic_1d(8));
        assert_eq!(transport.updater_kind(), kind);

        let report = transport.advance_step(&mut state, 0.0, 7.3).unwrap();
        assert!(report.n_subcycles > 1, "{:?}", kind);

        let after = stored_mass(&state, mesh.as_ref(), &ws);
        assert!(
            (after[0] - before[0]).abs() < TOL * before[0],
            "{:?}: {} -> {}",
            kind,
            before[0],
            after[0]
        );
        assert_eq!(transport.mass_balance().expected_change(), vec![0.0]);
    }
}

#[test]
fn test_closed_non_manifold_loop_conserves_mass() {
    // Cell 0 feeds cells 1 and 2 through a shared face; both return to
    // cell 3, which feeds cell 0 again.
    let mesh = PolyMesh::new(
        CellLayout::serial(4),
        vec![1.0, 0.5, 0.5, 1.0],
        vec![vec![0, 1, 2], vec![1, 3], vec![2, 3], vec![3, 0]],
        4,
    )
    .unwrap()
    .with_centroids(
        vec![[0.0, 0.0, 0.0], [1.0, 0.5, 0.0], [1.0, -0.5, 0.0], [2.0, 0.0, 0.0]],
        vec![
            [0.5, 0.0, 0.0],
            [1.5, 0.25, 0.0],
            [1.5, -0.25, 0.0],
            [1.0, 0.0, 0.5],
        ],
    )
    .unwrap();
    let flux = FluxSnapshot::from_partial_fluxes(
        &mesh,
        vec![
            vec![1.0, -0.5, -0.5],
            vec![0.5, -0.5],
            vec![0.5, -0.5],
            vec![1.0, -1.0],
        ],
    )
    .unwrap();
    let flow = FlowFields::steady(flux, vec![0.3; 4], vec![1.0; 4]);
    let mesh = Arc::new(mesh);

    let configs = [
        (TransportConfig::default(), UpdaterKind::DonorUpwindNonManifold),
        (
            TransportConfig::default()
                .with_spatial_order(2)
                .with_temporal_order(2),
            UpdaterKind::GenericRungeKutta(RkMethod::HeunEuler),
        ),
    ];
    for (config, kind) in configs {
        let tcc = ComponentField::from_components(
            CellLayout::serial(4),
            vec![vec![1.0, 0.0, 0.5, 0.25]],
        )
        .unwrap();
        let mut state = TransportState::new(tcc, flow.clone());
        let before = stored_mass(&state, mesh.as_ref(), &flow.ws);

        let mut transport = ExplicitTransport::new(config, mesh.clone()).unwrap();
        assert_eq!(transport.updater_kind(), kind);
        transport.advance_step(&mut state, 0.0, 2.0).unwrap();

        let after = stored_mass(&state, mesh.as_ref(), &flow.ws);
        assert!((after[0] - before[0]).abs() < TOL, "{:?}", kind);
    }
}

// ============================================================================
// Open domains
// ============================================================================

#[test]
fn test_open_column_balance_for_all_updaters() {
    for (config, kind) in manifold_configs() {
        let n = 6;
        let mesh = Arc::new(PolyMesh::uniform_1d(n, 6.0, 1.0));
        let mut q = vec![0.4; n + 1];
        q[0] = -0.4;
        let flux = FluxSnapshot::from_face_fluxes(mesh.as_ref(), &q).unwrap();
        let flow = FlowFields::steady(flux, vec![0.4; n], vec![0.9; n]);
        let tcc = ComponentField::from_components(
            CellLayout::serial(n),
            vec![vec![0.5, 0.1, 0.0, 0.3, 1.0, 0.2]],
        )
        .unwrap();
        let mut state = TransportState::new(tcc, flow);
        let before = stored_mass(&state, mesh.as_ref(), &state.flow.ws);

        let mut transport = ExplicitTransport::new(config, mesh.clone()).unwrap();
        transport
            .add_boundary(ConstantBoundary::new(vec![0], vec![(K0, 2.0)]))
            .unwrap();
        transport
            .add_source(ConstantSource::new(vec![2], vec![(K0, 0.05)]))
            .unwrap();
        transport.advance_step(&mut state, 0.0, 5.0).unwrap();

        let after = stored_mass(&state, mesh.as_ref(), &state.flow.ws);
        let balance = transport.mass_balance();
        assert!((balance.exact()[0] - 0.25).abs() < TOL, "{:?}", kind);
        assert!(
            (after[0] - before[0] - balance.expected_change()[0]).abs() < TOL,
            "{:?}: change {} booked {}",
            kind,
            after[0] - before[0],
            balance.expected_change()[0]
        );
    }
}

#[test]
fn test_junction_balance() {
    let configs = [
        TransportConfig::default(),
        TransportConfig::default()
            .with_spatial_order(2)
            .with_temporal_order(4)
            .with_generic_rk(true),
    ];
    for config in configs {
        let (mesh, flow) = junction();
        let tcc = ComponentField::from_components(
            CellLayout::serial(3),
            vec![vec![0.2, 0.4, 0.9]],
        )
        .unwrap();
        let mut state = TransportState::new(tcc, flow);
        let before = stored_mass(&state, mesh.as_ref(), &state.flow.ws);

        let mut transport = ExplicitTransport::new(config, mesh.clone()).unwrap();
        transport
            .add_boundary(ConstantBoundary::new(vec![0], vec![(K0, 1.0)]))
            .unwrap();
        transport.advance_step(&mut state, 0.0, 3.0).unwrap();

        let after = stored_mass(&state, mesh.as_ref(), &state.flow.ws);
        let booked = transport.mass_balance().boundary()[0];
        assert!((after[0] - before[0] - booked).abs() < TOL);
        if transport.updater_kind() == UpdaterKind::DonorUpwindNonManifold {
            // Inflow at concentration 1 pushes everything towards 1
            for &c in state.tcc.owned(K0) {
                assert!(c > 0.0 && c <= 1.0 + TOL);
            }
        }
    }
}

#[test]
fn test_mass_balance_accumulates_and_resets() {
    let mesh = Arc::new(PolyMesh::uniform_1d(2, 2.0, 1.0));
    let flux = FluxSnapshot::from_face_fluxes(mesh.as_ref(), &[0.0, 0.0, 0.0]).unwrap();
    let flow = FlowFields::steady(flux, vec![0.5; 2], vec![1.0; 2]);
    let tcc = ComponentField::new(CellLayout::serial(2), 1);
    let mut state = TransportState::new(tcc, flow);

    let mut transport = ExplicitTransport::new(TransportConfig::default(), mesh).unwrap();
    transport
        .add_source(ConstantSource::new(vec![0, 1], vec![(K0, 0.1)]))
        .unwrap();

    transport.advance_step(&mut state, 0.0, 1.0).unwrap();
    transport.advance_step(&mut state, 1.0, 3.0).unwrap();
    assert!((transport.mass_balance().exact()[0] - 0.6).abs() < TOL);
    // 0.3 of mass in a pore volume of 0.5
    assert!((state.tcc.get(K0, 0) - 0.6).abs() < TOL);

    transport.reset_mass_balance();
    assert_eq!(transport.mass_balance().exact(), &[0.0]);
}

// ============================================================================
// Changing saturation
// ============================================================================

#[test]
fn test_conservation_with_interpolated_saturation() {
    for (config, kind) in manifold_configs() {
        let (mesh, state) = periodic_ring(10);
        let n_total = 12;
        let ws_prev = vec![0.5; n_total];
        let mut ws: Vec<f64> = (0..10).map(|i| 0.7 + 0.02 * (i % 5) as f64).collect();
        ws.extend([ws[0], ws[9]]);
        let flow = FlowFields::new(state.flow.flux.clone(), state.flow.porosity.clone(), ws_prev, ws)
            .with_interval(0.0, 0.0, 10.0);
        let mut state = TransportState::new(state.tcc, flow);

        let before = stored_mass(&state, mesh.as_ref(), &state.flow.ws_prev);
        let mut transport = ExplicitTransport::new(config, mesh.clone())
            .unwrap()
            .with_communicator(LoopbackCommunicator::periodic_1d(10));
        let report = transport.advance_step(&mut state, 0.0, 10.0).unwrap();
        assert!(report.n_subcycles > 2);

        let after = stored_mass(&state, mesh.as_ref(), &state.flow.ws);
        assert!(
            (after[0] - before[0]).abs() < TOL * before[0],
            "{:?}: {} -> {}",
            kind,
            before[0],
            after[0]
        );
    }
}

#[test]
fn test_dual_porosity_moves_mass_to_matrix() {
    let (mesh, mut state) = periodic_ring(8);
    let ws = state.flow.ws.clone();
    let before = stored_mass(&state, mesh.as_ref(), &ws);

    let matrix = ComponentField::new(CellLayout::new(8, 2), 1);
    let model = DualPorosity::new(0.05, vec![0.2; 10], matrix).unwrap();
    let mut transport = ExplicitTransport::new(TransportConfig::default(), mesh.clone())
        .unwrap()
        .with_communicator(LoopbackCommunicator::periodic_1d(8))
        .with_multiscale(model);
    transport.advance_step(&mut state, 0.0, 4.0).unwrap();

    let after = stored_mass(&state, mesh.as_ref(), &ws);
    assert!(after[0] < before[0]);
    for &c in state.tcc.owned(K0) {
        assert!(c > 0.0);
    }
}
