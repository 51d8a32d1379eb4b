//! Integration tests for reference transport scenarios.
//!
//! These tests verify:
//! 1. A single donor-upwind sub-cycle on a two cell column
//! 2. Flux splitting at a non-manifold face
//! 3. Sub-cycle counts and sizes for a macro step of 3.5 stable steps

use std::sync::Arc;

use porous_transport::config::{TailPolicy, TransportConfig, UpdaterKind};
use porous_transport::mesh::{PolyMesh, TransportMesh};
use porous_transport::state::{ComponentField, FlowFields, FluxSnapshot, TransportState};
use porous_transport::transport::{ExplicitTransport, SubcycleController};
use porous_transport::types::{CellIndex, CellLayout, ComponentIndex};

const K0: ComponentIndex = ComponentIndex::ZERO;
const TOL: f64 = 1e-14;

/// Two unit cells, porosity 0.5, rightward flux 1.0.
fn two_cell_column() -> (Arc<PolyMesh>, TransportState) {
    let mesh = PolyMesh::uniform_1d(2, 2.0, 1.0);
    let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 1.0, 1.0]).unwrap();
    let flow = FlowFields::steady(flux, vec![0.5; 2], vec![1.0; 2]);
    let tcc = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 0.0]]).unwrap();
    (Arc::new(mesh), TransportState::new(tcc, flow))
}

/// Column of `n` unit cells with unit porosity and rightward flux 1.0, so
/// the stable step is exactly 1.
fn unit_column(n: usize) -> (Arc<PolyMesh>, TransportState) {
    let mesh = PolyMesh::uniform_1d(n, n as f64, 1.0);
    let mut q = vec![1.0; n + 1];
    q[0] = -1.0;
    let flux = FluxSnapshot::from_face_fluxes(&mesh, &q).unwrap();
    let flow = FlowFields::steady(flux, vec![1.0; n], vec![1.0; n]);
    let tcc = ComponentField::from_components(CellLayout::serial(n), vec![vec![1.0; n]]).unwrap();
    (Arc::new(mesh), TransportState::new(tcc, flow))
}

// ============================================================================
// Scenario A: two cell donor upwind
// ============================================================================

#[test]
fn test_two_cell_partial_step() {
    let (mesh, mut state) = two_cell_column();
    let mut transport = ExplicitTransport::new(TransportConfig::default(), mesh).unwrap();

    let stable = transport.estimate_stable_step(&state.flow).unwrap();
    assert_eq!(stable.dt, 0.5);
    assert_eq!(stable.limiting_cell, Some(CellIndex::new(0)));

    // Half a stable step moves 0.25 of mass into a pore volume of 0.5
    let report = transport.advance_step(&mut state, 0.0, 0.25).unwrap();
    assert_eq!(report.n_subcycles, 1);
    assert!((state.tcc.get(K0, 0) - 0.5).abs() < TOL);
    assert!((state.tcc.get(K0, 1) - 0.5).abs() < TOL);
}

#[test]
fn test_two_cell_full_stable_step() {
    let (mesh, mut state) = two_cell_column();
    let mut transport = ExplicitTransport::new(TransportConfig::default(), mesh).unwrap();

    transport.advance_step(&mut state, 0.0, 0.5).unwrap();

    // The whole content of cell 0 moves to cell 1
    assert!(state.tcc.get(K0, 0).abs() < TOL);
    assert!((state.tcc.get(K0, 1) - 1.0).abs() < TOL);
    assert_eq!(transport.num_subcycles(), 1);
}

#[test]
fn test_mass_moved_matches_volumes() {
    // Unequal cell volumes: the same transported mass changes the smaller
    // cell's concentration more.
    let mesh = PolyMesh::new(
        CellLayout::serial(2),
        vec![2.0, 0.5],
        vec![vec![0], vec![0, 1], vec![1]],
        3,
    )
    .unwrap();
    let flux = FluxSnapshot::from_face_fluxes(&mesh, &[-1.0, 1.0, 1.0]).unwrap();
    let flow = FlowFields::steady(flux, vec![0.5; 2], vec![0.8; 2]);
    let tcc = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 0.0]]).unwrap();
    let mut state = TransportState::new(tcc, flow);

    let mut transport = ExplicitTransport::new(TransportConfig::default(), Arc::new(mesh)).unwrap();
    transport.advance_step(&mut state, 0.0, 0.1).unwrap();

    // Transported mass 0.1; pore volumes 0.8 and 0.2
    assert!((state.tcc.get(K0, 0) - (0.8 - 0.1) / 0.8).abs() < TOL);
    assert!((state.tcc.get(K0, 1) - 0.1 / 0.2).abs() < TOL);
}

// ============================================================================
// Scenario B: non-manifold flux splitting
// ============================================================================

#[test]
fn test_non_manifold_split() {
    // One face shared by three cells: cell 0 upwind, cells 1 and 2 take 60/40
    let mesh = PolyMesh::new(CellLayout::serial(3), vec![1.0; 3], vec![vec![0, 1, 2]], 1).unwrap();
    assert!(!mesh.is_manifold());
    let flux = FluxSnapshot::from_partial_fluxes(&mesh, vec![vec![1.0, -0.6, -0.4]]).unwrap();
    let flow = FlowFields::steady(flux, vec![1.0; 3], vec![1.0; 3]);
    let tcc =
        ComponentField::from_components(CellLayout::serial(3), vec![vec![1.0, 0.0, 0.0]]).unwrap();
    let mut state = TransportState::new(tcc, flow);

    let mut transport = ExplicitTransport::new(TransportConfig::default(), Arc::new(mesh)).unwrap();
    assert_eq!(transport.updater_kind(), UpdaterKind::DonorUpwindNonManifold);
    transport.advance_step(&mut state, 0.0, 0.5).unwrap();

    let m1 = state.tcc.get(K0, 1);
    let m2 = state.tcc.get(K0, 2);
    assert!((m1 - 0.3).abs() < TOL);
    assert!((m2 - 0.2).abs() < TOL);
    assert!((m1 / (m1 + m2) - 0.6).abs() < TOL);

    // Same total as a manifold face carrying the same flux
    let pair = PolyMesh::new(CellLayout::serial(2), vec![1.0; 2], vec![vec![0, 1]], 1).unwrap();
    let flux = FluxSnapshot::from_face_fluxes(&pair, &[1.0]).unwrap();
    let flow = FlowFields::steady(flux, vec![1.0; 2], vec![1.0; 2]);
    let tcc = ComponentField::from_components(CellLayout::serial(2), vec![vec![1.0, 0.0]]).unwrap();
    let mut pair_state = TransportState::new(tcc, flow);
    let mut pair_transport =
        ExplicitTransport::new(TransportConfig::default(), Arc::new(pair)).unwrap();
    pair_transport.advance_step(&mut pair_state, 0.0, 0.5).unwrap();

    assert!((pair_state.tcc.get(K0, 1) - (m1 + m2)).abs() < TOL);
    assert!((pair_state.tcc.get(K0, 0) - state.tcc.get(K0, 0)).abs() < TOL);
}

// ============================================================================
// Scenario C: 3.5 stable steps
// ============================================================================

fn cycle_sizes(t_new: f64, dt_stable: f64, policy: TailPolicy) -> Vec<f64> {
    let mut controller = SubcycleController::new(0.0, t_new, dt_stable, policy);
    std::iter::from_fn(|| controller.next_cycle().map(|c| c.dt)).collect()
}

#[test]
fn test_remainder_tail_takes_full_steps() {
    let (mesh, mut state) = unit_column(4);
    let config = TransportConfig::default().with_tail_policy(TailPolicy::Remainder);
    let mut transport = ExplicitTransport::new(config, mesh).unwrap();

    let report = transport.advance_step(&mut state, 0.0, 3.5).unwrap();
    assert_eq!(report.dt_stable, 1.0);
    assert_eq!(report.n_subcycles, 4);
    assert_eq!(
        cycle_sizes(3.5, report.dt_stable, TailPolicy::Remainder),
        vec![1.0, 1.0, 1.0, 0.5]
    );
}

#[test]
fn test_balanced_tail_splits_remainder() {
    let (mesh, mut state) = unit_column(4);
    let mut transport = ExplicitTransport::new(TransportConfig::default(), mesh).unwrap();

    let report = transport.advance_step(&mut state, 0.0, 3.5).unwrap();
    assert_eq!(report.n_subcycles, 4);
    assert_eq!(
        cycle_sizes(3.5, report.dt_stable, TailPolicy::Balanced),
        vec![1.0, 1.0, 0.75, 0.75]
    );
}

#[test]
fn test_tail_policies_agree_on_final_state_bounds() {
    // Uniform concentration entering clean water: both policies keep the
    // solution within [0, 1].
    for policy in [TailPolicy::Balanced, TailPolicy::Remainder] {
        let (mesh, mut state) = unit_column(6);
        let config = TransportConfig::default().with_tail_policy(policy);
        let mut transport = ExplicitTransport::new(config, mesh).unwrap();
        transport.advance_step(&mut state, 0.0, 3.5).unwrap();

        for &c in state.tcc.owned(K0) {
            assert!((-TOL..=1.0 + TOL).contains(&c), "{:?}: {}", policy, c);
        }
        // Clean water reached the first cells only
        assert!(state.tcc.get(K0, 0) < 1e-12);
        assert!((state.tcc.get(K0, 5) - 1.0).abs() < TOL);
    }
}
