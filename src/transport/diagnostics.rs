//! Solute statistics for logging and conservation comparisons.

use crate::mesh::TransportMesh;
use crate::parallel::Communicator;
use crate::state::ComponentField;
use crate::types::ComponentIndex;

/// Range and stored mass of one component over owned cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoluteExtrema {
    /// Component index.
    pub component: ComponentIndex,
    /// Minimum concentration.
    pub min: f64,
    /// Maximum concentration.
    pub max: f64,
    /// Stored mass `sum(V phi ws c)`.
    pub total_mass: f64,
}

/// Stored mass `sum(V phi ws c)` of every component over owned cells.
pub fn total_mass(
    field: &ComponentField,
    mesh: &dyn TransportMesh,
    porosity: &[f64],
    ws: &[f64],
) -> Vec<f64> {
    let n_owned = mesh.n_cells_owned();
    ComponentIndex::iter(field.n_components())
        .map(|k| {
            let values = field.component(k);
            (0..n_owned)
                .map(|c| values[c] * mesh.cell_volume(c) * porosity[c] * ws[c])
                .sum()
        })
        .collect()
}

/// Global extrema and stored mass of the first `n` components.
pub fn solute_extrema(
    field: &ComponentField,
    n: usize,
    mesh: &dyn TransportMesh,
    porosity: &[f64],
    ws: &[f64],
    comm: &dyn Communicator,
) -> Vec<SoluteExtrema> {
    let masses = total_mass(field, mesh, porosity, ws);
    ComponentIndex::iter(n.min(field.n_components()))
        .map(|k| {
            let (min, max) = field.owned_range(k);
            SoluteExtrema {
                component: k,
                min: comm.min_all(min),
                max: comm.max_all(max),
                total_mass: comm.sum_all(masses[k.get()]),
            }
        })
        .collect()
}
