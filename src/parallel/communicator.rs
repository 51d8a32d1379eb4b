//! Communicator trait and in-process implementations.

use crate::error::{Result, TransportError};
use crate::state::ComponentField;
use crate::types::{CellLayout, ComponentIndex};

/// Ghost exchange and global reductions.
pub trait Communicator: Send + Sync {
    /// Copy owned values into the ghost copies held by other partitions.
    fn scatter_to_ghosts(&self, layout: CellLayout, values: &mut [f64]) -> Result<()>;

    /// Add ghost contributions to the owning cells and clear the ghost entries.
    fn gather_ghosts_to_owners(&self, layout: CellLayout, values: &mut [f64]) -> Result<()>;

    /// Global minimum.
    fn min_all(&self, value: f64) -> f64;

    /// Global maximum.
    fn max_all(&self, value: f64) -> f64;

    /// Global sum.
    fn sum_all(&self, value: f64) -> f64;

    /// Scatter every component of a field.
    fn scatter_field(&self, field: &mut ComponentField) -> Result<()> {
        let layout = field.layout();
        for k in ComponentIndex::iter(field.n_components()) {
            self.scatter_to_ghosts(layout, field.component_mut(k))?;
        }
        Ok(())
    }
}

fn check_values(layout: CellLayout, values: &[f64]) -> Result<()> {
    if values.len() == layout.n_total() {
        Ok(())
    } else {
        Err(TransportError::Synchronization {
            expected: layout.n_total(),
            actual: values.len(),
        })
    }
}

/// Communicator for a single partition.
///
/// Reductions are the identity. Any ghost layer is a synchronization error
/// since there is no partition to exchange with.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialCommunicator;

impl SerialCommunicator {
    fn check_no_ghosts(layout: CellLayout, values: &[f64]) -> Result<()> {
        check_values(layout, values)?;
        if layout.n_ghost == 0 {
            Ok(())
        } else {
            Err(TransportError::Synchronization {
                expected: 0,
                actual: layout.n_ghost,
            })
        }
    }
}

impl Communicator for SerialCommunicator {
    fn scatter_to_ghosts(&self, layout: CellLayout, values: &mut [f64]) -> Result<()> {
        Self::check_no_ghosts(layout, values)
    }

    fn gather_ghosts_to_owners(&self, layout: CellLayout, values: &mut [f64]) -> Result<()> {
        Self::check_no_ghosts(layout, values)
    }

    fn min_all(&self, value: f64) -> f64 {
        value
    }

    fn max_all(&self, value: f64) -> f64 {
        value
    }

    fn sum_all(&self, value: f64) -> f64 {
        value
    }
}

/// Communicator whose ghost cells are images of owned cells of the same
/// partition.
///
/// `ghost_owner[g]` is the owned cell mirrored by ghost `n_owned + g`.
#[derive(Clone, Debug)]
pub struct LoopbackCommunicator {
    ghost_owner: Vec<usize>,
}

impl LoopbackCommunicator {
    /// Create from the owner of each ghost cell.
    pub fn new(ghost_owner: Vec<usize>) -> Self {
        Self { ghost_owner }
    }

    /// Ghost map of a periodic 1D ring (see [`crate::mesh::PolyMesh::periodic_1d`]).
    pub fn periodic_1d(n_cells: usize) -> Self {
        Self::new(vec![0, n_cells.saturating_sub(1)])
    }

    fn check(&self, layout: CellLayout, values: &[f64]) -> Result<()> {
        check_values(layout, values)?;
        if layout.n_ghost != self.ghost_owner.len() {
            return Err(TransportError::Synchronization {
                expected: self.ghost_owner.len(),
                actual: layout.n_ghost,
            });
        }
        if let Some(&owner) = self.ghost_owner.iter().find(|&&c| c >= layout.n_owned) {
            return Err(TransportError::Synchronization {
                expected: layout.n_owned,
                actual: owner,
            });
        }
        Ok(())
    }
}

impl Communicator for LoopbackCommunicator {
    fn scatter_to_ghosts(&self, layout: CellLayout, values: &mut [f64]) -> Result<()> {
        self.check(layout, values)?;
        for (g, &owner) in self.ghost_owner.iter().enumerate() {
            values[layout.n_owned + g] = values[owner];
        }
        Ok(())
    }

    fn gather_ghosts_to_owners(&self, layout: CellLayout, values: &mut [f64]) -> Result<()> {
        self.check(layout, values)?;
        for (g, &owner) in self.ghost_owner.iter().enumerate() {
            let ghost = layout.n_owned + g;
            values[owner] += values[ghost];
            values[ghost] = 0.0;
        }
        Ok(())
    }

    fn min_all(&self, value: f64) -> f64 {
        value
    }

    fn max_all(&self, value: f64) -> f64 {
        value
    }

    fn sum_all(&self, value: f64) -> f64 {
        value
    }
}
