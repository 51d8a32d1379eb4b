//! Prescribed inflow concentrations on boundary faces.

use crate::error::{Result, TransportError};
use crate::functions::TabularFunction;
use crate::mesh::TransportMesh;
use crate::types::ComponentIndex;

/// A set of boundary faces with prescribed concentrations for some components.
///
/// The controller calls [`compute`](TransportBoundary::compute) once per
/// sub-cycle (at its midpoint) and then reads the values while updating.
/// The concentration enters every downwind cell of the face carried by that
/// cell's share of the inflow.
pub trait TransportBoundary: Send + Sync {
    /// Evaluate the boundary data at `time`.
    fn compute(&mut self, time: f64);

    /// Boundary faces this condition applies to.
    fn faces(&self) -> &[usize];

    /// Components this condition prescribes.
    fn component_indices(&self) -> &[ComponentIndex];

    /// Concentration of component slot `j` on face slot `i`, valid after
    /// the last [`compute`](TransportBoundary::compute).
    fn value(&self, i: usize, j: usize) -> f64;

    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Check faces and components against the mesh and component count.
    fn validate(&self, mesh: &dyn TransportMesh, n_components: usize) -> Result<()> {
        if let Some(&f) = self.faces().iter().find(|&&f| f >= mesh.n_faces_owned()) {
            return Err(TransportError::Config(format!(
                "boundary '{}' references face {} beyond the {} owned faces",
                self.name(),
                f,
                mesh.n_faces_owned()
            )));
        }
        if let Some(k) = self
            .component_indices()
            .iter()
            .find(|k| k.get() >= n_components)
        {
            return Err(TransportError::Config(format!(
                "boundary '{}' references component {} of {}",
                self.name(),
                k,
                n_components
            )));
        }
        Ok(())
    }
}

/// Time-independent concentrations, the same on every face of the set.
#[derive(Clone, Debug)]
pub struct ConstantBoundary {
    faces: Vec<usize>,
    components: Vec<ComponentIndex>,
    values: Vec<f64>,
}

impl ConstantBoundary {
    /// Create from faces and `(component, concentration)` pairs.
    pub fn new(faces: Vec<usize>, values: Vec<(ComponentIndex, f64)>) -> Self {
        let (components, values) = values.into_iter().unzip();
        Self {
            faces,
            components,
            values,
        }
    }
}

impl TransportBoundary for ConstantBoundary {
    fn compute(&mut self, _time: f64) {}

    fn faces(&self) -> &[usize] {
        &self.faces
    }

    fn component_indices(&self) -> &[ComponentIndex] {
        &self.components
    }

    fn value(&self, _i: usize, j: usize) -> f64 {
        self.values[j]
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Concentrations following time series, the same on every face of the set.
#[derive(Clone, Debug)]
pub struct TabularBoundary {
    faces: Vec<usize>,
    components: Vec<ComponentIndex>,
    series: Vec<TabularFunction>,
    current: Vec<f64>,
}

impl TabularBoundary {
    /// Create from faces and one time series per component.
    pub fn new(faces: Vec<usize>, series: Vec<(ComponentIndex, TabularFunction)>) -> Self {
        let (components, series): (Vec<_>, Vec<_>) = series.into_iter().unzip();
        let current = vec![0.0; components.len()];
        Self {
            faces,
            components,
            series,
            current,
        }
    }
}

impl TransportBoundary for TabularBoundary {
    fn compute(&mut self, time: f64) {
        for (value, function) in self.current.iter_mut().zip(&self.series) {
            *value = function.eval(time);
        }
    }

    fn faces(&self) -> &[usize] {
        &self.faces
    }

    fn component_indices(&self) -> &[ComponentIndex] {
        &self.components
    }

    fn value(&self, _i: usize, j: usize) -> f64 {
        self.current[j]
    }

    fn name(&self) -> &'static str {
        "tabular"
    }
}
