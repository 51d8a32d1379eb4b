//! Solute sources and sinks.

use std::ops::Range;

use crate::error::{Result, TransportError};
use crate::functions::TabularFunction;
use crate::mesh::TransportMesh;
use crate::state::ComponentField;
use crate::types::ComponentIndex;

/// Mass injection (positive) or extraction (negative) in a set of cells.
///
/// Rates are in mass per unit time per cell. The controller evaluates
/// sources at the end time of each sub-cycle.
pub trait TransportSource: Send + Sync {
    /// Evaluate the rates at `time`.
    fn compute(&mut self, time: f64);

    /// Cells this source acts on.
    fn cells(&self) -> &[usize];

    /// Components this source acts on.
    fn component_indices(&self) -> &[ComponentIndex];

    /// Rate of component slot `j` in cell slot `i`.
    fn rate(&self, i: usize, j: usize) -> f64;

    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Check cells and components against the mesh and component count.
    fn validate(&self, mesh: &dyn TransportMesh, n_components: usize) -> Result<()> {
        if let Some(&c) = self.cells().iter().find(|&&c| c >= mesh.n_cells()) {
            return Err(TransportError::Config(format!(
                "source '{}' references cell {} of {}",
                self.name(),
                c,
                mesh.n_cells()
            )));
        }
        if let Some(k) = self
            .component_indices()
            .iter()
            .find(|k| k.get() >= n_components)
        {
            return Err(TransportError::Config(format!(
                "source '{}' references component {} of {}",
                self.name(),
                k,
                n_components
            )));
        }
        Ok(())
    }
}

/// Add `factor × rate` of every source to the owned cells of `target`.
///
/// Only components inside `components` are touched. Returns the summed rate
/// per component (length `target.n_components()`) so the caller can book it
/// in the mass balance.
pub fn apply_sources(
    sources: &[Box<dyn TransportSource>],
    factor: f64,
    target: &mut ComponentField,
    components: Range<usize>,
) -> Vec<f64> {
    let n_owned = target.layout().n_owned;
    let mut totals = vec![0.0; target.n_components()];

    for source in sources {
        for (j, &k) in source.component_indices().iter().enumerate() {
            if !components.contains(&k.get()) {
                continue;
            }
            let values = target.component_mut(k);
            for (i, &cell) in source.cells().iter().enumerate() {
                if cell >= n_owned {
                    continue;
                }
                let rate = source.rate(i, j);
                values[cell] += factor * rate;
                totals[k.get()] += rate;
            }
        }
    }
    totals
}

/// Constant rates, one per component, applied to every listed cell.
#[derive(Clone, Debug)]
pub struct ConstantSource {
    cells: Vec<usize>,
    components: Vec<ComponentIndex>,
    rates: Vec<f64>,
}

impl ConstantSource {
    /// Create from cells and `(component, rate)` pairs.
    pub fn new(cells: Vec<usize>, rates: Vec<(ComponentIndex, f64)>) -> Self {
        let (components, rates) = rates.into_iter().unzip();
        Self {
            cells,
            components,
            rates,
        }
    }
}

impl TransportSource for ConstantSource {
    fn compute(&mut self, _time: f64) {}

    fn cells(&self) -> &[usize] {
        &self.cells
    }

    fn component_indices(&self) -> &[ComponentIndex] {
        &self.components
    }

    fn rate(&self, _i: usize, j: usize) -> f64 {
        self.rates[j]
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Rates following time series, applied to every listed cell.
#[derive(Clone, Debug)]
pub struct TabularSource {
    cells: Vec<usize>,
    components: Vec<ComponentIndex>,
    series: Vec<TabularFunction>,
    current: Vec<f64>,
}

impl TabularSource {
    /// Create from cells and one rate series per component.
    pub fn new(cells: Vec<usize>, series: Vec<(ComponentIndex, TabularFunction)>) -> Self {
        let (components, series): (Vec<_>, Vec<_>) = series.into_iter().unzip();
        let current = vec![0.0; components.len()];
        Self {
            cells,
            components,
            series,
            current,
        }
    }
}

impl TransportSource for TabularSource {
    fn compute(&mut self, time: f64) {
        for (value, function) in self.current.iter_mut().zip(&self.series) {
            *value = function.eval(time);
        }
    }

    fn cells(&self) -> &[usize] {
        &self.cells
    }

    fn component_indices(&self) -> &[ComponentIndex] {
        &self.components
    }

    fn rate(&self, _i: usize, j: usize) -> f64 {
        self.current[j]
    }

    fn name(&self) -> &'static str {
        "tabular"
    }
}
