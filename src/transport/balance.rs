//! Exact mass bookkeeping for conservation diagnostics.

/// Per-component record of solute mass added or removed by sources and
/// boundaries.
///
/// Sources are booked as `rate × dt` for every applied sub-cycle; boundary
/// exchange is booked as the net mass entering (positive) or leaving
/// (negative) through domain boundary faces. Comparing the stored mass
/// change against `exact() + boundary()` measures the conservation error
/// of the transport update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MassBalance {
    exact: Vec<f64>,
    boundary: Vec<f64>,
}

impl MassBalance {
    /// Create an empty balance for `n_components` components.
    pub fn new(n_components: usize) -> Self {
        Self {
            exact: vec![0.0; n_components],
            boundary: vec![0.0; n_components],
        }
    }

    /// Number of components tracked.
    pub fn n_components(&self) -> usize {
        self.exact.len()
    }

    /// Book source rates (mass per time, per component) applied over `dt`.
    pub fn add_source(&mut self, rates: &[f64], dt: f64) {
        for (total, rate) in self.exact.iter_mut().zip(rates) {
            *total += rate * dt;
        }
    }

    /// Book mass crossing the domain boundary for one component.
    #[inline]
    pub fn add_boundary(&mut self, component: usize, mass: f64) {
        self.boundary[component] += mass;
    }

    /// Accumulated source mass per component.
    pub fn exact(&self) -> &[f64] {
        &self.exact
    }

    /// Accumulated net boundary mass per component.
    pub fn boundary(&self) -> &[f64] {
        &self.boundary
    }

    /// Expected stored-mass change per component.
    pub fn expected_change(&self) -> Vec<f64> {
        self.exact
            .iter()
            .zip(&self.boundary)
            .map(|(s, b)| s + b)
            .collect()
    }

    /// Clear all totals.
    pub fn reset(&mut self) {
        self.exact.iter_mut().for_each(|v| *v = 0.0);
        self.boundary.iter_mut().for_each(|v| *v = 0.0);
    }
}
