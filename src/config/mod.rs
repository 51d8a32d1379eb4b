//! Transport engine configuration.
//!
//! [`TransportConfig`] carries the discretization choices (spatial and
//! temporal order, generic Runge-Kutta), the CFL safety factor, the split
//! of components into advected (aqueous) and passive (gaseous) ones, and the
//! sub-cycle tail policy. It deserializes from partial documents; missing
//! fields take their defaults.
//!
//! # Example
//! ```
//! use porous_transport::config::{TransportConfig, UpdaterKind};
//! use porous_transport::time::RkMethod;
//!
//! let config = TransportConfig::default()
//!     .with_spatial_order(2)
//!     .with_temporal_order(3)
//!     .with_generic_rk(true);
//!
//! let kind = UpdaterKind::select(&config, true).unwrap();
//! assert_eq!(kind, UpdaterKind::GenericRungeKutta(RkMethod::Tvd3));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};
use crate::time::RkMethod;

/// How the controller sizes the last sub-cycles of a macro step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// When less than two stable steps remain, split the remainder into two
    /// equal sub-cycles so the last one is never tiny.
    #[default]
    Balanced,
    /// Take stable steps until at most one remains, then one remainder step.
    Remainder,
}

/// Configuration of the explicit transport engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Spatial discretization order (1 or 2). Order 2 reconstructs limited
    /// linear face values and needs mesh centroids.
    pub spatial_order: u8,
    /// Temporal discretization order (1 to 4).
    pub temporal_order: u8,
    /// Use the generic explicit Runge-Kutta updater for second-order runs.
    pub generic_rk: bool,
    /// Safety factor applied to the stable time step, in (0, 1].
    pub cfl: f64,
    /// Number of advected (aqueous) components; they come first in the ordering.
    pub num_aqueous: usize,
    /// Number of passive (gaseous) components following the aqueous ones.
    pub num_gaseous: usize,
    /// Run consistency checks after every sub-cycle.
    pub internal_tests: bool,
    /// Sizing rule for the final sub-cycles.
    pub tail_policy: TailPolicy,
    /// Log per-step statistics at info level.
    pub verbose: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            spatial_order: 1,
            temporal_order: 1,
            generic_rk: false,
            cfl: 1.0,
            num_aqueous: 1,
            num_gaseous: 0,
            internal_tests: false,
            tail_policy: TailPolicy::Balanced,
            verbose: false,
        }
    }
}

impl TransportConfig {
    /// Set the spatial discretization order.
    pub fn with_spatial_order(mut self, order: u8) -> Self {
        self.spatial_order = order;
        self
    }

    /// Set the temporal discretization order.
    pub fn with_temporal_order(mut self, order: u8) -> Self {
        self.temporal_order = order;
        self
    }

    /// Enable or disable the generic Runge-Kutta updater.
    pub fn with_generic_rk(mut self, generic_rk: bool) -> Self {
        self.generic_rk = generic_rk;
        self
    }

    /// Set the CFL safety factor.
    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    /// Set the aqueous/gaseous component split.
    pub fn with_components(mut self, num_aqueous: usize, num_gaseous: usize) -> Self {
        self.num_aqueous = num_aqueous;
        self.num_gaseous = num_gaseous;
        self
    }

    /// Enable internal consistency checks.
    pub fn with_internal_tests(mut self, enabled: bool) -> Self {
        self.internal_tests = enabled;
        self
    }

    /// Set the tail policy.
    pub fn with_tail_policy(mut self, policy: TailPolicy) -> Self {
        self.tail_policy = policy;
        self
    }

    /// Total number of components (aqueous + gaseous).
    pub fn n_components(&self) -> usize {
        self.num_aqueous + self.num_gaseous
    }

    /// Check the configuration for invalid combinations.
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.spatial_order) {
            return Err(TransportError::Config(format!(
                "spatial discretization order must be 1 or 2, got {}",
                self.spatial_order
            )));
        }
        if !(1..=4).contains(&self.temporal_order) {
            return Err(TransportError::Config(format!(
                "temporal discretization order must be in 1..=4, got {}",
                self.temporal_order
            )));
        }
        if self.spatial_order == 2 && !self.generic_rk && self.temporal_order != 2 {
            return Err(TransportError::Config(format!(
                "second-order space requires temporal order 2 or the generic Runge-Kutta updater, got temporal order {}",
                self.temporal_order
            )));
        }
        if !(self.cfl > 0.0 && self.cfl <= 1.0) {
            return Err(TransportError::Config(format!(
                "cfl must lie in (0, 1], got {}",
                self.cfl
            )));
        }
        if self.num_aqueous == 0 {
            return Err(TransportError::Config(
                "at least one aqueous component is required".into(),
            ));
        }
        Ok(())
    }
}

/// Single-cycle update rule, chosen once at setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdaterKind {
    /// First-order donor upwind on manifold meshes.
    DonorUpwind,
    /// First-order donor upwind with flux splitting on non-manifold meshes.
    DonorUpwindNonManifold,
    /// Second-order predictor-corrector.
    PredictorCorrector,
    /// Generic explicit Runge-Kutta, component by component.
    GenericRungeKutta(RkMethod),
}

impl UpdaterKind {
    /// Select the updater for a validated configuration and mesh type.
    pub fn select(config: &TransportConfig, is_manifold: bool) -> Result<Self> {
        config.validate()?;
        let method = RkMethod::from_order(config.temporal_order)?;

        let kind = match (is_manifold, config.spatial_order) {
            (true, 1) => Self::DonorUpwind,
            (true, _) if config.generic_rk => Self::GenericRungeKutta(method),
            (true, _) => Self::PredictorCorrector,
            (false, 1) => Self::DonorUpwindNonManifold,
            (false, _) => Self::GenericRungeKutta(method),
        };
        Ok(kind)
    }

    /// Human-readable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DonorUpwind => "donor-upwind",
            Self::DonorUpwindNonManifold => "donor-upwind-non-manifold",
            Self::PredictorCorrector => "predictor-corrector",
            Self::GenericRungeKutta(_) => "generic-runge-kutta",
        }
    }
}
