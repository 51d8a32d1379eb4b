//! Trait-based explicit Runge-Kutta integration.
//!
//! This module provides:
//! - [`Integrable`]: vector space operations needed by explicit integrators
//! - [`IntegratorInfo`]: non-generic, dyn-compatible integrator metadata
//! - [`ExplicitRungeKutta`]: a Butcher-tableau driven stepper
//! - [`RkMethod`]: the built-in methods (forward Euler, Heun, TVD-RK3, classical RK4)
//!
//! The RHS closure is fallible so that evaluators which perform ghost
//! exchanges can abort the step.
//!
//! # Example
//! ```
//! use porous_transport::time::{ExplicitRungeKutta, RkMethod};
//!
//! // du/dt = -u with u(0) = 1
//! let rk = ExplicitRungeKutta::new(RkMethod::Rk4);
//! let mut u = vec![1.0_f64];
//! rk.step(&mut u, 0.1, 0.0, |state: &Vec<f64>, _t| {
//!     state.iter().map(|v| -v).collect()
//! });
//! assert!((u[0] - (-0.1_f64).exp()).abs() < 1e-6);
//! ```

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransportError};

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for state types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the state by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Create a zero-initialized state with the same shape.
    ///
    /// Default implementation clones and scales by zero.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

impl Integrable for Vec<f64> {
    fn scale(&mut self, c: f64) {
        for v in self.iter_mut() {
            *v *= c;
        }
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (v, o) in self.iter_mut().zip(other) {
            *v += c * o;
        }
    }

    fn zeros_like(&self) -> Self {
        vec![0.0; self.len()]
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving (SSP).
    fn is_ssp(&self) -> bool;

    /// Times at which RHS is evaluated relative to current time.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// Butcher tableaux
// =============================================================================

/// Built-in explicit Runge-Kutta methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RkMethod {
    /// Forward Euler (1st order).
    #[default]
    ForwardEuler,
    /// Heun's method (2nd order).
    HeunEuler,
    /// Shu-Osher TVD Runge-Kutta (3rd order).
    Tvd3,
    /// Classical Runge-Kutta (4th order).
    Rk4,
}

impl RkMethod {
    /// Select the method matching a temporal discretization order.
    pub fn from_order(order: u8) -> Result<Self> {
        match order {
            1 => Ok(Self::ForwardEuler),
            2 => Ok(Self::HeunEuler),
            3 => Ok(Self::Tvd3),
            4 => Ok(Self::Rk4),
            _ => Err(TransportError::Config(format!(
                "no explicit Runge-Kutta method of order {}",
                order
            ))),
        }
    }

    /// Butcher tableau `(a, b, c)` with `a` stored row by row (strictly lower).
    fn tableau(&self) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
        match self {
            Self::ForwardEuler => (vec![vec![]], vec![1.0], vec![0.0]),
            Self::HeunEuler => (vec![vec![], vec![1.0]], vec![0.5, 0.5], vec![0.0, 1.0]),
            Self::Tvd3 => (
                vec![vec![], vec![1.0], vec![0.25, 0.25]],
                vec![1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0],
                vec![0.0, 1.0, 0.5],
            ),
            Self::Rk4 => (
                vec![vec![], vec![0.5], vec![0.0, 0.5], vec![0.0, 0.0, 1.0]],
                vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
                vec![0.0, 0.5, 0.5, 1.0],
            ),
        }
    }
}

// =============================================================================
// Explicit Runge-Kutta
// =============================================================================

/// Explicit Runge-Kutta integrator driven by a Butcher tableau.
///
/// Stage `i` evaluates `k_i = L(u + dt * sum_j a_ij k_j, t + c_i dt)`;
/// the update is `u <- u + dt * sum_i b_i k_i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplicitRungeKutta {
    method: RkMethod,
    a: Vec<Vec<f64>>,
    b: Vec<f64>,
    c: Vec<f64>,
}

impl ExplicitRungeKutta {
    /// Create an integrator for one of the built-in methods.
    pub fn new(method: RkMethod) -> Self {
        let (a, b, c) = method.tableau();
        Self { method, a, b, c }
    }

    /// The method this integrator implements.
    pub fn method(&self) -> RkMethod {
        self.method
    }

    /// Stage weights `b`.
    pub fn weights(&self) -> &[f64] {
        &self.b
    }

    /// Advance `state` by one step with a fallible RHS.
    ///
    /// # Arguments
    /// * `state` - State to advance (modified in place)
    /// * `dt` - Time step size
    /// * `t` - Current time
    /// * `rhs` - Function computing the time derivative: f(state, time)
    pub fn try_step<S, F, E>(&self, state: &mut S, dt: f64, t: f64, mut rhs: F) -> std::result::Result<(), E>
    where
        S: Integrable,
        F: FnMut(&S, f64) -> std::result::Result<S, E>,
    {
        let mut stages: Vec<S> = Vec::with_capacity(self.b.len());

        for (i, row) in self.a.iter().enumerate() {
            let k = if i == 0 {
                rhs(state, t)?
            } else {
                let mut u_stage = state.clone();
                for (a_ij, k_j) in row.iter().zip(&stages) {
                    if *a_ij != 0.0 {
                        u_stage.axpy(dt * a_ij, k_j);
                    }
                }
                rhs(&u_stage, t + self.c[i] * dt)?
            };
            stages.push(k);
        }

        for (b_i, k_i) in self.b.iter().zip(&stages) {
            state.axpy(dt * b_i, k_i);
        }
        Ok(())
    }

    /// Advance `state` by one step with an infallible RHS.
    pub fn step<S, F>(&self, state: &mut S, dt: f64, t: f64, rhs: F)
    where
        S: Integrable,
        F: Fn(&S, f64) -> S,
    {
        let result: std::result::Result<(), Infallible> =
            self.try_step(state, dt, t, |s, time| Ok(rhs(s, time)));
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

impl IntegratorInfo for ExplicitRungeKutta {
    fn name(&self) -> &'static str {
        match self.method {
            RkMethod::ForwardEuler => "forward-euler",
            RkMethod::HeunEuler => "heun-euler",
            RkMethod::Tvd3 => "tvd-rk3",
            RkMethod::Rk4 => "rk4",
        }
    }

    fn order(&self) -> usize {
        match self.method {
            RkMethod::ForwardEuler => 1,
            RkMethod::HeunEuler => 2,
            RkMethod::Tvd3 => 3,
            RkMethod::Rk4 => 4,
        }
    }

    fn n_stages(&self) -> usize {
        self.b.len()
    }

    fn is_ssp(&self) -> bool {
        matches!(
            self.method,
            RkMethod::ForwardEuler | RkMethod::HeunEuler | RkMethod::Tvd3
        )
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        self.c.iter().map(|c| c * dt).collect()
    }
}
