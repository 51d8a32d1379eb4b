//! Piecewise tabulated functions of a single variable.
//!
//! Used for time series of boundary concentrations and source rates.
//! Evaluation clamps outside the table and is left-continuous at the
//! breakpoints: at `x == x[j]` the segment ending at `x[j]` is used.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`TabularFunction`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// x and y tables differ in length.
    #[error("the number of x and y values differ ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },

    /// Fewer than two points.
    #[error("at least two table values must be given")]
    TooFewPoints,

    /// Abscissae are not strictly increasing.
    #[error("x values are not strictly increasing at index {0}")]
    NotIncreasing(usize),

    /// Form table does not have one entry per interval.
    #[error("incorrect number of form values: expected {expected}, got {actual}")]
    FormCount { expected: usize, actual: usize },
}

/// Interpolation form on one interval of the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularForm {
    /// Linear interpolation between the interval end points.
    #[default]
    Linear,
    /// Value of the left end point held over the interval.
    Constant,
}

/// Tabulated function `y(x)`.
///
/// # Example
/// ```
/// use porous_transport::functions::TabularFunction;
///
/// let f = TabularFunction::linear(vec![0.0, 10.0], vec![1.0, 3.0]).unwrap();
/// assert_eq!(f.eval(5.0), 2.0);
/// assert_eq!(f.eval(-1.0), 1.0);
/// assert_eq!(f.eval(20.0), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabularFunction {
    x: Vec<f64>,
    y: Vec<f64>,
    forms: Vec<TabularForm>,
}

impl TabularFunction {
    /// Create a table with explicit per-interval forms.
    pub fn new(x: Vec<f64>, y: Vec<f64>, forms: Vec<TabularForm>) -> Result<Self, FunctionError> {
        Self::check_args(&x, &y, &forms)?;
        Ok(Self { x, y, forms })
    }

    /// Create a table that interpolates linearly on every interval.
    pub fn linear(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FunctionError> {
        let forms = vec![TabularForm::Linear; x.len().saturating_sub(1)];
        Self::new(x, y, forms)
    }

    /// Create a piecewise-constant table.
    pub fn constant_steps(x: Vec<f64>, y: Vec<f64>) -> Result<Self, FunctionError> {
        let forms = vec![TabularForm::Constant; x.len().saturating_sub(1)];
        Self::new(x, y, forms)
    }

    fn check_args(x: &[f64], y: &[f64], forms: &[TabularForm]) -> Result<(), FunctionError> {
        if x.len() != y.len() {
            return Err(FunctionError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(FunctionError::TooFewPoints);
        }
        if let Some(j) = (1..x.len()).find(|&j| x[j] <= x[j - 1]) {
            return Err(FunctionError::NotIncreasing(j));
        }
        if forms.len() != x.len() - 1 {
            return Err(FunctionError::FormCount {
                expected: x.len() - 1,
                actual: forms.len(),
            });
        }
        Ok(())
    }

    /// Evaluate the function at `xv`.
    pub fn eval(&self, xv: f64) -> f64 {
        let n = self.x.len();
        if xv <= self.x[0] {
            return self.y[0];
        }
        if xv > self.x[n - 1] {
            return self.y[n - 1];
        }

        // Binary search for x[j1] < xv <= x[j2]
        let (mut j1, mut j2) = (0, n - 1);
        while j2 - j1 > 1 {
            let j = (j1 + j2) / 2;
            if xv > self.x[j] {
                j1 = j;
            } else {
                j2 = j;
            }
        }

        match self.forms[j1] {
            TabularForm::Linear => {
                let slope = (self.y[j2] - self.y[j1]) / (self.x[j2] - self.x[j1]);
                self.y[j1] + slope * (xv - self.x[j1])
            }
            TabularForm::Constant => self.y[j1],
        }
    }

    /// Breakpoints of the table.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Values at the breakpoints.
    pub fn y(&self) -> &[f64] {
        &self.y
    }
}
