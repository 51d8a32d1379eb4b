//! Error types for the transport engine.

use thiserror::Error;

use crate::functions::FunctionError;

/// Errors that can abort a transport macro step or its setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Invalid discretization settings, detected at setup.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The stable-step estimate is unusable (non-positive, non-finite, or empty pore volume).
    #[error("Stability fault (dt = {dt:e}): {reason}")]
    Stability { dt: f64, reason: String },

    /// A consistency check found an unphysical value after a sub-cycle.
    #[error("Conservation fault: component {component} in cell {cell} has value {value:e}")]
    Conservation {
        component: usize,
        cell: usize,
        value: f64,
    },

    /// Ghost layer sizes disagree between a buffer and the partition layout.
    #[error("Ghost exchange mismatch: expected {expected} cells, got {actual}")]
    Synchronization { expected: usize, actual: usize },

    /// Field or table sizes inconsistent with the mesh.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Invalid tabular function data.
    #[error(transparent)]
    Function(#[from] FunctionError),
}

impl TransportError {
    /// Create a stability fault.
    pub fn stability(dt: f64, reason: impl Into<String>) -> Self {
        Self::Stability {
            dt,
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error.
    pub fn dimension(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::Dimension {
            what,
            expected,
            actual,
        }
    }

    /// Check a length, returning a dimension error on mismatch.
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::dimension(what, expected, actual))
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransportError>;
