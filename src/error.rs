//! Error types.

use std::io;
use thiserror::Error;

use crate::models::Timeline;

/// Errors returned by a scheduler run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Round robin / feedback quanta must be at least one time unit.
    #[error("Time quantum must be positive, got {0}.")]
    InvalidQuantum(i64),
    /// The run did not settle within the configured iteration budget.
    ///
    /// Carries everything recorded up to the abort.
    #[error("{policy} exceeded {limit} iterations; returning partial timeline.")]
    IterationLimit {
        /// Short name of the policy that aborted.
        policy: &'static str,
        /// Configured iteration budget.
        limit: u64,
        /// Intervals recorded before the abort.
        partial: Box<Timeline>,
    },
}

impl SimulationError {
    /// The partial timeline, if the run was cut short.
    pub fn partial_timeline(&self) -> Option<&Timeline> {
        match self {
            SimulationError::IterationLimit { partial, .. } => Some(&**partial),
            SimulationError::InvalidQuantum(_) => None,
        }
    }
}

/// Errors reading or writing a workload file.
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error(
        "Line {line}: expected 4 or 5 fields (arrival cpu1 io cpu2 [priority]), found {found}."
    )]
    FieldCount { line: usize, found: usize },
    #[error("Line {line}: '{token}' is not a valid integer.")]
    InvalidNumber { line: usize, token: String },
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),
}
