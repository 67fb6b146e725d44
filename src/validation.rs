//! Input validation for process batches.
//!
//! Checks structural integrity of the processes before scheduling.
//! Detects:
//! - Duplicate pids
//! - Empty pids
//! - Negative arrival or burst times
//!
//! Schedulers accept any input; findings are advisory. Negative phase
//! durations are treated as zero by every policy.

use crate::models::Process;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two processes share the same pid.
    DuplicatePid,
    /// A process has an empty pid.
    EmptyPid,
    /// An arrival or burst time is negative.
    NegativeTime,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a batch of processes.
///
/// Checks:
/// 1. No empty pids
/// 2. No duplicate pids
/// 3. No negative arrival, CPU burst or I/O time
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_processes(processes: &[Process]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut pids = HashSet::new();

    for (idx, p) in processes.iter().enumerate() {
        if p.pid.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyPid,
                format!("Process #{} has an empty pid", idx + 1),
            ));
        } else if !pids.insert(p.pid.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicatePid,
                format!("Duplicate pid: {}", p.pid),
            ));
        }

        let fields = [
            ("arrival time", p.arrival_time),
            ("first CPU burst", p.cpu_burst_time1),
            ("I/O time", p.io_time),
            ("second CPU burst", p.cpu_burst_time2),
        ];
        for (field, value) in fields {
            if value < 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NegativeTime,
                    format!("Process '{}' has negative {field}: {value}", p.pid),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
