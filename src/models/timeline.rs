//! Timeline (simulation result) model.
//!
//! A timeline is the ordered set of execution intervals produced by one
//! scheduler run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ExecutionInterval;

/// The result of one scheduler run.
///
/// Entries are ordered by the moment each process's first phase began.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Execution intervals in first-dispatch order.
    pub entries: Vec<ExecutionInterval>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interval.
    pub fn push(&mut self, interval: ExecutionInterval) {
        self.entries.push(interval);
    }

    /// Finds the interval for a process.
    pub fn get(&self, pid: &str) -> Option<&ExecutionInterval> {
        self.entries.iter().find(|e| e.process.pid == pid)
    }

    /// Whether a process has an interval.
    pub fn contains(&self, pid: &str) -> bool {
        self.get(pid).is_some()
    }

    /// Latest completion time across all entries (0 if empty).
    pub fn makespan(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(ExecutionInterval::end_time)
            .max()
            .unwrap_or(0)
    }

    /// Pids in timeline order.
    pub fn pids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.process.pid.as_str()).collect()
    }

    /// Whether every entry has finished.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.finished)
    }

    /// Iterates over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionInterval> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a ExecutionInterval;
    type IntoIter = std::slice::Iter<'a, ExecutionInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
