//! Built-in dispatching rules.
//!
//! All rules return lower scores for processes that should run first.

use super::{DispatchingRule, RuleScore};
use crate::models::Process;

/// Shortest total CPU burst.
///
/// Scores by `cpu_burst_time1 + cpu_burst_time2`; I/O time is not part of
/// the ranking.
#[derive(Debug, Clone, Copy)]
pub struct ShortestCpuBurst;

impl DispatchingRule for ShortestCpuBurst {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        process.total_cpu_time()
    }

    fn description(&self) -> &'static str {
        "Shortest Job First (CPU bursts only)"
    }
}

/// Lowest priority number first.
#[derive(Debug, Clone, Copy)]
pub struct HighestPriority;

impl DispatchingRule for HighestPriority {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        RuleScore::from(process.priority)
    }

    fn description(&self) -> &'static str {
        "Lowest priority value first"
    }
}

/// Earliest arrival first.
#[derive(Debug, Clone, Copy)]
pub struct EarliestArrival;

impl DispatchingRule for EarliestArrival {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn evaluate(&self, process: &Process) -> RuleScore {
        process.arrival_time
    }

    fn description(&self) -> &'static str {
        "First In First Out (by arrival time)"
    }
}
