//! Scheduling policies and timeline metrics.
//!
//! Six dispatch policies share one contract: take a batch of processes,
//! return a [`Timeline`]. Each run works on a private copy of its input.
//!
//! # Policies
//!
//! | Policy | Preemptive | I/O handling |
//! |--------|-----------|--------------|
//! | FCFS | no | chained after CPU1 |
//! | FCFS-Preemptive | on earlier arrival | ticked while holding the CPU |
//! | SJF | no | chained after CPU1 |
//! | Round Robin | quantum | journaled at CPU1 completion |
//! | MLFQ | quantum (8 → 16) | journaled at CPU1 completion |
//! | Priority | optional | chained, or out-of-band when preemptive |
//!
//! # KPI
//!
//! [`analyze`] turns a timeline into response, turnaround and waiting
//! times plus idle time, CPU efficiency and throughput.
//!
//! # Example
//!
//! ```
//! use cpu_sched_sim::models::Process;
//! use cpu_sched_sim::scheduler::{analyze, run_scheduler, Policy, SchedulerParams};
//!
//! let processes = vec![
//!     Process::from_bursts("P1", 0, 4, 3, 5),
//!     Process::from_bursts("P2", 2, 3, 2, 4),
//! ];
//! let timeline = run_scheduler(Policy::Fcfs, &processes, &SchedulerParams::default()).unwrap();
//! let report = analyze(&timeline, &processes);
//! assert_eq!(report.totals.total_time, 21);
//! ```

mod arena;
mod fcfs;
mod fcfs_preemptive;
mod kpi;
mod mlfq;
mod priority;
mod round_robin;
mod sjf;

pub use fcfs::FcfsScheduler;
pub use fcfs_preemptive::FcfsPreemptiveScheduler;
pub use kpi::{analyze, AnalysisReport, ProcessMetrics, TimelineKpi, Totals};
pub use mlfq::MlfqScheduler;
pub use priority::PriorityScheduler;
pub use round_robin::RoundRobinScheduler;
pub use sjf::SjfScheduler;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimulationError;
use crate::models::{Process, Timeline};
use crate::validation::validate_processes;

/// A CPU scheduling policy.
///
/// Implementations are stateless between runs: `schedule` copies the
/// input, simulates, and returns the finished timeline.
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Short policy name (e.g., "FCFS", "RR").
    fn name(&self) -> &'static str;

    /// Simulates the policy over `processes`.
    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError>;
}

/// Policy selector for [`run_scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// First come first served, in caller order.
    Fcfs,
    /// FCFS with earlier-arrival preemption.
    FcfsPreemptive,
    /// Non-preemptive shortest job first.
    Sjf,
    /// Round robin with `SchedulerParams::quantum`.
    RoundRobin,
    /// Two-tier multi-level feedback queue with FCFS fallback.
    Mlfq,
    /// Priority scheduling (lower number first).
    Priority {
        /// Whether a more important ready process interrupts the running one.
        preemptive: bool,
    },
}

impl Policy {
    /// All policies, non-preemptive priority before preemptive.
    pub const ALL: [Policy; 7] = [
        Policy::Fcfs,
        Policy::FcfsPreemptive,
        Policy::Sjf,
        Policy::RoundRobin,
        Policy::Mlfq,
        Policy::Priority { preemptive: false },
        Policy::Priority { preemptive: true },
    ];

    /// Builds the scheduler for this policy.
    pub fn scheduler(
        self,
        params: &SchedulerParams,
    ) -> Result<Box<dyn Scheduler>, SimulationError> {
        let limit = params.max_iterations;
        let scheduler: Box<dyn Scheduler> = match self {
            Policy::Fcfs => Box::new(FcfsScheduler::new()),
            Policy::FcfsPreemptive => {
                Box::new(FcfsPreemptiveScheduler::new().with_max_iterations(limit))
            }
            Policy::Sjf => Box::new(SjfScheduler::new()),
            Policy::RoundRobin => Box::new(
                RoundRobinScheduler::new(params.quantum)?
                    .with_max_iterations(limit),
            ),
            Policy::Mlfq => Box::new(
                MlfqScheduler::with_quanta(params.first_tier_quantum, params.second_tier_quantum)?
                    .with_max_iterations(limit),
            ),
            Policy::Priority { preemptive } => {
                Box::new(PriorityScheduler::new(preemptive).with_max_iterations(limit))
            }
        };
        Ok(scheduler)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "FCFS"),
            Policy::FcfsPreemptive => write!(f, "FCFS (Preemptive)"),
            Policy::Sjf => write!(f, "SJF"),
            Policy::RoundRobin => write!(f, "Round Robin"),
            Policy::Mlfq => write!(f, "MLFQ"),
            Policy::Priority { preemptive: false } => write!(f, "Priority (Non-preemptive)"),
            Policy::Priority { preemptive: true } => write!(f, "Priority (Preemptive)"),
        }
    }
}

/// Tunables shared by all policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerParams {
    /// Round robin time quantum.
    pub quantum: i64,
    /// MLFQ first-tier quantum.
    pub first_tier_quantum: i64,
    /// MLFQ second-tier quantum.
    pub second_tier_quantum: i64,
    /// Extra loop iterations allowed beyond the bound derived from the
    /// workload (one per unit of work plus a constant per process).
    pub max_iterations: u64,
}

impl SchedulerParams {
    /// Creates the default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the round robin quantum.
    pub fn with_quantum(mut self, quantum: i64) -> Self {
        self.quantum = quantum;
        self
    }

    /// Sets both MLFQ tier quanta.
    pub fn with_tier_quanta(mut self, first: i64, second: i64) -> Self {
        self.first_tier_quantum = first;
        self.second_tier_quantum = second;
        self
    }

    /// Sets the iteration allowance on top of the workload-derived bound.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            quantum: 4,
            first_tier_quantum: 8,
            second_tier_quantum: 16,
            max_iterations: 1_000_000,
        }
    }
}

/// Runs one policy over `processes`.
///
/// Validation findings are logged, not enforced: the engine simulates
/// whatever it is given and leaves presentation to the caller.
pub fn run_scheduler(
    policy: Policy,
    processes: &[Process],
    params: &SchedulerParams,
) -> Result<Timeline, SimulationError> {
    if let Err(findings) = validate_processes(processes) {
        for finding in &findings {
            warn!("{policy}: {}", finding.message);
        }
    }

    let scheduler = policy.scheduler(params)?;
    let timeline = scheduler.schedule(processes)?;
    debug!(
        "{policy}: scheduled {} of {} processes, makespan {}",
        timeline.len(),
        processes.len(),
        timeline.makespan()
    );
    Ok(timeline)
}
