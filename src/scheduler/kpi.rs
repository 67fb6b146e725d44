//! Timeline quality metrics (KPIs).
//!
//! Computes per-process and aggregate indicators from a finished timeline
//! and its input processes.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Response | First CPU start - arrival |
//! | Turnaround | Second CPU end - arrival |
//! | Waiting | Turnaround - (cpu1 + cpu2) |
//! | Total time | Latest completion |
//! | Idle time | Total time - CPU burst time |
//! | CPU efficiency | Burst time / total time |
//! | Throughput | Completed processes per 1000 time units |
//!
//! Waiting time counts the I/O burst as waiting.
//!
//! # Reference
//! Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", §5.2

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Process, Timeline};

/// Metrics of one scheduled process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    /// Process identifier.
    pub pid: String,
    /// First CPU start minus arrival.
    pub response: i64,
    /// Completion minus arrival.
    pub turnaround: i64,
    /// Turnaround minus total CPU demand.
    pub waiting: i64,
    /// First CPU start.
    pub start: i64,
    /// Completion (second CPU end).
    pub end: i64,
}

/// Aggregate metrics over a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Latest completion time (0 if empty).
    pub total_time: i64,
    /// `total_time - burst_time`.
    pub idle_time: i64,
    /// Sum of both CPU bursts over all processes.
    pub burst_time: i64,
    /// `burst_time / total_time` (0.0 if total_time ≤ 0).
    pub efficiency: f64,
    /// Completed processes per 1000 time units (0.0 if total_time ≤ 0).
    pub throughput: f64,
}

/// Result of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One row per finished process, in timeline order.
    pub per_process: Vec<ProcessMetrics>,
    /// Aggregates.
    pub totals: Totals,
}

impl AnalysisReport {
    /// Mean response time (0.0 if empty).
    pub fn average_response(&self) -> f64 {
        self.mean(|m| m.response)
    }

    /// Mean turnaround time (0.0 if empty).
    pub fn average_turnaround(&self) -> f64 {
        self.mean(|m| m.turnaround)
    }

    /// Mean waiting time (0.0 if empty).
    pub fn average_waiting(&self) -> f64 {
        self.mean(|m| m.waiting)
    }

    /// Metrics row for a pid.
    pub fn get(&self, pid: &str) -> Option<&ProcessMetrics> {
        self.per_process.iter().find(|m| m.pid == pid)
    }

    fn mean(&self, field: impl Fn(&ProcessMetrics) -> i64) -> f64 {
        if self.per_process.is_empty() {
            return 0.0;
        }
        let sum: i64 = self.per_process.iter().map(field).sum();
        sum as f64 / self.per_process.len() as f64
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8}{:>10}{:>12}{:>10}{:>8}{:>8}",
            "PID", "Response", "Turnaround", "Waiting", "Start", "End"
        )?;
        for m in &self.per_process {
            writeln!(
                f,
                "{:<8}{:>10}{:>12}{:>10}{:>8}{:>8}",
                m.pid, m.response, m.turnaround, m.waiting, m.start, m.end
            )?;
        }
        writeln!(
            f,
            "Average response: {:.2}  turnaround: {:.2}  waiting: {:.2}",
            self.average_response(),
            self.average_turnaround(),
            self.average_waiting()
        )?;
        let t = &self.totals;
        writeln!(
            f,
            "Total time: {}  Idle: {}  Burst: {}",
            t.total_time, t.idle_time, t.burst_time
        )?;
        write!(
            f,
            "CPU efficiency: {:.2}%  Throughput: {:.3} per 1000 units",
            t.efficiency * 100.0,
            t.throughput
        )
    }
}

/// Analyzes a timeline against its input processes.
///
/// Process fields are taken from `processes` by pid, falling back to the
/// copy inside the interval. Unfinished intervals are skipped.
///
/// # Example
///
/// ```
/// use cpu_sched_sim::models::Process;
/// use cpu_sched_sim::scheduler::{analyze, FcfsScheduler, Scheduler};
///
/// let processes = vec![Process::from_bursts("P1", 0, 4, 3, 5)];
/// let timeline = FcfsScheduler::new().schedule(&processes).unwrap();
/// let report = analyze(&timeline, &processes);
/// assert_eq!(report.per_process[0].waiting, 3);
/// assert_eq!(report.totals.idle_time, 3);
/// ```
pub fn analyze(timeline: &Timeline, processes: &[Process]) -> AnalysisReport {
    let by_pid: HashMap<&str, &Process> = processes.iter().map(|p| (p.pid.as_str(), p)).collect();

    let mut per_process = Vec::with_capacity(timeline.len());
    let mut burst_time: i64 = 0;

    for interval in timeline {
        let (Some(start), Some(end)) = (interval.start_time(), interval.end_time()) else {
            continue;
        };
        if !interval.finished {
            continue;
        }
        let process = by_pid
            .get(interval.process.pid.as_str())
            .copied()
            .unwrap_or(&interval.process);

        let demand = process.total_cpu_time();
        let turnaround = end - process.arrival_time;
        burst_time += demand;
        per_process.push(ProcessMetrics {
            pid: process.pid.clone(),
            response: start - process.arrival_time,
            turnaround,
            waiting: turnaround - demand,
            start,
            end,
        });
    }

    // Unfinished rows do not extend the horizon.
    let total_time = per_process.iter().map(|m| m.end).max().unwrap_or(0);
    let (efficiency, throughput) = if total_time > 0 {
        (
            burst_time as f64 / total_time as f64,
            per_process.len() as f64 * 1000.0 / total_time as f64,
        )
    } else {
        (0.0, 0.0)
    };

    AnalysisReport {
        per_process,
        totals: Totals {
            total_time,
            idle_time: total_time - burst_time,
            burst_time,
            efficiency,
            throughput,
        },
    }
}

/// Headline indicators of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineKpi {
    /// Latest completion time.
    pub makespan: i64,
    /// Mean response time.
    pub avg_response: f64,
    /// Mean turnaround time.
    pub avg_turnaround: f64,
    /// Mean waiting time.
    pub avg_waiting: f64,
    /// CPU efficiency (0.0..1.0 for non-overlapping timelines).
    pub efficiency: f64,
    /// Completed processes per 1000 time units.
    pub throughput: f64,
}

impl TimelineKpi {
    /// Computes the KPIs of a timeline.
    pub fn calculate(timeline: &Timeline, processes: &[Process]) -> Self {
        Self::from(&analyze(timeline, processes))
    }

    /// Whether the timeline meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_avg_waiting: f64, min_efficiency: f64) -> bool {
        self.avg_waiting <= max_avg_waiting && self.efficiency >= min_efficiency
    }
}

impl From<&AnalysisReport> for TimelineKpi {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            makespan: report.totals.total_time,
            avg_response: report.average_response(),
            avg_turnaround: report.average_turnaround(),
            avg_waiting: report.average_waiting(),
            efficiency: report.totals.efficiency,
            throughput: report.totals.throughput,
        }
    }
}
