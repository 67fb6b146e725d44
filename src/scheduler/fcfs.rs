//! First come, first served.
//!
//! # Algorithm
//!
//! 1. Take processes in the caller's order (no re-sorting).
//! 2. Start each one at its arrival, or at the previous completion if the
//!    CPU is still busy then.
//! 3. Chain CPU1 → I/O → CPU2 back to back; the next process waits for the
//!    whole chain.
//!
//! # Complexity
//! O(n).

use log::trace;

use super::Scheduler;
use crate::error::SimulationError;
use crate::models::{ExecutionInterval, Process, Timeline};

/// Non-preemptive FCFS over the caller-supplied order.
///
/// # Example
///
/// ```
/// use cpu_sched_sim::models::Process;
/// use cpu_sched_sim::scheduler::{FcfsScheduler, Scheduler};
///
/// let processes = vec![
///     Process::from_bursts("P1", 0, 4, 3, 5),
///     Process::from_bursts("P2", 2, 3, 2, 4),
/// ];
/// let timeline = FcfsScheduler::new().schedule(&processes).unwrap();
/// assert_eq!(timeline.get("P2").unwrap().start_time(), Some(12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FcfsScheduler;

impl FcfsScheduler {
    /// Creates the scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Chains `processes` in iteration order, starting no earlier than
    /// `prev_end` when given. Returns the timeline and the last completion.
    pub(crate) fn chain<'a, I>(processes: I, mut prev_end: Option<i64>) -> (Timeline, Option<i64>)
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let mut timeline = Timeline::new();
        for process in processes {
            let start = match prev_end {
                Some(busy_until) if process.arrival_time < busy_until => busy_until,
                _ => process.arrival_time,
            };
            let interval = ExecutionInterval::chained(process.clone(), start);
            trace!("FCFS: {}", interval);

            prev_end = interval.end_time();
            timeline.push(interval);
        }
        (timeline, prev_end)
    }
}

impl Scheduler for FcfsScheduler {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let (timeline, _) = Self::chain(processes, None);
        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Span;

    fn sample_processes() -> Vec<Process> {
        vec![
            Process::from_bursts("P1", 0, 4, 3, 5),
            Process::from_bursts("P2", 2, 3, 2, 4),
            Process::from_bursts("P3", 5, 2, 4, 3),
        ]
    }

    #[test]
    fn test_fcfs_reference_scenario() {
        let timeline = FcfsScheduler::new().schedule(&sample_processes()).unwrap();
        assert_eq!(timeline.pids(), vec!["P1", "P2", "P3"]);

        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.cpu1, Some(Span::new(0, 4)));
        assert_eq!(p1.io, Some(Span::new(4, 7)));
        assert_eq!(p1.cpu2, Some(Span::new(7, 12)));

        let p2 = timeline.get("P2").unwrap();
        assert_eq!(p2.cpu1, Some(Span::new(12, 15)));
        assert_eq!(p2.io, Some(Span::new(15, 17)));
        assert_eq!(p2.cpu2, Some(Span::new(17, 21)));

        let p3 = timeline.get("P3").unwrap();
        assert_eq!(p3.cpu1, Some(Span::new(21, 23)));
        assert_eq!(p3.io, Some(Span::new(23, 27)));
        assert_eq!(p3.cpu2, Some(Span::new(27, 30)));
    }

    #[test]
    fn test_fcfs_keeps_input_order() {
        // P2 is listed first despite arriving later
        let processes = vec![
            Process::from_bursts("P2", 3, 1, 0, 1),
            Process::from_bursts("P1", 0, 2, 0, 0),
        ];
        let timeline = FcfsScheduler::new().schedule(&processes).unwrap();
        assert_eq!(timeline.pids(), vec!["P2", "P1"]);
        assert_eq!(timeline.get("P2").unwrap().start_time(), Some(3));
        // P1 arrived at 0 < 5, so it waits for P2
        assert_eq!(timeline.get("P1").unwrap().start_time(), Some(5));
    }

    #[test]
    fn test_fcfs_idle_gap() {
        let processes = vec![
            Process::from_bursts("P1", 0, 2, 1, 1),
            Process::from_bursts("P2", 10, 1, 1, 1),
        ];
        let timeline = FcfsScheduler::new().schedule(&processes).unwrap();
        assert_eq!(timeline.get("P2").unwrap().start_time(), Some(10));
        assert_eq!(timeline.makespan(), 13);
    }

    #[test]
    fn test_fcfs_zero_second_burst() {
        let processes = vec![Process::from_bursts("P1", 0, 3, 2, 0)];
        let timeline = FcfsScheduler::new().schedule(&processes).unwrap();
        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.cpu2, Some(Span::instant(5)));
        assert_eq!(p1.end_time(), Some(5));
    }

    #[test]
    fn test_chain_from_busy_clock() {
        let processes = sample_processes();
        let (timeline, last) = FcfsScheduler::chain(&processes[..1], Some(20));
        assert_eq!(timeline.entries[0].start_time(), Some(20));
        assert_eq!(last, Some(32));
    }
}
