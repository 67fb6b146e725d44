//! FCFS with earlier-arrival preemption.
//!
//! # Algorithm
//!
//! Time-stepped, one unit per iteration:
//! 1. Admit every process with `arrival_time ≤ clock` (arrival order). An
//!    admitted process that arrived strictly earlier than the running one
//!    preempts it; the preempted process re-enters the ready queue first,
//!    keeping the remaining work of its interrupted phase.
//! 2. When idle, pop the ready-queue head and open its earliest phase with
//!    work left (CPU1 → I/O → CPU2).
//! 3. Run one unit of the open phase; when it reaches zero, move on to the
//!    next phase with work left or finish the process.
//!
//! The running process keeps the CPU through its I/O phase. Because
//! admission is in arrival order, a newcomer can only preempt a process
//! that arrived after it, so with well-formed input the trigger rarely fires.

use std::collections::VecDeque;

use log::{debug, trace};

use super::arena::{Exhausted, IterationGuard, ProcessArena, Slot};
use super::Scheduler;
use crate::error::SimulationError;
use crate::models::{Phase, Process, Timeline};

/// Time-stepped FCFS with earlier-arrival preemption.
#[derive(Debug, Clone)]
pub struct FcfsPreemptiveScheduler {
    max_iterations: u64,
}

impl FcfsPreemptiveScheduler {
    /// Creates the scheduler with the default iteration allowance.
    pub fn new() -> Self {
        Self {
            max_iterations: 1_000_000,
        }
    }

    /// Sets the iteration allowance on top of the workload-derived bound.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn simulate(
        &self,
        arena: &mut ProcessArena,
        guard: &mut IterationGuard,
    ) -> Result<(), Exhausted> {
        let mut pending = arena.by_arrival();
        let mut ready: VecDeque<Slot> = VecDeque::new();
        let mut running: Option<(Slot, Phase)> = None;
        let mut clock: i64 = 0;

        while !pending.is_empty() || !ready.is_empty() || running.is_some() {
            guard.tick()?;

            while let Some(&slot) = pending.front() {
                let arrival = arena.process(slot).arrival_time;
                if arrival > clock {
                    break;
                }
                pending.pop_front();

                if let Some((current, phase)) = running {
                    if arrival < arena.process(current).arrival_time {
                        debug!(
                            "FCFS-P t={clock}: {} preempts {} during {phase}",
                            arena.process(slot).pid,
                            arena.process(current).pid
                        );
                        ready.push_back(current);
                        running = None;
                    }
                }
                ready.push_back(slot);
            }

            while running.is_none() {
                let Some(slot) = ready.pop_front() else {
                    break;
                };
                match arena.remaining(slot).next_phase() {
                    Some(phase) => {
                        trace!(
                            "FCFS-P t={clock}: dispatch {} ({phase})",
                            arena.process(slot).pid
                        );
                        running = Some((slot, phase));
                    }
                    None => {
                        if !arena.is_started(slot) {
                            arena.record(slot, Phase::Cpu1, clock, clock);
                        }
                        arena.finish(slot);
                    }
                }
            }

            match running {
                Some((slot, phase)) => {
                    arena.run(slot, phase, clock, 1);
                    if arena.remaining(slot).get(phase) <= 0 {
                        running = match arena.remaining(slot).next_after(phase) {
                            Some(next) => Some((slot, next)),
                            None => {
                                arena.finish(slot);
                                None
                            }
                        };
                    }
                    clock = clock.saturating_add(1);
                }
                None => {
                    // Idle: nothing changes until the next arrival.
                    if let Some(&next) = pending.front() {
                        clock = clock.max(arena.process(next).arrival_time);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for FcfsPreemptiveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FcfsPreemptiveScheduler {
    fn name(&self) -> &'static str {
        "FCFS-P"
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let mut arena = ProcessArena::new(processes);
        let mut guard = IterationGuard::for_workload(self.name(), processes, self.max_iterations);
        let outcome = self.simulate(&mut arena, &mut guard);
        guard.conclude(arena, outcome)
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
    fn test_holds_cpu_through_io() {
        let timeline = FcfsPreemptiveScheduler::new()
            .schedule(&sample_processes())
            .unwrap();
        assert_eq!(timeline.pids(), vec!["P1", "P2", "P3"]);

        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.cpu1, Some(Span::new(0, 4)));
        assert_eq!(p1.io, Some(Span::new(4, 7)));
        assert_eq!(p1.cpu2, Some(Span::new(7, 12)));

        let p2 = timeline.get("P2").unwrap();
        assert_eq!(p2.cpu1, Some(Span::new(12, 15)));
        assert_eq!(p2.cpu2, Some(Span::new(17, 21)));

        let p3 = timeline.get("P3").unwrap();
        assert_eq!(p3.end_time(), Some(30));
        assert!(timeline.is_complete());
    }

    #[test]
    fn test_sorts_by_arrival() {
        let processes = vec![
            Process::from_bursts("late", 4, 1, 0, 1),
            Process::from_bursts("early", 0, 2, 0, 0),
        ];
        let timeline = FcfsPreemptiveScheduler::new().schedule(&processes).unwrap();
        assert_eq!(timeline.pids(), vec!["early", "late"]);
        assert_eq!(timeline.get("late").unwrap().cpu1, Some(Span::new(4, 5)));
        assert_eq!(timeline.get("late").unwrap().cpu2, Some(Span::new(5, 6)));
    }

    #[test]
    fn test_skips_empty_phases() {
        let processes = vec![
            Process::from_bursts("io_first", 0, 0, 3, 2),
            Process::from_bursts("no_io", 0, 2, 0, 1),
        ];
        let timeline = FcfsPreemptiveScheduler::new().schedule(&processes).unwrap();

        let io_first = timeline.get("io_first").unwrap();
        assert_eq!(io_first.cpu1, Some(Span::instant(0)));
        assert_eq!(io_first.io, Some(Span::new(0, 3)));
        assert_eq!(io_first.cpu2, Some(Span::new(3, 5)));

        let no_io = timeline.get("no_io").unwrap();
        assert_eq!(no_io.cpu1, Some(Span::new(5, 7)));
        assert_eq!(no_io.io, Some(Span::instant(7)));
        assert_eq!(no_io.cpu2, Some(Span::new(7, 8)));
    }

    #[test]
    fn test_process_without_work_completes_immediately() {
        let processes = vec![
            Process::from_bursts("empty", 0, 0, 0, 0),
            Process::from_bursts("P1", 0, 2, 0, 0),
        ];
        let timeline = FcfsPreemptiveScheduler::new().schedule(&processes).unwrap();
        let empty = timeline.get("empty").unwrap();
        assert_eq!(empty.start_time(), Some(0));
        assert_eq!(empty.end_time(), Some(0));
        assert_eq!(timeline.get("P1").unwrap().cpu1, Some(Span::new(0, 2)));
    }

    #[test]
    fn test_idle_until_first_arrival() {
        let processes = vec![Process::from_bursts("P1", 50, 1, 1, 1)];
        let timeline = FcfsPreemptiveScheduler::new()
            .with_max_iterations(10)
            .schedule(&processes)
            .unwrap();
        assert_eq!(timeline.get("P1").unwrap().start_time(), Some(50));
        assert_eq!(timeline.makespan(), 53);
    }

    #[test]
    fn test_long_burst_beyond_default_allowance() {
        let processes = vec![
            Process::from_bursts("P1", 0, 1_500_000, 0, 0),
            Process::from_bursts("P2", 3, 1, 0, 0),
        ];
        let timeline = FcfsPreemptiveScheduler::new()
            .with_max_iterations(0)
            .schedule(&processes)
            .unwrap();
        assert_eq!(
            timeline.get("P1").unwrap().cpu1,
            Some(Span::new(0, 1_500_000))
        );
        assert_eq!(
            timeline.get("P2").unwrap().cpu1,
            Some(Span::new(1_500_000, 1_500_001))
        );
        assert!(timeline.is_complete());
    }
}
