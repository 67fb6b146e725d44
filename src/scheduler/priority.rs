//! Priority scheduling (lower number = more important).
//!
//! # Non-preemptive
//!
//! Among the processes that have arrived, the most important one runs its
//! three phases chained from the clock. The clock then only advances to the
//! end of its first CPU burst, so the next pick happens while the previous
//! process is in I/O; windows of different processes may overlap.
//!
//! # Preemptive
//!
//! Time-stepped. I/O runs out of band: a process finishing CPU1 leaves the
//! CPU for the I/O set and comes back to the ready queue for CPU2 once its
//! I/O window has closed. Every tick the running process is interrupted if
//! a ready process has a strictly lower priority number. This is the only
//! policy where CPU and I/O of different processes overlap.
//!
//! Ties go to the earlier arrival, then to ready-queue order.

use std::collections::VecDeque;

use log::{debug, trace};

use super::arena::{Exhausted, IterationGuard, ProcessArena, Slot};
use super::Scheduler;
use crate::dispatching::rules::{EarliestArrival, HighestPriority};
use crate::dispatching::RuleEngine;
use crate::error::SimulationError;
use crate::models::{ExecutionInterval, Phase, Process, Timeline};

/// Priority scheduler, preemptive or not.
///
/// # Example
///
/// ```
/// use cpu_sched_sim::models::Process;
/// use cpu_sched_sim::scheduler::{PriorityScheduler, Scheduler};
///
/// let processes = vec![
///     Process::from_bursts("low", 0, 4, 0, 0).with_priority(5),
///     Process::from_bursts("high", 1, 2, 0, 0).with_priority(1),
/// ];
/// let timeline = PriorityScheduler::new(true).schedule(&processes).unwrap();
/// assert_eq!(timeline.get("high").unwrap().start_time(), Some(1));
/// assert_eq!(timeline.get("low").unwrap().end_time(), Some(6));
/// ```
#[derive(Debug, Clone)]
pub struct PriorityScheduler {
    preemptive: bool,
    engine: RuleEngine,
    max_iterations: u64,
}

impl PriorityScheduler {
    /// Creates the scheduler.
    pub fn new(preemptive: bool) -> Self {
        Self {
            preemptive,
            engine: RuleEngine::new()
                .with_rule(HighestPriority)
                .with_rule(EarliestArrival),
            max_iterations: 1_000_000,
        }
    }

    /// Sets the iteration allowance on top of the workload-derived bound.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Whether a more important process interrupts the running one.
    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    fn best(&self, arena: &ProcessArena, ready: &[Slot]) -> Option<usize> {
        self.engine
            .select_best(ready.iter().map(|&slot| arena.process(slot)))
    }

    fn run_non_preemptive(
        &self,
        arena: &mut ProcessArena,
        guard: &mut IterationGuard,
    ) -> Result<(), Exhausted> {
        let mut pending = arena.by_arrival();
        let mut ready: Vec<Slot> = Vec::new();
        let mut clock: i64 = 0;

        while !pending.is_empty() || !ready.is_empty() {
            guard.tick()?;
            admit(arena, &mut pending, &mut ready, clock);

            let Some(pos) = self.best(arena, &ready) else {
                if let Some(&next) = pending.front() {
                    clock = arena.process(next).arrival_time;
                }
                continue;
            };
            let slot = ready.remove(pos);

            let interval = ExecutionInterval::chained(arena.process(slot).clone(), clock);
            debug!("PRIORITY: dispatch {interval}");
            let cpu1_end = interval.cpu1.map_or(clock, |span| span.end);
            arena.place(slot, interval);
            clock = cpu1_end;
        }
        Ok(())
    }

    fn run_preemptive(
        &self,
        arena: &mut ProcessArena,
        guard: &mut IterationGuard,
    ) -> Result<(), Exhausted> {
        let mut pending = arena.by_arrival();
        let mut ready: Vec<Slot> = Vec::new();
        let mut in_io: Vec<Slot> = Vec::new();
        let mut running: Option<(Slot, Phase)> = None;
        let mut clock: i64 = 0;

        while !pending.is_empty() || !ready.is_empty() || !in_io.is_empty() || running.is_some() {
            guard.tick()?;
            admit(arena, &mut pending, &mut ready, clock);

            let (done, waiting): (Vec<Slot>, Vec<Slot>) = in_io
                .iter()
                .copied()
                .partition(|&slot| io_end(arena, slot).is_none_or(|end| end <= clock));
            in_io = waiting;
            for slot in done {
                if arena.remaining(slot).cpu2 > 0 {
                    ready.push(slot);
                } else {
                    arena.finish(slot);
                }
            }

            if let Some((current, phase)) = running {
                if let Some(pos) = self.best(arena, &ready) {
                    if arena.process(ready[pos]).priority < arena.process(current).priority {
                        debug!(
                            "PRIORITY-P t={clock}: {} preempts {} during {phase}",
                            arena.process(ready[pos]).pid,
                            arena.process(current).pid
                        );
                        ready.push(current);
                        running = None;
                    }
                }
            }

            while running.is_none() {
                let Some(pos) = self.best(arena, &ready) else {
                    break;
                };
                let slot = ready.remove(pos);
                running = open(arena, slot, &mut in_io, clock).map(|phase| (slot, phase));
            }

            let Some((slot, phase)) = running else {
                // Idle: skip to the next arrival or I/O completion.
                let next_arrival = pending.front().map(|&s| arena.process(s).arrival_time);
                let next_io = in_io.iter().filter_map(|&s| io_end(arena, s)).min();
                if let Some(next) = next_arrival.into_iter().chain(next_io).min() {
                    trace!("PRIORITY-P idle until t={next}");
                    clock = clock.max(next);
                }
                continue;
            };

            clock = arena.run(slot, phase, clock, 1);
            if arena.remaining(slot).get(phase) > 0 {
                continue;
            }

            running = None;
            let remaining = arena.remaining(slot);
            match phase {
                Phase::Cpu1 if remaining.io > 0 => {
                    arena.record(slot, Phase::Io, clock, clock.saturating_add(remaining.io));
                    arena.remaining_mut(slot).io = 0;
                    in_io.push(slot);
                }
                Phase::Cpu1 if remaining.cpu2 > 0 => ready.push(slot),
                _ => arena.finish(slot),
            }
        }
        Ok(())
    }
}

/// Opens the next phase of a freshly dispatched process.
///
/// Returns the CPU phase to run, or `None` if the process went straight to
/// I/O or had nothing left to do.
fn open(arena: &mut ProcessArena, slot: Slot, in_io: &mut Vec<Slot>, clock: i64) -> Option<Phase> {
    let remaining = arena.remaining(slot);
    if remaining.cpu1 > 0 {
        return Some(Phase::Cpu1);
    }
    if remaining.io > 0 {
        if arena.interval(slot).cpu1.is_none() {
            arena.record(slot, Phase::Cpu1, clock, clock);
        }
        arena.record(slot, Phase::Io, clock, clock.saturating_add(remaining.io));
        arena.remaining_mut(slot).io = 0;
        in_io.push(slot);
        return None;
    }
    if remaining.cpu2 > 0 {
        return Some(Phase::Cpu2);
    }
    if !arena.is_started(slot) {
        arena.record(slot, Phase::Cpu1, clock, clock);
    }
    arena.finish(slot);
    None
}

fn io_end(arena: &ProcessArena, slot: Slot) -> Option<i64> {
    arena.interval(slot).io.map(|span| span.end)
}

fn admit(arena: &ProcessArena, pending: &mut VecDeque<Slot>, ready: &mut Vec<Slot>, clock: i64) {
    while let Some(&slot) = pending.front() {
        if arena.process(slot).arrival_time > clock {
            break;
        }
        pending.pop_front();
        ready.push(slot);
    }
}

impl Scheduler for PriorityScheduler {
    fn name(&self) -> &'static str {
        if self.preemptive {
            "PRIORITY-P"
        } else {
            "PRIORITY"
        }
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let mut arena = ProcessArena::new(processes);
        let mut guard = IterationGuard::for_workload(self.name(), processes, self.max_iterations);
        let outcome = if self.preemptive {
            self.run_preemptive(&mut arena, &mut guard)
        } else {
            self.run_non_preemptive(&mut arena, &mut guard)
        };
        guard.conclude(arena, outcome)
    }
}
