//! Per-run in-flight process state.
//!
//! Every scheduler run copies its input into a [`ProcessArena`]: one slot
//! per input process holding the remaining work of each phase and the
//! execution record being built. Queues hold slot indices, so a record is
//! updated in place without searching the timeline, and the caller's
//! processes are never touched.

use std::collections::VecDeque;

use log::warn;

use crate::error::SimulationError;
use crate::models::{ExecutionInterval, Phase, Process, Timeline};

/// Index of a process inside an arena.
pub(crate) type Slot = usize;

/// Work left in each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Remaining {
    pub cpu1: i64,
    pub io: i64,
    pub cpu2: i64,
}

impl Remaining {
    fn of(process: &Process) -> Self {
        Self {
            cpu1: process.cpu_burst_time1,
            io: process.io_time,
            cpu2: process.cpu_burst_time2,
        }
    }

    pub fn get(&self, phase: Phase) -> i64 {
        match phase {
            Phase::Cpu1 => self.cpu1,
            Phase::Io => self.io,
            Phase::Cpu2 => self.cpu2,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut i64 {
        match phase {
            Phase::Cpu1 => &mut self.cpu1,
            Phase::Io => &mut self.io,
            Phase::Cpu2 => &mut self.cpu2,
        }
    }

    /// Earliest phase with work left. Non-positive durations count as done.
    pub fn next_phase(&self) -> Option<Phase> {
        [Phase::Cpu1, Phase::Io, Phase::Cpu2]
            .into_iter()
            .find(|&phase| self.get(phase) > 0)
    }

    /// Phase after `phase` with work left.
    pub fn next_after(&self, phase: Phase) -> Option<Phase> {
        let later: &[Phase] = match phase {
            Phase::Cpu1 => &[Phase::Io, Phase::Cpu2],
            Phase::Io => &[Phase::Cpu2],
            Phase::Cpu2 => &[],
        };
        later.iter().copied().find(|&p| self.get(p) > 0)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    remaining: Remaining,
    interval: ExecutionInterval,
    started: bool,
}

/// Owned in-flight records for one scheduler run.
#[derive(Debug, Clone)]
pub(crate) struct ProcessArena {
    entries: Vec<Entry>,
    /// Slots in the order their first phase began.
    order: Vec<Slot>,
}

impl ProcessArena {
    pub fn new(processes: &[Process]) -> Self {
        let entries = processes
            .iter()
            .map(|p| Entry {
                remaining: Remaining::of(p),
                interval: ExecutionInterval::new(p.clone()),
                started: false,
            })
            .collect();
        Self {
            entries,
            order: Vec::new(),
        }
    }

    /// Slots in input order.
    pub fn slots(&self) -> std::ops::Range<Slot> {
        0..self.entries.len()
    }

    /// Slots sorted by arrival time; equal arrivals keep input order.
    pub fn by_arrival(&self) -> VecDeque<Slot> {
        let mut slots: Vec<Slot> = self.slots().collect();
        slots.sort_by_key(|&s| self.process(s).arrival_time);
        slots.into()
    }

    pub fn process(&self, slot: Slot) -> &Process {
        &self.entries[slot].interval.process
    }

    pub fn remaining(&self, slot: Slot) -> Remaining {
        self.entries[slot].remaining
    }

    pub fn remaining_mut(&mut self, slot: Slot) -> &mut Remaining {
        &mut self.entries[slot].remaining
    }

    pub fn interval(&self, slot: Slot) -> &ExecutionInterval {
        &self.entries[slot].interval
    }

    pub fn is_started(&self, slot: Slot) -> bool {
        self.entries[slot].started
    }

    /// Records `phase` activity on `[start, end]` without touching the
    /// remaining-work counters.
    pub fn record(&mut self, slot: Slot, phase: Phase, start: i64, end: i64) {
        let entry = &mut self.entries[slot];
        if !entry.started {
            entry.started = true;
            self.order.push(slot);
        }
        entry.interval.record(phase, start, end);
    }

    /// Executes `units` of `phase` starting at `start`; returns the end time.
    pub fn run(&mut self, slot: Slot, phase: Phase, start: i64, units: i64) -> i64 {
        let end = start.saturating_add(units);
        self.record(slot, phase, start, end);
        *self.entries[slot].remaining.get_mut(phase) -= units;
        end
    }

    /// Installs a fully built record, e.g. from a chained dispatch.
    pub fn place(&mut self, slot: Slot, interval: ExecutionInterval) {
        let entry = &mut self.entries[slot];
        if !entry.started {
            entry.started = true;
            self.order.push(slot);
        }
        entry.remaining = Remaining {
            cpu1: 0,
            io: 0,
            cpu2: 0,
        };
        entry.interval = interval;
    }

    /// Marks a record finished, filling phases that never ran.
    pub fn finish(&mut self, slot: Slot) {
        self.entries[slot].interval.seal();
    }

    /// Builds the timeline from every started record, in start order.
    pub fn into_timeline(mut self) -> Timeline {
        let mut timeline = Timeline::new();
        for slot in std::mem::take(&mut self.order) {
            let interval = std::mem::replace(
                &mut self.entries[slot].interval,
                ExecutionInterval::new(Process::new("")),
            );
            timeline.push(interval);
        }
        timeline
    }
}

/// Marker returned when a run uses up its iteration budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Exhausted;

/// Upper bound on simulation loop iterations for one run.
///
/// Well-formed input always terminates, so the limit is derived from the
/// workload: one iteration per unit of work plus a constant per process for
/// zero-length phases and idle jumps. `allowance` is added on top.
#[derive(Debug, Clone)]
pub(crate) struct IterationGuard {
    policy: &'static str,
    limit: u64,
    used: u64,
}

impl IterationGuard {
    pub fn new(policy: &'static str, limit: u64) -> Self {
        Self {
            policy,
            limit,
            used: 0,
        }
    }

    /// Guard sized for `processes` plus `allowance` extra iterations.
    pub fn for_workload(policy: &'static str, processes: &[Process], allowance: u64) -> Self {
        Self::new(policy, work_bound(processes).saturating_add(allowance))
    }

    /// Consumes one iteration.
    pub fn tick(&mut self) -> Result<(), Exhausted> {
        if self.used >= self.limit {
            return Err(Exhausted);
        }
        self.used += 1;
        Ok(())
    }

    /// Turns a simulation outcome into the run result.
    pub fn conclude(
        self,
        arena: ProcessArena,
        outcome: Result<(), Exhausted>,
    ) -> Result<Timeline, SimulationError> {
        match outcome {
            Ok(()) => Ok(arena.into_timeline()),
            Err(Exhausted) => {
                warn!(
                    "{} stopped after {} iterations with unfinished processes",
                    self.policy, self.limit
                );
                Err(SimulationError::IterationLimit {
                    policy: self.policy,
                    limit: self.limit,
                    partial: Box::new(arena.into_timeline()),
                })
            }
        }
    }
}

/// Iterations a terminating run can need for `processes`.
fn work_bound(processes: &[Process]) -> u64 {
    processes.iter().fold(1u64, |acc, p| {
        [p.cpu_burst_time1, p.io_time, p.cpu_burst_time2]
            .into_iter()
            .map(|d| d.max(0).unsigned_abs())
            .fold(acc.saturating_add(6), u64::saturating_add)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_arena() -> ProcessArena {
        ProcessArena::new(&[
            Process::from_bursts("P1", 5, 4, 3, 5),
            Process::from_bursts("P2", 0, 0, 2, 4),
            Process::from_bursts("P3", 5, 2, 0, 0),
        ])
    }

    #[test]
    fn test_by_arrival_is_stable() {
        let arena = sample_arena();
        assert_eq!(arena.by_arrival(), VecDeque::from([1, 0, 2]));
    }

    #[test]
    fn test_remaining_phases() {
        let arena = sample_arena();
        assert_eq!(arena.remaining(0).next_phase(), Some(Phase::Cpu1));
        assert_eq!(arena.remaining(1).next_phase(), Some(Phase::Io));
        assert_eq!(arena.remaining(2).next_after(Phase::Cpu1), None);

        let negative = Remaining {
            cpu1: -3,
            io: 0,
            cpu2: 2,
        };
        assert_eq!(negative.next_phase(), Some(Phase::Cpu2));
        assert_eq!(negative.next_after(Phase::Cpu1), Some(Phase::Cpu2));
    }

    #[test]
    fn test_run_updates_remaining_and_order() {
        let mut arena = sample_arena();
        let end = arena.run(2, Phase::Cpu1, 5, 2);
        assert_eq!(end, 7);
        assert_eq!(arena.remaining(2).cpu1, 0);
        arena.run(0, Phase::Cpu1, 7, 1);

        assert!(arena.is_started(2));
        assert!(!arena.is_started(1));
        arena.finish(2);
        assert!(arena.interval(2).finished);

        let timeline = arena.into_timeline();
        assert_eq!(timeline.pids(), vec!["P3", "P1"]);
        assert!(timeline.entries[0].finished);
        assert!(!timeline.entries[1].finished);
    }

    #[test]
    fn test_input_untouched() {
        let input = vec![Process::from_bursts("P1", 0, 4, 3, 5)];
        let mut arena = ProcessArena::new(&input);
        arena.run(0, Phase::Cpu1, 0, 4);
        assert_eq!(input[0].cpu_burst_time1, 4);
        assert_eq!(arena.process(0).cpu_burst_time1, 4);
        assert_eq!(arena.remaining(0).cpu1, 0);
    }

    #[test]
    fn test_run_saturates_at_time_limit() {
        let mut arena = ProcessArena::new(&[Process::from_bursts("P1", 0, 10, 0, 0)]);
        let end = arena.run(0, Phase::Cpu1, i64::MAX - 3, 10);
        assert_eq!(end, i64::MAX);
    }

    #[test]
    fn test_guard_sized_from_workload() {
        let processes = [
            Process::from_bursts("P1", 0, 2_000_000, 3, -5),
            Process::from_bursts("P2", 9, 0, 0, 1),
        ];
        assert_eq!(work_bound(&processes), 1 + 6 + 2_000_003 + 6 + 1);
        assert_eq!(work_bound(&[]), 1);

        let mut guard = IterationGuard::for_workload("FCFS-P", &processes, 0);
        for _ in 0..work_bound(&processes) {
            assert!(guard.tick().is_ok());
        }
        assert_eq!(guard.tick(), Err(Exhausted));
    }

    #[test]
    fn test_iteration_guard() {
        let mut guard = IterationGuard::new("RR", 2);
        assert!(guard.tick().is_ok());
        assert!(guard.tick().is_ok());
        assert_eq!(guard.tick(), Err(Exhausted));

        let mut arena = sample_arena();
        arena.run(0, Phase::Cpu1, 0, 1);
        let err = guard.conclude(arena, Err(Exhausted)).unwrap_err();
        assert_eq!(err.partial_timeline().map(Timeline::len), Some(1));
    }
}
