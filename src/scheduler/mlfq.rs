//! Two-tier multi-level feedback queue.
//!
//! # Algorithm
//!
//! **Phase 1**: round robin rotation over every process with a positive
//! first CPU burst. The slice comes from the queue's tier: 8 units at tier 1,
//! 16 at tier 2. A process that finishes CPU1 with I/O still ahead is marked;
//! the first time a marked process goes back to the tail, the whole queue
//! switches to tier 2 for the rest of the run.
//!
//! **Phase 2**: every process phase 1 never touched is run FCFS in arrival
//! order, starting from phase 1's final clock.

use std::collections::{HashSet, VecDeque};

use log::debug;

use super::arena::{IterationGuard, ProcessArena, Slot};
use super::fcfs::FcfsScheduler;
use super::round_robin::{rotate, Quantum};
use super::Scheduler;
use crate::error::SimulationError;
use crate::models::{Process, Timeline};

/// Queue level of the feedback queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    /// Short slices.
    First,
    /// Long slices.
    Second,
}

/// Queue-level tier state for one MLFQ run.
#[derive(Debug, Clone)]
pub(crate) struct FeedbackQueue {
    tier: Tier,
    first_quantum: i64,
    second_quantum: i64,
    done_first_quantum: HashSet<Slot>,
}

impl FeedbackQueue {
    pub fn new(first_quantum: i64, second_quantum: i64) -> Self {
        Self {
            tier: Tier::First,
            first_quantum,
            second_quantum,
            done_first_quantum: HashSet::new(),
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }
}

impl Quantum for FeedbackQueue {
    fn current(&self) -> i64 {
        match self.tier {
            Tier::First => self.first_quantum,
            Tier::Second => self.second_quantum,
        }
    }

    fn first_burst_done(&mut self, slot: Slot, has_io: bool) {
        if has_io {
            self.done_first_quantum.insert(slot);
        }
    }

    fn requeued(&mut self, slot: Slot) {
        if self.tier == Tier::First && self.done_first_quantum.contains(&slot) {
            debug!("MLFQ: slot {slot} requeued after its first burst, switching to tier 2");
            self.tier = Tier::Second;
        }
    }
}

/// Two-tier MLFQ with an FCFS fallback pass.
#[derive(Debug, Clone)]
pub struct MlfqScheduler {
    first_quantum: i64,
    second_quantum: i64,
    max_iterations: u64,
}

impl MlfqScheduler {
    /// Creates the scheduler with quanta 8 and 16.
    pub fn new() -> Self {
        Self {
            first_quantum: 8,
            second_quantum: 16,
            max_iterations: 1_000_000,
        }
    }

    /// Creates the scheduler with custom tier quanta; both must be positive.
    pub fn with_quanta(first: i64, second: i64) -> Result<Self, SimulationError> {
        for quantum in [first, second] {
            if quantum <= 0 {
                return Err(SimulationError::InvalidQuantum(quantum));
            }
        }
        Ok(Self {
            first_quantum: first,
            second_quantum: second,
            ..Self::new()
        })
    }

    /// Sets the iteration allowance on top of the workload-derived bound.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for MlfqScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for MlfqScheduler {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let mut arena = ProcessArena::new(processes);
        let mut guard = IterationGuard::for_workload(self.name(), processes, self.max_iterations);
        let mut feedback = FeedbackQueue::new(self.first_quantum, self.second_quantum);

        let admitted: VecDeque<Slot> = arena
            .by_arrival()
            .into_iter()
            .filter(|&slot| arena.process(slot).cpu_burst_time1 > 0)
            .collect();

        let clock = match rotate(&mut arena, admitted, &mut feedback, &mut guard) {
            Ok(clock) => clock,
            Err(exhausted) => return guard.conclude(arena, Err(exhausted)),
        };
        debug!("MLFQ: rotation ended at t={clock} on {:?}", feedback.tier());

        let leftovers: Vec<Process> = arena
            .by_arrival()
            .into_iter()
            .filter(|&slot| !arena.is_started(slot))
            .map(|slot| arena.process(slot).clone())
            .collect();

        let mut timeline = guard.conclude(arena, Ok(()))?;
        let (fallback, _) = FcfsScheduler::chain(&leftovers, Some(clock));
        for interval in fallback.entries {
            timeline.push(interval);
        }
        Ok(timeline)
    }
}
