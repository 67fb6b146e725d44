//! Shortest job first (non-preemptive).
//!
//! # Algorithm
//!
//! 1. Admit the earliest arrival group.
//! 2. Pick the ready process with the smallest total CPU demand
//!    (`cpu1 + cpu2`, I/O excluded); ties go to the earlier arrival, then to
//!    ready-queue order.
//! 3. Chain its three phases from `max(arrival, previous completion)`.
//! 4. Admit everything that arrived by that completion; if nothing is ready
//!    but work remains, admit the next arrival group.
//!
//! # Complexity
//! O(n²) for n processes.
//!
//! # Reference
//! Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", §5.3.2

use log::debug;

use super::arena::{ProcessArena, Slot};
use super::Scheduler;
use crate::dispatching::rules::{EarliestArrival, ShortestCpuBurst};
use crate::dispatching::RuleEngine;
use crate::error::SimulationError;
use crate::models::{ExecutionInterval, Process, Timeline};

/// Non-preemptive SJF.
#[derive(Debug, Clone)]
pub struct SjfScheduler {
    engine: RuleEngine,
}

impl SjfScheduler {
    /// Creates the scheduler with the shortest-burst / earliest-arrival rules.
    pub fn new() -> Self {
        Self {
            engine: RuleEngine::new()
                .with_rule(ShortestCpuBurst)
                .with_rule(EarliestArrival),
        }
    }
}

impl Default for SjfScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for SjfScheduler {
    fn name(&self) -> &'static str {
        "SJF"
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let mut arena = ProcessArena::new(processes);
        let mut pending = arena.by_arrival();
        let mut ready: Vec<Slot> = Vec::new();
        let mut prev_end: Option<i64> = None;

        loop {
            if ready.is_empty() {
                let Some(&head) = pending.front() else {
                    break;
                };
                let group = arena.process(head).arrival_time;
                while let Some(&slot) = pending.front() {
                    if arena.process(slot).arrival_time != group {
                        break;
                    }
                    pending.pop_front();
                    ready.push(slot);
                }
            }

            let Some(pos) = self
                .engine
                .select_best(ready.iter().map(|&slot| arena.process(slot)))
            else {
                break;
            };
            let slot = ready.remove(pos);

            let arrival = arena.process(slot).arrival_time;
            let start = match prev_end {
                Some(busy_until) if arrival < busy_until => busy_until,
                _ => arrival,
            };
            let interval = ExecutionInterval::chained(arena.process(slot).clone(), start);
            debug!("SJF: dispatch {interval}");
            prev_end = interval.end_time();
            arena.place(slot, interval);

            let completion = prev_end.unwrap_or(start);
            while let Some(&next) = pending.front() {
                if arena.process(next).arrival_time > completion {
                    break;
                }
                pending.pop_front();
                ready.push(next);
            }
        }

        Ok(arena.into_timeline())
    }
}
