//! Round robin.
//!
//! # Algorithm
//!
//! 1. Sort by arrival (stable); the clock starts at the first arrival and
//!    that arrival group forms the initial queue.
//! 2. Dispatch the first eligible entry in queue order for
//!    `min(quantum, remaining)` units of its current burst.
//! 3. When CPU1 is used up, the I/O burst is journaled as the fixed window
//!    `[clock, clock + io]` without advancing the clock. The entry moves on
//!    to CPU2, which becomes eligible once that window has closed.
//! 4. An entry with work left returns to the tail; otherwise it is
//!    finalized.
//! 5. Processes that arrived by the new clock are merged at the *front* of
//!    the queue in arrival order, behind any entry not yet dispatched (those
//!    arrived earlier still).
//!
//! If no entry is eligible the clock jumps to the earliest I/O completion or
//! arrival.
//!
//! # Reference
//! Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", §5.3.3

use std::collections::VecDeque;

use log::{debug, trace};

use super::arena::{Exhausted, IterationGuard, ProcessArena, Slot};
use super::Scheduler;
use crate::error::SimulationError;
use crate::models::{Phase, Process, Timeline};

/// Supplies the time slice for each dispatch of a rotation.
pub(crate) trait Quantum {
    /// Slice length for the next dispatch.
    fn current(&self) -> i64;

    /// Called when `slot` finishes its first CPU burst.
    fn first_burst_done(&mut self, _slot: Slot, _has_io: bool) {}

    /// Called when `slot` goes back to the tail of the queue.
    fn requeued(&mut self, _slot: Slot) {}
}

/// A constant time slice.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedQuantum(pub i64);

impl Quantum for FixedQuantum {
    fn current(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    First,
    Second,
}

/// Runs the rotation over `pending` (arrival order) and returns the final
/// clock.
pub(crate) fn rotate<Q: Quantum>(
    arena: &mut ProcessArena,
    mut pending: VecDeque<Slot>,
    quantum: &mut Q,
    guard: &mut IterationGuard,
) -> Result<i64, Exhausted> {
    let Some(&head) = pending.front() else {
        return Ok(0);
    };
    let mut clock = arena.process(head).arrival_time;
    let mut queue: VecDeque<(Slot, Stage)> = VecDeque::new();
    while let Some(&slot) = pending.front() {
        if arena.process(slot).arrival_time != clock {
            break;
        }
        pending.pop_front();
        queue.push_back((slot, Stage::First));
    }

    loop {
        guard.tick()?;

        if queue.is_empty() {
            let Some(&next) = pending.front() else {
                break;
            };
            clock = clock.max(arena.process(next).arrival_time);
            admit_front(arena, &mut pending, &mut queue, clock);
            continue;
        }

        let eligible = queue.iter().position(|&(slot, stage)| {
            stage == Stage::First || io_end(arena, slot).is_none_or(|end| end <= clock)
        });

        let Some((slot, stage)) = eligible.and_then(|pos| queue.remove(pos)) else {
            // Everyone is waiting on I/O.
            let io_ready = queue
                .iter()
                .filter_map(|&(slot, _)| io_end(arena, slot))
                .min();
            let arrival = pending.front().map(|&s| arena.process(s).arrival_time);
            clock = match (io_ready, arrival) {
                (Some(io), Some(arrival)) => io.min(arrival),
                (Some(io), None) => io,
                (None, Some(arrival)) => arrival,
                (None, None) => break,
            };
            trace!("rotation idle until t={clock}");
            admit_front(arena, &mut pending, &mut queue, clock);
            continue;
        };

        let slice = quantum.current();
        let stage = match stage {
            Stage::First => {
                let left = arena.remaining(slot).cpu1;
                if left > 0 {
                    clock = arena.run(slot, Phase::Cpu1, clock, slice.min(left));
                }
                if arena.remaining(slot).cpu1 > 0 {
                    Stage::First
                } else {
                    if arena.interval(slot).cpu1.is_none() {
                        arena.record(slot, Phase::Cpu1, clock, clock);
                    }
                    let io = arena.remaining(slot).io.max(0);
                    arena.record(slot, Phase::Io, clock, clock.saturating_add(io));
                    arena.remaining_mut(slot).io = 0;
                    quantum.first_burst_done(slot, io > 0);
                    Stage::Second
                }
            }
            Stage::Second => {
                let left = arena.remaining(slot).cpu2;
                if left > 0 {
                    clock = arena.run(slot, Phase::Cpu2, clock, slice.min(left));
                }
                Stage::Second
            }
        };

        if stage == Stage::Second && arena.remaining(slot).cpu2 <= 0 {
            if arena.interval(slot).cpu2.is_none() {
                let at = io_end(arena, slot).map_or(clock, |end| clock.max(end));
                arena.record(slot, Phase::Cpu2, at, at);
            }
            arena.finish(slot);
            debug!("rotation t={clock}: {} finished", arena.process(slot).pid);
        } else {
            quantum.requeued(slot);
            queue.push_back((slot, stage));
        }

        admit_front(arena, &mut pending, &mut queue, clock);
    }

    Ok(clock)
}

fn io_end(arena: &ProcessArena, slot: Slot) -> Option<i64> {
    arena.interval(slot).io.map(|span| span.end)
}

/// Moves everything that arrived by `clock` ahead of all dispatched work
/// in `queue`, keeping arrival order.
fn admit_front(
    arena: &ProcessArena,
    pending: &mut VecDeque<Slot>,
    queue: &mut VecDeque<(Slot, Stage)>,
    clock: i64,
) {
    // Never-dispatched entries only ever sit at the head.
    let mut at = queue
        .iter()
        .take_while(|&&(slot, _)| !arena.is_started(slot))
        .count();
    while let Some(&slot) = pending.front() {
        if arena.process(slot).arrival_time > clock {
            break;
        }
        pending.pop_front();
        queue.insert(at, (slot, Stage::First));
        at += 1;
    }
}

/// Round robin with a fixed time quantum.
///
/// # Example
///
/// ```
/// use cpu_sched_sim::models::Process;
/// use cpu_sched_sim::scheduler::{RoundRobinScheduler, Scheduler};
///
/// let rr = RoundRobinScheduler::new(2).unwrap();
/// let timeline = rr.schedule(&[Process::from_bursts("P1", 0, 5, 0, 0)]).unwrap();
/// assert_eq!(timeline.makespan(), 5);
///
/// assert!(RoundRobinScheduler::new(0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RoundRobinScheduler {
    quantum: i64,
    max_iterations: u64,
}

impl RoundRobinScheduler {
    /// Creates the scheduler; `quantum` must be positive.
    pub fn new(quantum: i64) -> Result<Self, SimulationError> {
        if quantum <= 0 {
            return Err(SimulationError::InvalidQuantum(quantum));
        }
        Ok(Self {
            quantum,
            max_iterations: 1_000_000,
        })
    }

    /// Sets the iteration allowance on top of the workload-derived bound.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// The configured time quantum.
    pub fn quantum(&self) -> i64 {
        self.quantum
    }
}

impl Scheduler for RoundRobinScheduler {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn schedule(&self, processes: &[Process]) -> Result<Timeline, SimulationError> {
        let mut arena = ProcessArena::new(processes);
        let mut guard = IterationGuard::for_workload(self.name(), processes, self.max_iterations);
        let pending = arena.by_arrival();
        let outcome = rotate(
            &mut arena,
            pending,
            &mut FixedQuantum(self.quantum),
            &mut guard,
        )
        .map(|_| ());
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
    fn test_rr_reference_scenario() {
        let timeline = RoundRobinScheduler::new(4)
            .unwrap()
            .schedule(&sample_processes())
            .unwrap();
        assert_eq!(timeline.pids(), vec!["P1", "P2", "P3"]);

        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.cpu1, Some(Span::new(0, 4)));
        assert_eq!(p1.io, Some(Span::new(4, 7)));
        // Preempted CPU2: 9-13 then 20-21
        assert_eq!(p1.cpu2, Some(Span::new(9, 21)));
        assert_eq!(p1.consumed(Phase::Cpu2), 5);

        let p2 = timeline.get("P2").unwrap();
        assert_eq!(p2.cpu1, Some(Span::new(4, 7)));
        assert_eq!(p2.io, Some(Span::new(7, 9)));
        assert_eq!(p2.cpu2, Some(Span::new(13, 17)));

        let p3 = timeline.get("P3").unwrap();
        assert_eq!(p3.cpu1, Some(Span::new(7, 9)));
        assert_eq!(p3.io, Some(Span::new(9, 13)));
        assert_eq!(p3.cpu2, Some(Span::new(17, 20)));

        assert_eq!(timeline.makespan(), 21);
        assert!(timeline.is_complete());
    }

    #[test]
    fn test_rr_waits_for_io_completion() {
        let processes = vec![
            Process::from_bursts("P1", 0, 2, 10, 2),
            Process::from_bursts("P2", 0, 4, 0, 0),
        ];
        let timeline = RoundRobinScheduler::new(2)
            .unwrap()
            .schedule(&processes)
            .unwrap();

        let p2 = timeline.get("P2").unwrap();
        assert_eq!(p2.cpu1, Some(Span::new(2, 6)));
        assert_eq!(p2.end_time(), Some(6));

        // CPU2 cannot start before the I/O window [2, 12] closes
        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.io, Some(Span::new(2, 12)));
        assert_eq!(p1.cpu2, Some(Span::new(12, 14)));
        assert!(p1.is_well_ordered());
    }

    #[test]
    fn test_rr_new_arrivals_go_to_front() {
        let processes = vec![
            Process::from_bursts("A", 0, 6, 0, 0),
            Process::from_bursts("B", 1, 2, 0, 0),
            Process::from_bursts("C", 2, 2, 0, 0),
        ];
        let timeline = RoundRobinScheduler::new(2)
            .unwrap()
            .schedule(&processes)
            .unwrap();
        // B and C jump ahead of A's requeued slice
        assert_eq!(timeline.pids(), vec!["A", "B", "C"]);
        assert_eq!(timeline.get("B").unwrap().cpu1, Some(Span::new(2, 4)));
        assert_eq!(timeline.get("C").unwrap().cpu1, Some(Span::new(4, 6)));
        assert_eq!(timeline.get("A").unwrap().slices[1].start, 6);
    }

    #[test]
    fn test_rr_arrivals_queue_behind_undispatched() {
        let processes = vec![
            Process::from_bursts("A", 0, 2, 0, 0),
            Process::from_bursts("B", 0, 2, 0, 0),
            Process::from_bursts("C", 1, 2, 0, 0),
        ];
        let timeline = RoundRobinScheduler::new(4)
            .unwrap()
            .schedule(&processes)
            .unwrap();
        assert_eq!(timeline.pids(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rr_starts_at_first_arrival() {
        let processes = vec![
            Process::from_bursts("P1", 7, 3, 1, 1),
            Process::from_bursts("P2", 30, 1, 0, 1),
        ];
        let timeline = RoundRobinScheduler::new(4)
            .unwrap()
            .schedule(&processes)
            .unwrap();
        assert_eq!(timeline.get("P1").unwrap().start_time(), Some(7));
        assert_eq!(timeline.get("P2").unwrap().start_time(), Some(30));
        assert_eq!(timeline.makespan(), 32);
    }

    #[test]
    fn test_rr_zero_first_burst() {
        let processes = vec![Process::from_bursts("P1", 0, 0, 3, 2)];
        let timeline = RoundRobinScheduler::new(4)
            .unwrap()
            .schedule(&processes)
            .unwrap();
        let p1 = timeline.get("P1").unwrap();
        assert_eq!(p1.cpu1, Some(Span::instant(0)));
        assert_eq!(p1.io, Some(Span::new(0, 3)));
        assert_eq!(p1.cpu2, Some(Span::new(3, 5)));
    }

    #[test]
    fn test_rr_invalid_quantum() {
        assert_eq!(
            RoundRobinScheduler::new(-3).unwrap_err(),
            SimulationError::InvalidQuantum(-3)
        );
    }

    #[test]
    fn test_rr_bound_follows_workload() {
        let processes = vec![
            Process::from_bursts("P1", 0, 1_200_000, 5, 3),
            Process::from_bursts("P2", 10, 0, 0, 0),
            Process::from_bursts("P3", 2_000_000, 1, 0, 0),
        ];
        let timeline = RoundRobinScheduler::new(1)
            .unwrap()
            .with_max_iterations(0)
            .schedule(&processes)
            .unwrap();
        assert!(timeline.is_complete());
        assert_eq!(
            timeline.get("P1").unwrap().consumed(Phase::Cpu1),
            1_200_000
        );
        assert_eq!(timeline.get("P3").unwrap().start_time(), Some(2_000_000));
    }
}
