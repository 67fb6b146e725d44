//! CPU scheduling simulator.
//!
//! Simulates how classic dispatching policies interleave a fixed batch of
//! processes on one CPU and derives response, turnaround and waiting times
//! plus CPU efficiency and throughput from the resulting timeline.
//!
//! Every process runs three sequential phases: a first CPU burst, one I/O
//! burst and a second CPU burst. Time is a discrete integer clock.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Process`, `ExecutionInterval`, `Timeline`
//! - **`dispatching`**: Ready-queue selection rules and the `RuleEngine`
//! - **`scheduler`**: FCFS, FCFS-Preemptive, SJF, Round Robin, MLFQ and
//!   Priority policies, plus the metrics analyzer
//! - **`validation`**: Input integrity checks (duplicate pids, negative times)
//! - **`workload`**: Workload text files and random generation
//!
//! # Example
//!
//! ```
//! use cpu_sched_sim::{analyze, run_scheduler, Policy, Process, SchedulerParams};
//!
//! let processes = vec![
//!     Process::from_bursts("P1", 0, 4, 3, 5),
//!     Process::from_bursts("P2", 2, 3, 2, 4),
//!     Process::from_bursts("P3", 5, 2, 4, 3),
//! ];
//! let timeline = run_scheduler(Policy::Fcfs, &processes, &SchedulerParams::default()).unwrap();
//! let report = analyze(&timeline, &processes);
//! assert_eq!(report.totals.total_time, 30);
//! assert_eq!(report.totals.idle_time, 9);
//! ```
//!
//! # References
//!
//! - Silberschatz, Galvin & Gagne (2018), "Operating System Concepts", Ch. 5
//! - Arpaci-Dusseau (2018), "Operating Systems: Three Easy Pieces", Ch. 7-9

pub mod dispatching;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod workload;

pub use error::{SimulationError, WorkloadError};
pub use models::{ExecutionInterval, Phase, Process, Span, Timeline};
pub use scheduler::{analyze, run_scheduler, AnalysisReport, Policy, Scheduler, SchedulerParams};
