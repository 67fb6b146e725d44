//! Dispatching rules and rule engine for ready-queue selection.
//!
//! Policies that pick from a ready queue by a ranking (SJF, priority)
//! delegate the choice to a [`RuleEngine`]: rules are applied in sequence,
//! each later rule breaking ties left by the earlier ones, and a final tie
//! keeps ready-queue order.
//!
//! # Usage
//!
//! ```
//! use cpu_sched_sim::dispatching::{rules, RuleEngine};
//! use cpu_sched_sim::models::Process;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::ShortestCpuBurst)
//!     .with_rule(rules::EarliestArrival);
//!
//! let ready = [
//!     Process::from_bursts("P1", 0, 6, 1, 2),
//!     Process::from_bursts("P2", 1, 2, 9, 1),
//! ];
//! assert_eq!(engine.select_best(ready.iter()), Some(1));
//! ```

mod engine;
pub mod rules;

pub use engine::RuleEngine;

use crate::models::Process;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = dispatched first.
pub type RuleScore = i64;

/// A ranking criterion over ready processes.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules return smaller values for
/// processes that should be dispatched first.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SJF", "PRIORITY").
    fn name(&self) -> &'static str;

    /// Scores a ready process.
    fn evaluate(&self, process: &Process) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
