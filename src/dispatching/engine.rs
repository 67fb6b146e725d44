//! Rule engine for multi-criteria dispatching.
//!
//! Composes dispatching rules in sequence: the first rule decides, later
//! rules only break ties, and a full tie keeps the caller's order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::DispatchingRule;
use crate::models::Process;

/// A composable rule engine for ready-queue selection.
///
/// # Example
/// ```
/// use cpu_sched_sim::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::HighestPriority)
///     .with_rule(rules::EarliestArrival);
/// assert_eq!(engine.rule_names(), vec!["PRIORITY", "FIFO"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; later rules only break ties.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Compares two processes rule by rule.
    pub fn compare(&self, a: &Process, b: &Process) -> Ordering {
        for rule in &self.rules {
            match rule.evaluate(a).cmp(&rule.evaluate(b)) {
                Ordering::Equal => continue,
                decided => return decided,
            }
        }
        Ordering::Equal
    }

    /// Returns the position of the best candidate.
    ///
    /// On a full tie the earliest position wins, so the caller's queue
    /// order is the final tie-breaker.
    pub fn select_best<'a, I>(&self, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let mut best: Option<(usize, &Process)> = None;
        for (idx, candidate) in candidates.into_iter().enumerate() {
            match best {
                Some((_, current)) if self.compare(candidate, current) != Ordering::Less => {}
                _ => best = Some((idx, candidate)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Sorts positions from best to worst (stable).
    pub fn sort_indices(&self, processes: &[Process]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..processes.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&processes[a], &processes[b]));
        indices
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;

    fn make_process(pid: &str, arrival: i64, cpu: i64, priority: i32) -> Process {
        Process::from_bursts(pid, arrival, cpu, 0, 0).with_priority(priority)
    }

    #[test]
    fn test_shortest_first_ordering() {
        let ready = vec![
            make_process("long", 0, 9, 0),
            make_process("short", 0, 2, 0),
            make_process("medium", 0, 5, 0),
        ];
        let engine = RuleEngine::new().with_rule(rules::ShortestCpuBurst);

        let indices = engine.sort_indices(&ready);
        assert_eq!(ready[indices[0]].pid, "short");
        assert_eq!(ready[indices[1]].pid, "medium");
        assert_eq!(ready[indices[2]].pid, "long");
    }

    #[test]
    fn test_tie_broken_by_next_rule() {
        let ready = vec![make_process("late", 5, 3, 0), make_process("early", 1, 3, 0)];
        let engine = RuleEngine::new()
            .with_rule(rules::ShortestCpuBurst)
            .with_rule(rules::EarliestArrival);

        assert_eq!(engine.select_best(ready.iter()), Some(1));
    }

    #[test]
    fn test_full_tie_keeps_queue_order() {
        let ready = vec![make_process("B", 0, 3, 1), make_process("A", 0, 3, 1)];
        let engine = RuleEngine::new()
            .with_rule(rules::HighestPriority)
            .with_rule(rules::EarliestArrival);

        assert_eq!(engine.select_best(ready.iter()), Some(0));
        assert_eq!(engine.sort_indices(&ready), vec![0, 1]);
    }

    #[test]
    fn test_priority_selection() {
        let ready = vec![
            make_process("P1", 0, 4, 3),
            make_process("P2", 2, 3, 1),
            make_process("P3", 5, 2, 2),
        ];
        let engine = RuleEngine::new().with_rule(rules::HighestPriority);
        assert_eq!(engine.select_best(ready.iter()), Some(1));
    }

    #[test]
    fn test_empty_candidates() {
        let engine = RuleEngine::new().with_rule(rules::ShortestCpuBurst);
        assert!(engine.select_best(std::iter::empty()).is_none());
        assert!(engine.sort_indices(&[]).is_empty());
    }

    #[test]
    fn test_debug_lists_rules() {
        let engine = RuleEngine::new()
            .with_rule(rules::ShortestCpuBurst)
            .with_rule(rules::EarliestArrival);
        assert_eq!(
            format!("{engine:?}"),
            "RuleEngine { rules: [\"SJF\", \"FIFO\"] }"
        );
    }
}
