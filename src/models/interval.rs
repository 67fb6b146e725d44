//! Execution interval model.
//!
//! One record per process per run: the start/end of each of its three
//! phases plus every contiguous execution slice.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Process;

/// The three sequential phases of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// First CPU burst.
    Cpu1,
    /// I/O burst.
    Io,
    /// Second CPU burst.
    Cpu2,
}

impl Phase {
    /// Whether this phase occupies the CPU.
    pub fn is_cpu(self) -> bool {
        matches!(self, Phase::Cpu1 | Phase::Cpu2)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Cpu1 => write!(f, "CPU1"),
            Phase::Io => write!(f, "IO"),
            Phase::Cpu2 => write!(f, "CPU2"),
        }
    }
}

/// A closed time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start time.
    pub start: i64,
    /// End time.
    pub end: i64,
}

impl Span {
    /// Creates a span.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// A zero-length span at `at`.
    pub fn instant(at: i64) -> Self {
        Self::new(at, at)
    }

    /// end - start.
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A contiguous stretch during which a process executed one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSlice {
    /// Phase being executed.
    pub phase: Phase,
    /// Slice start.
    pub start: i64,
    /// Slice end.
    pub end: i64,
}

impl RunSlice {
    /// end - start.
    #[inline]
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Execution record of one process.
///
/// Each phase span covers the first start to the final end of that phase,
/// so a preempted phase's span includes the gap in which other work ran.
/// `slices` holds the exact segments. A finished interval has all three
/// spans set; phases of zero duration are zero-length spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionInterval {
    /// Copy of the scheduled process.
    pub process: Process,
    /// First CPU burst window.
    pub cpu1: Option<Span>,
    /// I/O window.
    pub io: Option<Span>,
    /// Second CPU burst window.
    pub cpu2: Option<Span>,
    /// Contiguous execution segments in time order.
    pub slices: Vec<RunSlice>,
    /// Whether every phase has completed.
    pub finished: bool,
}

impl ExecutionInterval {
    /// Creates an empty record for a process.
    pub fn new(process: Process) -> Self {
        Self {
            process,
            cpu1: None,
            io: None,
            cpu2: None,
            slices: Vec::new(),
            finished: false,
        }
    }

    /// Creates a finished record with all three phases chained back to back
    /// from `start`. Negative durations are treated as zero.
    pub fn chained(process: Process, start: i64) -> Self {
        let after = |from: i64, duration: i64| Span::new(from, from.saturating_add(duration.max(0)));
        let cpu1 = after(start, process.cpu_burst_time1);
        let io = after(cpu1.end, process.io_time);
        let cpu2 = after(io.end, process.cpu_burst_time2);

        let mut interval = Self::new(process);
        for (phase, span) in [(Phase::Cpu1, cpu1), (Phase::Io, io), (Phase::Cpu2, cpu2)] {
            interval.record(phase, span.start, span.end);
        }
        interval.finished = true;
        interval
    }

    /// Span of a phase.
    pub fn span(&self, phase: Phase) -> Option<Span> {
        match phase {
            Phase::Cpu1 => self.cpu1,
            Phase::Io => self.io,
            Phase::Cpu2 => self.cpu2,
        }
    }

    fn span_mut(&mut self, phase: Phase) -> &mut Option<Span> {
        match phase {
            Phase::Cpu1 => &mut self.cpu1,
            Phase::Io => &mut self.io,
            Phase::Cpu2 => &mut self.cpu2,
        }
    }

    /// Records that `phase` ran during `[start, end]`.
    ///
    /// Opens the phase span on first use and extends its end afterwards.
    /// Non-empty segments are appended to `slices`, merged with the previous
    /// slice when they continue it without a gap.
    pub fn record(&mut self, phase: Phase, start: i64, end: i64) {
        let span = self.span_mut(phase);
        *span = Some(match *span {
            Some(open) => Span::new(open.start, end),
            None => Span::new(start, end),
        });

        if end <= start {
            return;
        }
        match self.slices.last_mut() {
            Some(last) if last.phase == phase && last.end == start => last.end = end,
            _ => self.slices.push(RunSlice { phase, start, end }),
        }
    }

    /// Fills any phase that never ran with a zero-length span anchored at
    /// the end of the preceding phase, and marks the record finished.
    pub fn seal(&mut self) {
        if self.cpu1.is_none() {
            let anchor = self.io.or(self.cpu2).map(|s| s.start);
            self.cpu1 = anchor.map(Span::instant);
        }
        if self.io.is_none() {
            let anchor = self.cpu1.or(self.cpu2).map(|s| s.end);
            self.io = anchor.map(Span::instant);
        }
        if self.cpu2.is_none() {
            self.cpu2 = self.io.map(|s| Span::instant(s.end));
        }
        self.finished = true;
    }

    /// First CPU burst start (response reference point).
    pub fn start_time(&self) -> Option<i64> {
        self.cpu1.map(|s| s.start)
    }

    /// Second CPU burst end (canonical completion time).
    pub fn end_time(&self) -> Option<i64> {
        self.cpu2.map(|s| s.end)
    }

    /// Time actually spent executing `phase`, summed over slices.
    pub fn consumed(&self, phase: Phase) -> i64 {
        self.slices
            .iter()
            .filter(|s| s.phase == phase)
            .map(RunSlice::duration)
            .sum()
    }

    /// CPU time actually consumed across both bursts.
    pub fn consumed_cpu(&self) -> i64 {
        self.consumed(Phase::Cpu1) + self.consumed(Phase::Cpu2)
    }

    /// Whether the set spans satisfy
    /// `cpu1.start ≤ cpu1.end ≤ io.start ≤ io.end ≤ cpu2.start ≤ cpu2.end`.
    pub fn is_well_ordered(&self) -> bool {
        let mut last = i64::MIN;
        for span in [self.cpu1, self.io, self.cpu2].into_iter().flatten() {
            if span.start < last || span.end < span.start {
                return false;
            }
            last = span.end;
        }
        true
    }
}

impl fmt::Display for ExecutionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.process.pid)?;
        for phase in [Phase::Cpu1, Phase::Io, Phase::Cpu2] {
            match self.span(phase) {
                Some(span) => write!(f, "  {phase}: {span}")?,
                None => write!(f, "  {phase}: -")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_process() -> Process {
        Process::from_bursts("P1", 0, 4, 3, 5)
    }

    #[test]
    fn test_chained_interval() {
        let i = ExecutionInterval::chained(sample_process(), 2);
        assert_eq!(i.cpu1, Some(Span::new(2, 6)));
        assert_eq!(i.io, Some(Span::new(6, 9)));
        assert_eq!(i.cpu2, Some(Span::new(9, 14)));
        assert_eq!(i.start_time(), Some(2));
        assert_eq!(i.end_time(), Some(14));
        assert!(i.finished);
        assert!(i.is_well_ordered());
        assert_eq!(i.consumed_cpu(), 9);
        assert_eq!(i.slices.len(), 3);
    }

    #[test]
    fn test_chained_zero_second_burst() {
        let p = Process::from_bursts("P1", 0, 4, 0, 0);
        let i = ExecutionInterval::chained(p, 0);
        assert_eq!(i.cpu2, Some(Span::instant(4)));
        assert_eq!(i.end_time(), Some(4));
        // Zero-length phases leave no slices
        assert_eq!(i.slices.len(), 1);
    }

    #[test]
    fn test_chained_clamps_negative_durations() {
        let p = Process::from_bursts("P1", 0, -2, 3, 1);
        let i = ExecutionInterval::chained(p, 5);
        assert_eq!(i.cpu1, Some(Span::instant(5)));
        assert_eq!(i.io, Some(Span::new(5, 8)));
        assert!(i.is_well_ordered());
    }

    #[test]
    fn test_chained_saturates_at_time_limit() {
        let p = Process::from_bursts("P1", 0, i64::MAX, 5, i64::MAX);
        let i = ExecutionInterval::chained(p, 10);
        assert_eq!(i.cpu1, Some(Span::new(10, i64::MAX)));
        assert_eq!(i.io, Some(Span::instant(i64::MAX)));
        assert_eq!(i.end_time(), Some(i64::MAX));
        assert!(i.is_well_ordered());
    }

    #[test]
    fn test_record_merges_contiguous_slices() {
        let mut i = ExecutionInterval::new(sample_process());
        i.record(Phase::Cpu1, 0, 1);
        i.record(Phase::Cpu1, 1, 2);
        i.record(Phase::Cpu1, 5, 7);

        assert_eq!(i.cpu1, Some(Span::new(0, 7)));
        assert_eq!(i.slices.len(), 2);
        assert_eq!(i.consumed(Phase::Cpu1), 4);
    }

    #[test]
    fn test_seal_fills_missing_phases() {
        let mut i = ExecutionInterval::new(sample_process());
        i.record(Phase::Cpu1, 0, 4);
        i.seal();
        assert_eq!(i.io, Some(Span::instant(4)));
        assert_eq!(i.cpu2, Some(Span::instant(4)));
        assert!(i.finished);

        let mut j = ExecutionInterval::new(sample_process());
        j.record(Phase::Io, 3, 6);
        j.seal();
        assert_eq!(j.cpu1, Some(Span::instant(3)));
        assert_eq!(j.cpu2, Some(Span::instant(6)));
        assert!(j.is_well_ordered());
    }

    #[test]
    fn test_is_well_ordered_detects_overlap() {
        let mut i = ExecutionInterval::new(sample_process());
        i.cpu1 = Some(Span::new(0, 5));
        i.io = Some(Span::new(4, 6));
        assert!(!i.is_well_ordered());
    }

    #[test]
    fn test_display() {
        let i = ExecutionInterval::chained(sample_process(), 0);
        assert_eq!(i.to_string(), "P1  CPU1: 0-4  IO: 4-7  CPU2: 7-12");
    }
}
