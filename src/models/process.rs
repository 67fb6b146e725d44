//! Process model.
//!
//! A process is the unit of work fed to every scheduling policy. It runs
//! three sequential phases: a first CPU burst, one I/O burst, and a second
//! CPU burst.
//!
//! # Time Representation
//! All times are integer units of a discrete simulation clock (t=0 is the
//! start of the run). Nothing here is validated for non-negativity; see
//! [`crate::validation`] for optional input checks.

use serde::{Deserialize, Serialize};

/// A process to be scheduled.
///
/// Treated as a read-only template: schedulers copy it into their own
/// in-flight state and never mutate the caller's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    /// Canonical process identifier (e.g. "P3").
    pub pid: String,
    /// Time the process becomes ready.
    pub arrival_time: i64,
    /// First CPU burst duration.
    pub cpu_burst_time1: i64,
    /// I/O burst duration between the two CPU bursts.
    pub io_time: i64,
    /// Second CPU burst duration (0 if none).
    pub cpu_burst_time2: i64,
    /// Scheduling priority (lower = more important).
    pub priority: i32,
}

impl Process {
    /// Creates a process with the given pid and all times zeroed.
    pub fn new(pid: impl Into<String>) -> Self {
        Self {
            pid: pid.into(),
            arrival_time: 0,
            cpu_burst_time1: 0,
            io_time: 0,
            cpu_burst_time2: 0,
            priority: 0,
        }
    }

    /// Creates a process from its arrival time and three phase durations.
    pub fn from_bursts(
        pid: impl Into<String>,
        arrival_time: i64,
        cpu_burst_time1: i64,
        io_time: i64,
        cpu_burst_time2: i64,
    ) -> Self {
        Self {
            pid: pid.into(),
            arrival_time,
            cpu_burst_time1,
            io_time,
            cpu_burst_time2,
            priority: 0,
        }
    }

    /// Sets the arrival time.
    pub fn with_arrival(mut self, arrival_time: i64) -> Self {
        self.arrival_time = arrival_time;
        self
    }

    /// Sets the first CPU burst.
    pub fn with_cpu_burst1(mut self, duration: i64) -> Self {
        self.cpu_burst_time1 = duration;
        self
    }

    /// Sets the I/O burst.
    pub fn with_io_time(mut self, duration: i64) -> Self {
        self.io_time = duration;
        self
    }

    /// Sets the second CPU burst.
    pub fn with_cpu_burst2(mut self, duration: i64) -> Self {
        self.cpu_burst_time2 = duration;
        self
    }

    /// Sets the scheduling priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Numeric id derived from the trailing digits of `pid` ("P12" → 12).
    ///
    /// Returns 0 when `pid` has no trailing digits or they overflow `u32`.
    /// This is a lookup convenience only; `pid` stays the identity.
    pub fn numeric_id(&self) -> u32 {
        let digits = self
            .pid
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
        self.pid[self.pid.len() - digits..].parse().unwrap_or(0)
    }

    /// CPU time across both bursts (I/O excluded).
    #[inline]
    pub fn total_cpu_time(&self) -> i64 {
        self.cpu_burst_time1 + self.cpu_burst_time2
    }

    /// CPU plus I/O time across all three phases.
    #[inline]
    pub fn total_work(&self) -> i64 {
        self.total_cpu_time() + self.io_time
    }
}
