//! Workload files and random workloads.
//!
//! # Format
//!
//! One process per line, whitespace separated:
//!
//! ```text
//! # arrival cpu1 io cpu2 [priority]
//! 0 4 3 5 3
//! 2 3 2 4 1
//! ```
//!
//! Pids are assigned `P1..Pn` in line order. Blank lines and lines starting
//! with `#` are skipped. A missing priority defaults to 0.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;
use rand::Rng;

use crate::error::WorkloadError;
use crate::models::Process;

/// Parses workload text.
///
/// # Example
///
/// ```
/// use cpu_sched_sim::workload;
///
/// let processes = workload::parse("0 4 3 5 3\n2 3 2 4\n").unwrap();
/// assert_eq!(processes[1].pid, "P2");
/// assert_eq!(processes[1].priority, 0);
/// ```
pub fn parse(text: &str) -> Result<Vec<Process>, WorkloadError> {
    let mut processes = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 && tokens.len() != 5 {
            return Err(WorkloadError::FieldCount {
                line: line_no,
                found: tokens.len(),
            });
        }

        let mut values = [0i64; 5];
        for (slot, token) in values.iter_mut().zip(&tokens) {
            *slot = token.parse().map_err(|_| WorkloadError::InvalidNumber {
                line: line_no,
                token: token.to_string(),
            })?;
        }
        let priority = i32::try_from(values[4]).map_err(|_| WorkloadError::InvalidNumber {
            line: line_no,
            token: values[4].to_string(),
        })?;

        let pid = format!("P{}", processes.len() + 1);
        processes.push(
            Process::from_bursts(pid, values[0], values[1], values[2], values[3])
                .with_priority(priority),
        );
    }

    Ok(processes)
}

/// Renders processes in the workload format (pids are not written).
pub fn to_text(processes: &[Process]) -> String {
    let mut out = String::new();
    for p in processes {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            p.arrival_time, p.cpu_burst_time1, p.io_time, p.cpu_burst_time2, p.priority
        );
    }
    out
}

/// Reads a workload file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Process>, WorkloadError> {
    let path = path.as_ref();
    let processes = parse(&fs::read_to_string(path)?)?;
    debug!(
        "loaded {} processes from {}",
        processes.len(),
        path.display()
    );
    Ok(processes)
}

/// Writes a workload file.
pub fn save(path: impl AsRef<Path>, processes: &[Process]) -> Result<(), WorkloadError> {
    let path = path.as_ref();
    fs::write(path, to_text(processes))?;
    debug!("saved {} processes to {}", processes.len(), path.display());
    Ok(())
}

/// Generates `count` random processes with pids `P1..Pn`.
///
/// Ranges: arrival `0..20`, cpu1 `1..=10`, io `0..10`, cpu2 `0..10`,
/// priority `1..=10`.
pub fn generate<R: Rng>(count: usize, rng: &mut R) -> Vec<Process> {
    (1..=count)
        .map(|n| {
            Process::from_bursts(
                format!("P{n}"),
                rng.random_range(0..20),
                rng.random_range(1..=10),
                rng.random_range(0..10),
                rng.random_range(0..10),
            )
            .with_priority(rng.random_range(1..=10))
        })
        .collect()
}

/// [`generate`] with the thread-local generator.
pub fn generate_random(count: usize) -> Vec<Process> {
    generate(count, &mut rand::rng())
}
