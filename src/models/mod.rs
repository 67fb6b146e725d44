//! Simulation domain models.
//!
//! Provides the input record (`Process`) and the output records
//! (`ExecutionInterval`, `Timeline`) shared by every scheduling policy.
//!
//! # Phase Model
//!
//! | Phase | Occupies | Duration field |
//! |-------|----------|----------------|
//! | CPU1 | CPU | `cpu_burst_time1` |
//! | IO | I/O device | `io_time` |
//! | CPU2 | CPU | `cpu_burst_time2` |

mod interval;
mod process;
mod timeline;

pub use interval::{ExecutionInterval, Phase, RunSlice, Span};
pub use process::Process;
pub use timeline::Timeline;
