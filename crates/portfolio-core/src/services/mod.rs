//! Services built on the ports.

pub mod staleness;
mod update_cycle;

pub use staleness::needs_refresh;
pub use update_cycle::{CycleReport, ProjectFailure, ProjectOutcome, UpdateCycle};
