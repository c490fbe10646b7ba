//! Runtime concerns for portfolio-updater: the cycle timer and the single
//! failure handler every cycle error passes through.

#![deny(unsafe_code)]

pub mod reporter;
pub mod scheduler;

pub use reporter::FailureReporter;
pub use scheduler::{CycleScheduler, SchedulerError, SchedulerStatus};
