//! Discrete-time model of classical single-CPU scheduling disciplines.
//!
//! Input process descriptors are validated into [`Job`]s, driven through a
//! selection policy by [`crate::core::SchedCore`], and returned as enriched
//! [`JobInstance`]s plus the execution [`Timeline`].

pub mod config;
pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use config::{SimConfig, Workload};
pub use crate::core::SchedCoreEvent;
pub use error::{ConfigError, SimError, TimelineError, ValidationError};
pub use scheduler::{Algorithm, Scheduler};
pub use sim::{Interval, Job, JobId, JobInstance, ProcessSpec, Sim, SimOutput, Summary, Timeline};

/// Runs one simulation over its own copy of `specs`.
///
/// `quantum` is only read for [`Algorithm::RoundRobin`].
pub fn simulate(
    specs: &[ProcessSpec],
    algorithm: Algorithm,
    quantum: Option<i64>,
) -> Result<SimOutput, SimError> {
    let config = SimConfig {
        quantum,
        ..SimConfig::new(algorithm)
    };
    Sim::new(specs, &config)?.run()
}
