use crate::{core::Ticks, sim::JobId};
use thiserror::Error;

/// Rejections raised while checking caller-supplied process descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("process {id}: burst_time must be > 0, got {burst_time}")]
    NonPositiveBurst { id: JobId, burst_time: i64 },
    #[error("process {id}: arrival_time must be >= 0, got {arrival_time}")]
    NegativeArrival { id: JobId, arrival_time: i64 },
    #[error("process {id}: duplicate id")]
    DuplicateId { id: JobId },
    #[error("process {id}: arrival plus total burst time overflows the clock")]
    TimeOverflow { id: JobId },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("round-robin requires a quantum")]
    MissingQuantum,
    #[error("quantum must be > 0, got {0}")]
    NonPositiveQuantum(i64),
    #[error("iteration_factor must be > 0")]
    ZeroIterationFactor,
}

/// Rejections raised when a timeline is rebuilt from serialized intervals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("interval {index}: empty span [{start}, {end})")]
    EmptyInterval { index: usize, start: Ticks, end: Ticks },
    #[error("interval {index}: starts at {start}, before the previous one ends at {prev_end}")]
    Overlap {
        index: usize,
        start: Ticks,
        prev_end: Ticks,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("simulation exceeded {cap} iterations (stopped at {iterations})")]
    ResourceExhaustion { iterations: u64, cap: u64 },
}
