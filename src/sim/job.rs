use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::{core::state::Ticks, error::ValidationError};

pub type JobId = u64;

/// Caller-supplied process descriptor, as read from a workload file.
///
/// Times are signed so that out-of-range input can be reported instead of
/// failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub id: JobId,
    pub arrival_time: i64,
    pub burst_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl ProcessSpec {
    pub fn new(id: JobId, arrival_time: i64, burst_time: i64) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Validated, immutable process record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    // Absent priorities rank as 0
    pub priority: i64,
}

impl TryFrom<&ProcessSpec> for Job {
    type Error = ValidationError;

    fn try_from(spec: &ProcessSpec) -> Result<Self, Self::Error> {
        if spec.burst_time <= 0 {
            return Err(ValidationError::NonPositiveBurst {
                id: spec.id,
                burst_time: spec.burst_time,
            });
        }
        if spec.arrival_time < 0 {
            return Err(ValidationError::NegativeArrival {
                id: spec.id,
                arrival_time: spec.arrival_time,
            });
        }

        Ok(Job {
            id: spec.id,
            arrival_time: spec.arrival_time as Ticks,
            burst_time: spec.burst_time as Ticks,
            priority: spec.priority.unwrap_or(0),
        })
    }
}

/// Checks every descriptor and returns the validated jobs in input order.
/// Fails on the first offending descriptor.
pub fn validate(specs: &[ProcessSpec]) -> Result<Vec<Job>, ValidationError> {
    let mut seen = FxHashSet::default();
    let mut jobs = Vec::with_capacity(specs.len());
    let mut total_burst: Ticks = 0;

    for spec in specs {
        let job = Job::try_from(spec)?;
        if !seen.insert(job.id) {
            return Err(ValidationError::DuplicateId { id: job.id });
        }
        total_burst = total_burst
            .checked_add(job.burst_time)
            .ok_or(ValidationError::TimeOverflow { id: job.id })?;
        jobs.push(job);
    }

    // Worst case the last arrival waits for every burst
    for job in &jobs {
        if job.arrival_time.checked_add(total_burst).is_none() {
            return Err(ValidationError::TimeOverflow { id: job.id });
        }
    }

    Ok(jobs)
}

/// A job enriched with the metrics derived from a finished simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInstance {
    #[serde(flatten)]
    pub job: Job,
    pub completion_time: Ticks,
    pub turnaround_time: Ticks,
    pub waiting_time: Ticks,
    pub response_time: Ticks,
}
