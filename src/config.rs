use log::debug;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

use crate::{error::ConfigError, scheduler::Algorithm, sim::ProcessSpec};

pub const DEFAULT_ITERATION_FACTOR: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub algorithm: Algorithm,
    // Only read for round-robin; signed so bad input can be reported
    pub quantum: Option<i64>,
    // Step budget per tick of total burst time (plus one per process)
    pub iteration_factor: u64,
}

impl SimConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn with_quantum(mut self, quantum: i64) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Checks the configuration and returns the round-robin quantum, `None`
    /// for every other algorithm.
    pub fn validate(&self) -> Result<Option<NonZeroU64>, ConfigError> {
        if self.iteration_factor == 0 {
            return Err(ConfigError::ZeroIterationFactor);
        }

        if !self.algorithm.needs_quantum() {
            if let Some(quantum) = self.quantum {
                debug!("ignoring quantum {quantum} for {}", self.algorithm);
            }
            return Ok(None);
        }

        let quantum = self.quantum.ok_or(ConfigError::MissingQuantum)?;
        u64::try_from(quantum)
            .ok()
            .and_then(NonZeroU64::new)
            .map(Some)
            .ok_or(ConfigError::NonPositiveQuantum(quantum))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Fcfs,
            quantum: None,
            iteration_factor: DEFAULT_ITERATION_FACTOR,
        }
    }
}

/// On-disk workload: a configuration plus the process list.
///
/// ```json
/// { "algorithm": "ROUND_ROBIN", "quantum": 2,
///   "processes": [{ "id": 1, "arrival_time": 0, "burst_time": 5 }] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Workload {
    #[serde(flatten)]
    pub config: SimConfig,
    pub processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
