use std::num::NonZeroU64;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    job::{self, Job, JobInstance, ProcessSpec},
    metrics::{self, Summary},
    timeline::Timeline,
};
use crate::{
    config::SimConfig,
    core::SchedCore,
    error::SimError,
    scheduler::{
        Algorithm, FifoScheduler, PriorityPreemptiveScheduler, PriorityScheduler,
        RoundRobinScheduler, Scheduler, SjfScheduler, SrtfScheduler,
    },
};

/// Result of one simulation run. Independent of the input it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOutput {
    pub algorithm: Algorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum: Option<u64>,
    pub processes: Vec<JobInstance>,
    pub timeline: Timeline,
    pub summary: Summary,
}

/// A validated, ready-to-run simulation.
///
/// Construction performs every check up front, so `run` can only fail on
/// the iteration cap.
#[derive(Debug, Clone)]
pub struct Sim {
    jobs: Vec<Job>,
    config: SimConfig,
    quantum: Option<NonZeroU64>,
}

impl Sim {
    pub fn new(specs: &[ProcessSpec], config: &SimConfig) -> Result<Self, SimError> {
        let quantum = config.validate()?;
        let jobs = job::validate(specs)?;
        Ok(Self {
            jobs,
            config: *config,
            quantum,
        })
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    pub fn run(&self) -> Result<SimOutput, SimError> {
        debug!(
            "running {} over {} processes",
            self.config.algorithm,
            self.jobs.len()
        );

        let timeline = match self.config.algorithm {
            Algorithm::Fcfs => self.run_with(FifoScheduler::new()),
            Algorithm::SjfNp => self.run_with(SjfScheduler::new()),
            Algorithm::Srtf => self.run_with(SrtfScheduler::new()),
            Algorithm::PriorityNp => self.run_with(PriorityScheduler::new()),
            Algorithm::PriorityP => self.run_with(PriorityPreemptiveScheduler::new()),
            Algorithm::RoundRobin => {
                let quantum = self.quantum.expect("Round-robin validated without quantum");
                self.run_with(RoundRobinScheduler::new(quantum))
            }
        }?;

        let processes = metrics::compute(&self.jobs, &timeline);
        let summary = Summary::new(&processes, &timeline);
        Ok(SimOutput {
            algorithm: self.config.algorithm,
            quantum: self.quantum.map(NonZeroU64::get),
            processes,
            timeline,
            summary,
        })
    }

    fn run_with<S: Scheduler>(&self, scheduler: S) -> Result<Timeline, SimError> {
        SchedCore::new(&self.jobs, scheduler, self.config.iteration_factor).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ValidationError};

    #[test]
    fn configuration_is_checked_before_processes() {
        let specs = [ProcessSpec::new(1, 0, 0)];
        let config = SimConfig::new(Algorithm::RoundRobin);
        assert_eq!(
            Sim::new(&specs, &config).unwrap_err(),
            SimError::Configuration(ConfigError::MissingQuantum)
        );
        assert_eq!(
            Sim::new(&specs, &config.with_quantum(2)).unwrap_err(),
            SimError::Validation(ValidationError::NonPositiveBurst { id: 1, burst_time: 0 })
        );
    }

    #[test]
    fn output_reports_the_quantum_only_for_round_robin() {
        let specs = [ProcessSpec::new(1, 0, 3)];
        let rr = Sim::new(&specs, &SimConfig::new(Algorithm::RoundRobin).with_quantum(2))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(rr.quantum, Some(2));

        let fcfs = Sim::new(&specs, &SimConfig::new(Algorithm::Fcfs).with_quantum(2))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(fcfs.quantum, None);
    }

    #[test]
    fn validated_jobs_keep_input_order() {
        let specs = [
            ProcessSpec::new(9, 4, 1),
            ProcessSpec::new(2, 0, 3).with_priority(-2),
        ];
        let sim = Sim::new(&specs, &SimConfig::new(Algorithm::PriorityP)).unwrap();
        assert_eq!(sim.algorithm(), Algorithm::PriorityP);
        let ids: Vec<_> = sim.jobs().iter().map(|j| (j.id, j.priority)).collect();
        assert_eq!(ids, vec![(9, 0), (2, -2)]);
    }

    #[test]
    fn output_json_reloads_only_with_a_well_formed_timeline() {
        let specs = [ProcessSpec::new(1, 0, 2), ProcessSpec::new(2, 0, 2)];
        let output = Sim::new(&specs, &SimConfig::new(Algorithm::Fcfs))
            .unwrap()
            .run()
            .unwrap();
        let mut json = serde_json::to_value(&output).unwrap();
        let back: SimOutput = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, output);

        // Pull the second interval back over the first
        json["timeline"][1]["start"] = serde_json::json!(1);
        assert!(serde_json::from_value::<SimOutput>(json).is_err());
    }
}
