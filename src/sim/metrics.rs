use average::{Estimate, Max, Mean};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{Job, JobId, JobInstance, Timeline};
use crate::core::Ticks;

/// Derives per-process metrics from a sealed timeline, in input order.
///
/// Every job must have at least one interval on the timeline.
pub fn compute(jobs: &[Job], timeline: &Timeline) -> Vec<JobInstance> {
    // job_id -> (first start, last end, busy ticks), one pass over the timeline
    let mut spans: FxHashMap<JobId, (Ticks, Ticks, Ticks)> = FxHashMap::default();
    for interval in timeline {
        spans
            .entry(interval.job_id)
            .and_modify(|(_, end, busy)| {
                *end = interval.end;
                *busy += interval.duration();
            })
            .or_insert((interval.start, interval.end, interval.duration()));
    }

    jobs.iter()
        .map(|job| {
            let &(first_start, completion_time, busy) =
                spans.get(&job.id).expect("Job missing from timeline");
            debug_assert_eq!(busy, job.burst_time);

            let turnaround_time = completion_time - job.arrival_time;
            JobInstance {
                job: job.clone(),
                completion_time,
                turnaround_time,
                waiting_time: turnaround_time - job.burst_time,
                response_time: first_start - job.arrival_time,
            }
        })
        .collect()
}

/// Aggregate view over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub avg_turnaround_time: f64,
    pub avg_waiting_time: f64,
    pub avg_response_time: f64,
    pub max_waiting_time: f64,
    // Busy share of [0, makespan]
    pub cpu_utilization: f64,
    // Completed processes per tick
    pub throughput: f64,
    pub makespan: u64,
    pub context_switches: usize,
}

impl Summary {
    pub fn new(processes: &[JobInstance], timeline: &Timeline) -> Self {
        if processes.is_empty() {
            return Self::default();
        }

        let makespan = timeline.makespan();
        Self {
            avg_turnaround_time: avg(processes.iter().map(|p| p.turnaround_time as f64)),
            avg_waiting_time: avg(processes.iter().map(|p| p.waiting_time as f64)),
            avg_response_time: avg(processes.iter().map(|p| p.response_time as f64)),
            max_waiting_time: processes
                .iter()
                .map(|p| p.waiting_time as f64)
                .collect::<Max>()
                .max(),
            cpu_utilization: timeline.busy_time() as f64 / makespan as f64,
            throughput: processes.len() as f64 / makespan as f64,
            makespan,
            context_switches: timeline.context_switches(),
        }
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<Mean>().estimate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::TimelineBuilder;

    fn job(id: u64, arrival_time: u64, burst_time: u64) -> Job {
        Job {
            id,
            arrival_time,
            burst_time,
            priority: 0,
        }
    }

    #[test]
    fn preempted_job_metrics() {
        let mut builder = TimelineBuilder::new();
        for (id, start, end) in [(1, 0, 1), (2, 1, 4), (1, 4, 8)] {
            builder.open(id, start);
            builder.close(end);
        }
        let timeline = builder.seal();
        let jobs = [job(1, 0, 5), job(2, 1, 3)];

        let out = compute(&jobs, &timeline);
        assert_eq!(out[0].completion_time, 8);
        assert_eq!(out[0].turnaround_time, 8);
        assert_eq!(out[0].waiting_time, 3);
        assert_eq!(out[0].response_time, 0);
        assert_eq!(out[1].completion_time, 4);
        assert_eq!(out[1].waiting_time, 0);

        let summary = Summary::new(&out, &timeline);
        assert_eq!(summary.avg_turnaround_time, 5.5);
        assert_eq!(summary.avg_waiting_time, 1.5);
        assert_eq!(summary.max_waiting_time, 3.0);
        assert_eq!(summary.cpu_utilization, 1.0);
        assert_eq!(summary.throughput, 0.25);
        assert_eq!(summary.context_switches, 2);
    }

    #[test]
    fn empty_run_has_zero_summary() {
        let summary = Summary::new(&[], &Timeline::default());
        assert_eq!(summary, Summary::default());
    }
}
