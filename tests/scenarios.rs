use sched_model::{
    Algorithm, ConfigError, JobId, ProcessSpec, SimError, SimOutput, ValidationError, simulate,
};

fn spans(output: &SimOutput) -> Vec<(JobId, u64, u64)> {
    output
        .timeline
        .iter()
        .map(|i| (i.job_id, i.start, i.end))
        .collect()
}

// (CT, TAT, WT, RT) per process, input order
fn metrics(output: &SimOutput) -> Vec<(u64, u64, u64, u64)> {
    output
        .processes
        .iter()
        .map(|p| {
            (
                p.completion_time,
                p.turnaround_time,
                p.waiting_time,
                p.response_time,
            )
        })
        .collect()
}

fn four_processes() -> Vec<ProcessSpec> {
    vec![
        ProcessSpec::new(1, 0, 5).with_priority(2),
        ProcessSpec::new(2, 1, 3).with_priority(1),
        ProcessSpec::new(3, 2, 8).with_priority(3),
        ProcessSpec::new(4, 3, 6).with_priority(2),
    ]
}

#[test]
fn fcfs_two_processes() {
    let specs = [ProcessSpec::new(1, 0, 5), ProcessSpec::new(2, 1, 3)];
    let out = simulate(&specs, Algorithm::Fcfs, None).unwrap();
    assert_eq!(spans(&out), vec![(1, 0, 5), (2, 5, 8)]);
    assert_eq!(metrics(&out), vec![(5, 5, 0, 0), (8, 7, 4, 4)]);
}

#[test]
fn round_robin_queues_newcomers_ahead_of_requeued_process() {
    let specs = [ProcessSpec::new(1, 0, 5), ProcessSpec::new(2, 1, 3)];
    let out = simulate(&specs, Algorithm::RoundRobin, Some(2)).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 2), (2, 2, 4), (1, 4, 6), (2, 6, 7), (1, 7, 8)]
    );
    assert_eq!(metrics(&out), vec![(8, 8, 3, 0), (7, 6, 3, 1)]);
}

#[test]
fn round_robin_arrival_at_slice_end_also_goes_first() {
    let specs = [ProcessSpec::new(1, 0, 4), ProcessSpec::new(2, 2, 2)];
    let out = simulate(&specs, Algorithm::RoundRobin, Some(2)).unwrap();
    assert_eq!(spans(&out), vec![(1, 0, 2), (2, 2, 4), (1, 4, 6)]);
}

#[test]
fn srtf_preempts_at_first_shorter_arrival() {
    let out = simulate(&four_processes(), Algorithm::Srtf, None).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 1), (2, 1, 4), (1, 4, 8), (4, 8, 14), (3, 14, 22)]
    );
    assert_eq!(
        metrics(&out),
        vec![(8, 8, 3, 0), (4, 3, 0, 0), (22, 20, 12, 12), (14, 11, 5, 5)]
    );
}

#[test]
fn sjf_runs_each_burst_to_completion() {
    let out = simulate(&four_processes(), Algorithm::SjfNp, None).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 5), (2, 5, 8), (4, 8, 14), (3, 14, 22)]
    );
}

#[test]
fn priority_non_preemptive_ignores_better_arrivals() {
    let out = simulate(&four_processes(), Algorithm::PriorityNp, None).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 5), (2, 5, 8), (4, 8, 14), (3, 14, 22)]
    );
    assert_eq!(metrics(&out)[1], (8, 7, 4, 4));
}

#[test]
fn priority_preemptive_switches_on_higher_priority_arrival() {
    let out = simulate(&four_processes(), Algorithm::PriorityP, None).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 1), (2, 1, 4), (1, 4, 8), (4, 8, 14), (3, 14, 22)]
    );
}

#[test]
fn priority_ties_fall_back_to_arrival_then_id() {
    let specs = [
        ProcessSpec::new(9, 0, 1).with_priority(1),
        ProcessSpec::new(3, 1, 2).with_priority(0),
        ProcessSpec::new(2, 1, 2).with_priority(0),
        ProcessSpec::new(1, 0, 2).with_priority(0),
    ];
    let out = simulate(&specs, Algorithm::PriorityNp, None).unwrap();
    assert_eq!(
        spans(&out),
        vec![(1, 0, 2), (2, 2, 4), (3, 4, 6), (9, 6, 7)]
    );
}

#[test]
fn idle_cpu_waits_for_late_arrivals() {
    let specs = [ProcessSpec::new(1, 2, 2), ProcessSpec::new(2, 10, 1)];
    for algorithm in Algorithm::ALL {
        let out = simulate(&specs, algorithm, Some(1)).unwrap();
        assert_eq!(
            out.timeline.merged().len(),
            2,
            "{algorithm}: {:?}",
            out.timeline
        );
        assert_eq!(out.timeline.first_start_of(1), Some(2));
        assert_eq!(out.timeline.first_start_of(2), Some(10));
        assert_eq!(out.summary.makespan, 11);
        assert_eq!(out.timeline.idle_time(), 8);
    }
}

#[test]
fn empty_input_yields_empty_output() {
    for algorithm in Algorithm::ALL {
        let out = simulate(&[], algorithm, Some(3)).unwrap();
        assert!(out.processes.is_empty());
        assert!(out.timeline.is_empty());
    }
}

#[test]
fn single_process_at_zero_never_waits() {
    let specs = [ProcessSpec::new(1, 0, 7).with_priority(3)];
    for algorithm in Algorithm::ALL {
        let out = simulate(&specs, algorithm, Some(2)).unwrap();
        assert_eq!(metrics(&out), vec![(7, 7, 0, 0)], "{algorithm}");
    }
}

#[test]
fn round_robin_quantum_errors_before_simulating() {
    let specs = [ProcessSpec::new(1, 0, 3)];
    assert_eq!(
        simulate(&specs, Algorithm::RoundRobin, None),
        Err(SimError::Configuration(ConfigError::MissingQuantum))
    );
    assert_eq!(
        simulate(&specs, Algorithm::RoundRobin, Some(0)),
        Err(SimError::Configuration(ConfigError::NonPositiveQuantum(0)))
    );
}

#[test]
fn invalid_processes_are_rejected_for_every_algorithm() {
    let specs = [ProcessSpec::new(1, 0, 3), ProcessSpec::new(1, 2, 3)];
    for algorithm in Algorithm::ALL {
        assert_eq!(
            simulate(&specs, algorithm, Some(2)),
            Err(SimError::Validation(ValidationError::DuplicateId { id: 1 }))
        );
    }
}

#[test]
fn output_serializes_with_metrics_inline() {
    let specs = [ProcessSpec::new(1, 0, 2)];
    let out = simulate(&specs, Algorithm::Fcfs, None).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["algorithm"], "FCFS");
    assert_eq!(json["processes"][0]["id"], 1);
    assert_eq!(json["processes"][0]["completion_time"], 2);
    assert_eq!(json["timeline"][0]["end"], 2);
    assert!(json.get("quantum").is_none());
}
