use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use rand::prelude::*;
use sched_model::{Algorithm, ProcessSpec, Sim, SimConfig, SimOutput, Workload};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

const PRIORITY_LEVELS: i64 = 5;

/// Simulate classical CPU scheduling disciplines over a process list.
#[derive(Debug, Parser)]
#[command(name = "sched_model", version)]
struct Opts {
    /// JSON workload file ({"algorithm", "quantum", "processes": [...]}).
    #[clap(short, long, conflicts_with = "random")]
    input: Option<PathBuf>,

    /// Generate a Bernoulli workload over this many ticks instead of reading one.
    #[clap(long)]
    random: Option<u64>,

    /// Seed for --random.
    #[clap(long, default_value = "0")]
    seed: u64,

    /// Scheduling algorithm. Overrides the workload file.
    #[clap(short, long, value_enum)]
    algorithm: Option<Algorithm>,

    /// Round-robin time quantum. Overrides the workload file.
    #[clap(short, long, allow_negative_numbers = true)]
    quantum: Option<i64>,

    /// Run every algorithm over the same workload and compare averages.
    #[clap(long, conflicts_with = "json")]
    all: bool,

    /// Print the result as JSON.
    #[clap(long)]
    json: bool,

    /// Coalesce contiguous intervals of the same process in the printed timeline.
    #[clap(long)]
    merge: bool,

    /// Enable verbose output, including trace of every scheduling event.
    /// Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let llv = match opts.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut lcfg = ConfigBuilder::new();
    lcfg.set_time_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off);
    TermLogger::init(
        llv,
        lcfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let mut workload = load_workload(&opts)?;
    if let Some(algorithm) = opts.algorithm {
        workload.config.algorithm = algorithm;
    }
    if opts.quantum.is_some() {
        workload.config.quantum = opts.quantum;
    }
    info!("{} processes loaded", workload.processes.len());

    if opts.all {
        return compare_all(&workload);
    }

    let sim = Sim::new(&workload.processes, &workload.config)?;
    info!(
        "{} processes validated for {}",
        sim.jobs().len(),
        sim.algorithm()
    );
    let output = sim.run()?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&output, opts.merge);
    }
    Ok(())
}

fn load_workload(opts: &Opts) -> Result<Workload> {
    match (&opts.input, opts.random) {
        (Some(path), _) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Workload::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
        }
        (None, Some(ticks)) => Ok(Workload {
            config: SimConfig::default(),
            processes: bernoulli_jobs(ticks, 0.3, 0.3, 2, 6, opts.seed),
        }),
        (None, None) => bail!("Either --input or --random is required"),
    }
}

fn compare_all(workload: &Workload) -> Result<()> {
    // Non-RR runs ignore the quantum; RR falls back to 2 when none was given
    let quantum = workload.config.quantum.unwrap_or(2);

    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>6} {:>9}",
        "algorithm", "avg TAT", "avg WT", "avg RT", "util", "switches"
    );
    for algorithm in Algorithm::ALL {
        let config = SimConfig {
            algorithm,
            quantum: Some(quantum),
            iteration_factor: workload.config.iteration_factor,
        };
        let output = Sim::new(&workload.processes, &config)?.run()?;
        let s = &output.summary;
        println!(
            "{:<12} {:>8.2} {:>8.2} {:>8.2} {:>5.0}% {:>9}",
            algorithm.to_string(),
            s.avg_turnaround_time,
            s.avg_waiting_time,
            s.avg_response_time,
            s.cpu_utilization * 100.0,
            s.context_switches
        );
    }
    Ok(())
}

fn print_report(output: &SimOutput, merge: bool) {
    match output.quantum {
        Some(quantum) => println!("--- {} (quantum={}) ---", output.algorithm, quantum),
        None => println!("--- {} ---", output.algorithm),
    }

    println!(
        "{:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5}",
        "PID", "AT", "BT", "PRIO", "CT", "TAT", "WT", "RT"
    );
    for p in &output.processes {
        println!(
            "{:>6} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5} {:>5}",
            format!("P{}", p.job.id),
            p.job.arrival_time,
            p.job.burst_time,
            p.job.priority,
            p.completion_time,
            p.turnaround_time,
            p.waiting_time,
            p.response_time
        );
    }

    let intervals = if merge {
        output.timeline.merged()
    } else {
        output.timeline.intervals().to_vec()
    };
    let timeline: Vec<String> = intervals
        .iter()
        .map(|i| format!("(P{}, {}, {})", i.job_id, i.start, i.end))
        .collect();
    println!("Timeline: [{}]", timeline.join(", "));

    let s = &output.summary;
    println!("Average turnaround time: {:.2} ticks", s.avg_turnaround_time);
    println!("Average waiting time: {:.2} ticks", s.avg_waiting_time);
    println!("Average response time: {:.2} ticks", s.avg_response_time);
    println!("Longest wait: {:.0} ticks", s.max_waiting_time);
    println!(
        "CPU utilization: {:.1}% over {} ticks, throughput {:.3}/tick",
        s.cpu_utilization * 100.0,
        s.makespan,
        s.throughput
    );
}

fn bernoulli_jobs(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: i64,
    long_ticks: i64,
    seed: u64,
) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let burst_time = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let priority = rng.random_range(0..PRIORITY_LEVELS);

            jobs.push(
                ProcessSpec::new(jobs.len() as u64 + 1, t as i64, burst_time)
                    .with_priority(priority),
            );
        }
    }

    jobs
}
