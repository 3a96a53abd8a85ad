pub mod fifo;
pub mod priq;
pub mod rr;

use crate::core::{
    Ticks,
    state::{KernelCtx, TaskId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use fifo::FifoScheduler;
pub use priq::{
    Priority, PriorityPreemptive, PriorityPreemptiveScheduler, PriorityScheduler, PriqScheduler,
    SelectionKey, ShortestJob, ShortestRemaining, SjfScheduler, SrtfScheduler,
};
pub use rr::RoundRobinScheduler;

pub type EnqueueFlags = u64;

pub const ENQ_WAKEUP: EnqueueFlags = 1 << 0;
pub const ENQ_PREEMPT: EnqueueFlags = 1 << 1;
pub const ENQ_REENQ: EnqueueFlags = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchDecision {
    pub task: TaskId,
    // None: run until completion or until preempts() says otherwise
    pub slice: Option<Ticks>,
}

/// A selection policy.
///
/// The driver owns the clock and the task table; a policy only decides
/// which runnable task goes next. Every runnable task that is not on the
/// CPU has been handed to `enqueue` exactly once since it last ran.
pub trait Scheduler {
    fn enqueue(&mut self, ctx: &KernelCtx, task: TaskId, flags: EnqueueFlags);

    /// Removes and returns the next task to run, or `None` when nothing is queued.
    fn dispatch(&mut self, ctx: &KernelCtx) -> Option<DispatchDecision>;

    /// Whether arrivals interrupt the running task for re-evaluation.
    fn preemptive(&self) -> bool {
        false
    }

    /// Called at an arrival while `current` is on the CPU. Returning true
    /// stops `current` and re-enqueues it with `ENQ_PREEMPT`.
    fn should_preempt(&self, _ctx: &KernelCtx, _current: TaskId) -> bool {
        false
    }

    fn contains(&self, task: TaskId) -> bool;

    fn queued(&self) -> usize;
}

/// Algorithm selector of the public interface.
///
/// On the command line both the kebab-case flag value (`sjf-np`) and the
/// name used in workload files (`SJF_NP`) are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    #[value(alias = "FCFS")]
    Fcfs,
    #[value(alias = "SJF_NP")]
    SjfNp,
    #[value(alias = "SRTF")]
    Srtf,
    #[value(alias = "PRIORITY_NP")]
    PriorityNp,
    #[value(alias = "PRIORITY_P")]
    PriorityP,
    #[value(alias = "ROUND_ROBIN")]
    RoundRobin,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Fcfs,
        Algorithm::SjfNp,
        Algorithm::Srtf,
        Algorithm::PriorityNp,
        Algorithm::PriorityP,
        Algorithm::RoundRobin,
    ];

    pub fn is_preemptive(self) -> bool {
        matches!(
            self,
            Algorithm::Srtf | Algorithm::PriorityP | Algorithm::RoundRobin
        )
    }

    pub fn needs_quantum(self) -> bool {
        self == Algorithm::RoundRobin
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::Fcfs => write!(f, "FCFS"),
            Algorithm::SjfNp => write!(f, "SJF_NP"),
            Algorithm::Srtf => write!(f, "SRTF"),
            Algorithm::PriorityNp => write!(f, "PRIORITY_NP"),
            Algorithm::PriorityP => write!(f, "PRIORITY_P"),
            Algorithm::RoundRobin => write!(f, "ROUND_ROBIN"),
        }
    }
}
