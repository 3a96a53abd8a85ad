use super::{DispatchDecision, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// First-come-first-served.
///
/// The driver admits arrivals in (arrival_time, job_id) order and a task is
/// never re-enqueued, so plain queue order is the selection key.
#[derive(Debug, Default)]
pub struct FifoScheduler {
    queue: VecDeque<TaskId>,
    queued: FxHashSet<TaskId>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for FifoScheduler {
    fn enqueue(&mut self, _ctx: &KernelCtx, task: TaskId, flags: EnqueueFlags) {
        let fresh = self.queued.insert(task);
        debug_assert!(fresh, "Task {task} enqueued twice (flags {flags:#x})");
        self.queue.push_back(task);
    }

    fn dispatch(&mut self, _ctx: &KernelCtx) -> Option<DispatchDecision> {
        let task = self.queue.pop_front()?;
        self.queued.remove(&task);
        Some(DispatchDecision { task, slice: None })
    }

    fn contains(&self, task: TaskId) -> bool {
        self.queued.contains(&task)
    }

    fn queued(&self) -> usize {
        self.queue.len()
    }
}
