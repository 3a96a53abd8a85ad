use super::{DispatchDecision, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::core::Ticks;
use rustc_hash::FxHashSet;
use std::{collections::VecDeque, num::NonZeroU64};

/// Round-robin over a single FIFO ready queue.
///
/// The head runs for `min(quantum, remaining_time)`. The driver admits
/// tasks that arrived during the slice before handing back the unfinished
/// one, so newcomers queue ahead of it. Slice expiry is the only
/// preemption point; arrivals never interrupt a running slice.
#[derive(Debug)]
pub struct RoundRobinScheduler {
    queue: VecDeque<TaskId>,
    // Mirrors `queue` for constant-time membership checks
    queued: FxHashSet<TaskId>,
    quantum: NonZeroU64,
}

impl RoundRobinScheduler {
    pub fn new(quantum: NonZeroU64) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: FxHashSet::default(),
            quantum,
        }
    }

    pub fn quantum(&self) -> Ticks {
        self.quantum.get()
    }
}

impl Scheduler for RoundRobinScheduler {
    fn enqueue(&mut self, _ctx: &KernelCtx, task: TaskId, flags: EnqueueFlags) {
        let fresh = self.queued.insert(task);
        debug_assert!(fresh, "Task {task} enqueued twice (flags {flags:#x})");
        self.queue.push_back(task);
    }

    fn dispatch(&mut self, ctx: &KernelCtx) -> Option<DispatchDecision> {
        let task = self.queue.pop_front()?;
        self.queued.remove(&task);
        let slice = self.quantum().min(ctx.task(task).remaining_time);
        Some(DispatchDecision {
            task,
            slice: Some(slice),
        })
    }

    fn contains(&self, task: TaskId) -> bool {
        self.queued.contains(&task)
    }

    fn queued(&self) -> usize {
        self.queue.len()
    }
}
