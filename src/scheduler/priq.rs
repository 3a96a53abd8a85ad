use std::{cmp::Ordering, fmt, marker::PhantomData};

use keyed_priority_queue::KeyedPriorityQueue;

use super::{DispatchDecision, EnqueueFlags, KernelCtx, Scheduler, TaskId};
use crate::{core::Task, core::Ticks, sim::JobId};

/// Primary ordering for a keyed policy. Ties always fall back to
/// arrival_time, then job id.
pub trait SelectionKey {
    type Primary: Ord + Copy + fmt::Debug;

    const PREEMPTIVE: bool;

    fn primary(task: &Task) -> Self::Primary;
}

/// SJF, non-preemptive.
#[derive(Debug)]
pub struct ShortestJob;

/// SRTF. A waiting task's remaining time is frozen while it waits, so the
/// rank captured at enqueue stays valid until it runs again.
#[derive(Debug)]
pub struct ShortestRemaining;

/// Priority, non-preemptive. Lower value runs first.
#[derive(Debug)]
pub struct Priority;

/// Priority, preemptive. Lower value runs first.
#[derive(Debug)]
pub struct PriorityPreemptive;

impl SelectionKey for ShortestJob {
    type Primary = Ticks;
    const PREEMPTIVE: bool = false;

    fn primary(task: &Task) -> Ticks {
        task.burst_time
    }
}

impl SelectionKey for ShortestRemaining {
    type Primary = Ticks;
    const PREEMPTIVE: bool = true;

    fn primary(task: &Task) -> Ticks {
        task.remaining_time
    }
}

impl SelectionKey for Priority {
    type Primary = i64;
    const PREEMPTIVE: bool = false;

    fn primary(task: &Task) -> i64 {
        task.priority
    }
}

impl SelectionKey for PriorityPreemptive {
    type Primary = i64;
    const PREEMPTIVE: bool = true;

    fn primary(task: &Task) -> i64 {
        task.priority
    }
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Rank<P> {
    primary: P,
    arrival_time: Ticks,
    job_id: JobId,
}

impl<P: Ord> Rank<P> {
    fn key(&self) -> (&P, Ticks, JobId) {
        (&self.primary, self.arrival_time, self.job_id)
    }
}

// KeyedPriorityQueue is a max-heap, so we need to flip-flop Rank's Ord
impl<P: Ord> PartialOrd for Rank<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: Ord> Ord for Rank<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

pub struct PriqScheduler<K: SelectionKey> {
    queue: KeyedPriorityQueue<TaskId, Rank<K::Primary>>,
    _key: PhantomData<K>,
}

pub type SjfScheduler = PriqScheduler<ShortestJob>;
pub type SrtfScheduler = PriqScheduler<ShortestRemaining>;
pub type PriorityScheduler = PriqScheduler<Priority>;
pub type PriorityPreemptiveScheduler = PriqScheduler<PriorityPreemptive>;

impl<K: SelectionKey> PriqScheduler<K> {
    pub fn new() -> Self {
        Self {
            queue: KeyedPriorityQueue::new(),
            _key: PhantomData,
        }
    }

    fn rank(ctx: &KernelCtx, task: TaskId) -> Rank<K::Primary> {
        let task = ctx.task(task);
        Rank {
            primary: K::primary(task),
            arrival_time: task.arrival_time,
            job_id: task.job_id,
        }
    }
}

impl<K: SelectionKey> Default for PriqScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SelectionKey> Scheduler for PriqScheduler<K> {
    fn enqueue(&mut self, ctx: &KernelCtx, task: TaskId, _flags: EnqueueFlags) {
        let prev = self.queue.push(task, Self::rank(ctx, task));
        debug_assert!(prev.is_none(), "Task {task} already queued");
    }

    fn dispatch(&mut self, _ctx: &KernelCtx) -> Option<DispatchDecision> {
        self.queue
            .pop()
            .map(|(task, _)| DispatchDecision { task, slice: None })
    }

    fn preemptive(&self) -> bool {
        K::PREEMPTIVE
    }

    fn should_preempt(&self, ctx: &KernelCtx, current: TaskId) -> bool {
        if !K::PREEMPTIVE {
            return false;
        }
        match self.queue.peek() {
            // Flipped order: "greater" means strictly better candidate
            Some((_, best)) => *best > Self::rank(ctx, current),
            None => false,
        }
    }

    fn contains(&self, task: TaskId) -> bool {
        self.queue.get_priority(&task).is_some()
    }

    fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Job;

    fn ctx(jobs: &[(JobId, Ticks, Ticks, i64)]) -> KernelCtx {
        let jobs: Vec<Job> = jobs
            .iter()
            .map(|&(id, arrival_time, burst_time, priority)| Job {
                id,
                arrival_time,
                burst_time,
                priority,
            })
            .collect();
        KernelCtx::new(&jobs)
    }

    fn drain<K: SelectionKey>(ctx: &KernelCtx, sched: &mut PriqScheduler<K>) -> Vec<JobId> {
        std::iter::from_fn(|| sched.dispatch(ctx))
            .map(|d| ctx.task(d.task).job_id)
            .collect()
    }

    #[test]
    fn sjf_breaks_ties_on_arrival_then_id() {
        let ctx = ctx(&[(4, 2, 3, 0), (3, 1, 3, 0), (2, 1, 3, 0), (1, 0, 9, 0)]);
        let mut sched = SjfScheduler::new();
        for task in 0..4 {
            sched.enqueue(&ctx, task, 0);
        }
        assert_eq!(drain(&ctx, &mut sched), vec![2, 3, 4, 1]);
    }

    #[test]
    fn lower_priority_value_wins() {
        let ctx = ctx(&[(1, 0, 5, 3), (2, 0, 5, -1), (3, 0, 5, 0)]);
        let mut sched = PriorityScheduler::new();
        for task in 0..3 {
            sched.enqueue(&ctx, task, 0);
        }
        assert_eq!(drain(&ctx, &mut sched), vec![2, 3, 1]);
    }

    #[test]
    fn srtf_preempts_only_on_strictly_better_rank() {
        let mut ctx = ctx(&[(1, 0, 5, 0), (2, 1, 4, 0), (3, 1, 3, 0)]);
        let mut sched = SrtfScheduler::new();
        ctx.task_mut(0).remaining_time = 4;

        // Equal remaining time: the earlier arrival keeps the CPU
        sched.enqueue(&ctx, 1, 0);
        assert!(!sched.should_preempt(&ctx, 0));

        sched.enqueue(&ctx, 2, 0);
        assert!(sched.should_preempt(&ctx, 0));
        assert!(sched.contains(2));
        assert_eq!(sched.queued(), 2);

        assert_eq!(sched.dispatch(&ctx).map(|d| d.task), Some(2));
        assert!(!sched.contains(2));
        assert!(sched.contains(1));
        assert!(!sched.contains(0));
    }

    #[test]
    fn non_preemptive_keys_never_preempt() {
        let ctx = ctx(&[(1, 0, 9, 5), (2, 1, 1, 0)]);
        let mut sched = PriorityScheduler::new();
        sched.enqueue(&ctx, 1, 0);
        assert!(!sched.preemptive());
        assert!(!sched.should_preempt(&ctx, 0));
    }
}
