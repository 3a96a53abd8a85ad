use log::{debug, trace, warn};

use super::{
    event::SchedCoreEvent,
    observer::Observer,
    state::{KernelCtx, TaskId, TaskState, Ticks},
};
use crate::{
    error::SimError,
    scheduler::{
        DispatchDecision, EnqueueFlags, ENQ_PREEMPT, ENQ_REENQ, ENQ_WAKEUP, Scheduler,
    },
    sim::{Job, Timeline, TimelineBuilder},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    Idle,
    Running,
    Switching,
    Done,
}

/// Event-driven single-CPU driver.
///
/// A dispatched task runs until the earliest of: completion, slice expiry,
/// or (preemptive policies only) the next arrival. Between those points
/// nothing a policy looks at can change, so the decisions match a driver
/// that re-evaluates on every tick.
pub struct SchedCore<S: Scheduler> {
    pub ctx: KernelCtx,
    pub scheduler: S,
    observer: Observer,
    timeline: TimelineBuilder,
    state: CoreState,
    // Absolute end of the current slice, if the policy bounded it
    slice_end: Option<Ticks>,
    iterations: u64,
    iteration_cap: u64,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(jobs: &[Job], scheduler: S, iteration_factor: u64) -> Self {
        let ctx = KernelCtx::new(jobs);
        // Each step either jumps an idle gap (at most one per task) or runs
        // at least one tick
        let iteration_cap = iteration_factor
            .saturating_mul(ctx.total_burst().saturating_add(ctx.tasks.len() as u64));
        Self {
            ctx,
            scheduler,
            observer: Observer::new(),
            timeline: TimelineBuilder::new(),
            state: CoreState::Idle,
            slice_end: None,
            iterations: 0,
            iteration_cap,
        }
    }

    pub fn with_iteration_cap(mut self, cap: u64) -> Self {
        self.iteration_cap = cap;
        self
    }

    /// Steps until every task has completed and returns the sealed timeline.
    pub fn run(mut self) -> Result<Timeline, SimError> {
        while self.state != CoreState::Done {
            for event in self.step()? {
                trace!("t={} {:?}", self.ctx.now, event);
            }
        }

        // Every counted step ends in exactly one observation
        debug_assert_eq!(self.observer.steps(), self.iterations);
        debug!(
            "simulation done at t={} after {} steps",
            self.ctx.now, self.iterations
        );
        Ok(self.timeline.seal())
    }

    pub fn step(&mut self) -> Result<Vec<SchedCoreEvent>, SimError> {
        let mut events = Vec::new();
        if self.state == CoreState::Done {
            return Ok(events);
        }
        if self.ctx.all_completed() {
            self.state = CoreState::Done;
            return Ok(events);
        }

        self.iterations += 1;
        if self.iterations > self.iteration_cap {
            return Err(SimError::ResourceExhaustion {
                iterations: self.iterations,
                cap: self.iteration_cap,
            });
        }

        self.handle_arrivals(&mut events);

        if self.ctx.cpu_is_idle() {
            match self.scheduler.dispatch(&self.ctx) {
                Some(decision) => self.switch_to(decision, &mut events),
                None => {
                    self.idle(&mut events);
                    self.observer.observe(&self.ctx, &self.scheduler);
                    return Ok(events);
                }
            }
        }

        self.run_current(&mut events);
        self.observer.observe(&self.ctx, &self.scheduler);
        Ok(events)
    }

    fn handle_arrivals(&mut self, events: &mut Vec<SchedCoreEvent>) {
        for task in self.ctx.take_arrivals() {
            self.wake_task(task, events);
        }
    }

    fn wake_task(&mut self, task: TaskId, events: &mut Vec<SchedCoreEvent>) {
        let from = self.ctx.mark_runnable(task);
        events.push(SchedCoreEvent::TaskStateChange {
            task,
            from,
            to: TaskState::Runnable,
        });
        self.scheduler.enqueue(&self.ctx, task, ENQ_WAKEUP);
    }

    // Nothing queued: jump the clock to the next arrival
    fn idle(&mut self, events: &mut Vec<SchedCoreEvent>) {
        self.state = CoreState::Idle;
        match self.ctx.next_arrival() {
            Some(arrival) => {
                events.push(SchedCoreEvent::CpuIdle {
                    from: self.ctx.now,
                    to: arrival,
                });
                self.ctx.advance_time(arrival - self.ctx.now);
            }
            // Runnable work exists but the policy handed nothing out; the
            // iteration cap ends this
            None => warn!(
                "t={}: no task dispatched with {} tasks queued",
                self.ctx.now,
                self.scheduler.queued()
            ),
        }
    }

    fn switch_to(&mut self, decision: DispatchDecision, events: &mut Vec<SchedCoreEvent>) {
        let DispatchDecision { task, slice } = decision;
        let now = self.ctx.now;

        let from = self.ctx.set_running(task);
        events.push(SchedCoreEvent::TaskStateChange {
            task,
            from,
            to: TaskState::Running,
        });
        events.push(SchedCoreEvent::Dispatch { task, at: now });

        self.timeline.open(self.ctx.task(task).job_id, now);
        self.slice_end = slice.map(|slice| now + slice.max(1));
        self.state = CoreState::Running;
    }

    fn run_current(&mut self, events: &mut Vec<SchedCoreEvent>) {
        let task = self.ctx.current.expect("Dispatched task missing from CPU");
        let now = self.ctx.now;

        let mut stop = now + self.ctx.task(task).remaining_time;
        if let Some(slice_end) = self.slice_end {
            stop = stop.min(slice_end);
        }
        if self.scheduler.preemptive() {
            if let Some(arrival) = self.ctx.next_arrival() {
                stop = stop.min(arrival);
            }
        }
        debug_assert!(stop > now, "Task {task} would run for zero ticks");

        self.ctx.task_mut(task).remaining_time -= stop - now;
        self.ctx.advance_time(stop - now);

        // Admit arrivals up to `stop` before the stopped task is requeued
        self.handle_arrivals(events);

        if self.ctx.task(task).remaining_time == 0 {
            self.complete_current(task, events);
        } else if self.slice_end == Some(stop) {
            self.preempt_current(task, ENQ_PREEMPT | ENQ_REENQ, events);
        } else if self.scheduler.should_preempt(&self.ctx, task) {
            self.preempt_current(task, ENQ_PREEMPT, events);
        }
    }

    fn complete_current(&mut self, task: TaskId, events: &mut Vec<SchedCoreEvent>) {
        let now = self.ctx.now;
        self.timeline.close(now);
        self.ctx.clear_cpu();
        self.ctx.mark_completed(task, now);
        self.slice_end = None;
        events.push(SchedCoreEvent::TaskStateChange {
            task,
            from: TaskState::Running,
            to: TaskState::Completed,
        });

        self.state = if self.ctx.all_completed() {
            CoreState::Done
        } else {
            CoreState::Switching
        };
    }

    fn preempt_current(
        &mut self,
        task: TaskId,
        flags: EnqueueFlags,
        events: &mut Vec<SchedCoreEvent>,
    ) {
        let now = self.ctx.now;
        self.timeline.close(now);
        self.ctx.clear_cpu();
        self.slice_end = None;
        events.push(SchedCoreEvent::Preempt { task, at: now });

        let from = self.ctx.mark_runnable(task);
        events.push(SchedCoreEvent::TaskStateChange {
            task,
            from,
            to: TaskState::Runnable,
        });
        self.scheduler.enqueue(&self.ctx, task, flags);
        self.state = CoreState::Switching;
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    pub fn now(&self) -> Ticks {
        self.ctx.now
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}
