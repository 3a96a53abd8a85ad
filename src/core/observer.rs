use super::state::{KernelCtx, TaskState};
use crate::scheduler::Scheduler;

/// Cross-checks driver and policy bookkeeping after every step. All checks
/// are debug assertions; release builds only count steps.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe<S: Scheduler>(&mut self, ctx: &KernelCtx, scheduler: &S) {
        self.step += 1;

        if let Some(task_id) = ctx.current {
            debug_assert_eq!(
                ctx.task(task_id).state,
                TaskState::Running,
                "cpu.current task {task_id} must be Running"
            );
            debug_assert!(
                !scheduler.contains(task_id),
                "Running task {task_id} must not appear in the ready queue"
            );
        }

        for task in &ctx.tasks {
            debug_assert!(
                task.remaining_time <= task.burst_time,
                "Task {} consumed more than its burst",
                task.id
            );
            match task.state {
                TaskState::Runnable => debug_assert!(
                    scheduler.contains(task.id),
                    "Runnable task {} missing from the ready queue",
                    task.id
                ),
                TaskState::Completed => {
                    debug_assert_eq!(
                        task.remaining_time, 0,
                        "Completed task {} has work left",
                        task.id
                    );
                    debug_assert!(
                        !scheduler.contains(task.id),
                        "Completed task {} still queued",
                        task.id
                    );
                }
                TaskState::Blocked => debug_assert!(
                    task.arrival_time >= ctx.now && task.first_run_time.is_none(),
                    "Blocked task {} missed its arrival",
                    task.id
                ),
                TaskState::Running => debug_assert_eq!(
                    ctx.current,
                    Some(task.id),
                    "Task {} is Running but not on the CPU",
                    task.id
                ),
            }
        }
    }
}
