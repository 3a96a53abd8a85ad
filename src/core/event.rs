use crate::core::{TaskId, TaskState, Ticks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedCoreEvent {
    TaskStateChange {
        task: TaskId,
        from: TaskState,
        to: TaskState,
    },
    // A new timeline interval opens for `task`
    Dispatch {
        task: TaskId,
        at: Ticks,
    },
    // Running task displaced before completion (slice expiry or a better candidate)
    Preempt {
        task: TaskId,
        at: Ticks,
    },
    // Nothing runnable; clock jumps to the next arrival
    CpuIdle {
        from: Ticks,
        to: Ticks,
    },
}
