use crate::sim::{Job, JobId};

// Index into Task Vec
pub type TaskId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    // Not yet arrived
    Blocked,
    Runnable,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub priority: i64,
    pub state: TaskState,
    pub remaining_time: Ticks,
    pub first_run_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

/// Engine-owned simulation state for a single run.
///
/// Built from its own copy of the validated jobs; nothing here aliases
/// caller-held records.
#[derive(Debug)]
pub struct KernelCtx {
    pub now: Ticks,
    pub tasks: Vec<Task>,
    pub current: Option<TaskId>,

    // Tasks ordered by (arrival_time, job_id); everything before the cursor has arrived
    arrival_order: Vec<TaskId>,
    arrival_cursor: usize,
    completed: usize,
}

impl KernelCtx {
    pub fn new(jobs: &[Job]) -> Self {
        let mut ctx = Self {
            now: 0,
            tasks: Vec::with_capacity(jobs.len()),
            current: None,
            arrival_order: Vec::with_capacity(jobs.len()),
            arrival_cursor: 0,
            completed: 0,
        };

        for job in jobs {
            ctx.create_task(job);
        }

        let tasks = &ctx.tasks;
        ctx.arrival_order = (0..tasks.len()).collect();
        ctx.arrival_order.sort_by(|&a, &b| {
            tasks[a]
                .arrival_time
                .cmp(&tasks[b].arrival_time)
                .then_with(|| tasks[a].job_id.cmp(&tasks[b].job_id))
        });

        ctx
    }

    pub fn create_task(&mut self, job: &Job) -> TaskId {
        let id = self.tasks.len();
        self.tasks.push(Task {
            id,
            job_id: job.id,
            arrival_time: job.arrival_time,
            burst_time: job.burst_time,
            priority: job.priority,
            state: TaskState::Blocked,
            remaining_time: job.burst_time,
            first_run_time: None,
            completion_time: None,
        });
        id
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    /// Arrival time of the earliest task that has not been admitted yet.
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrival_order
            .get(self.arrival_cursor)
            .map(|&task| self.tasks[task].arrival_time)
    }

    /// Pops every not-yet-admitted task with `arrival_time <= now`, in
    /// (arrival_time, job_id) order.
    pub fn take_arrivals(&mut self) -> Vec<TaskId> {
        let start = self.arrival_cursor;
        while let Some(&task) = self.arrival_order.get(self.arrival_cursor) {
            if self.tasks[task].arrival_time > self.now {
                break;
            }
            self.arrival_cursor += 1;
        }
        self.arrival_order[start..self.arrival_cursor].to_vec()
    }

    pub fn task(&self, task_id: TaskId) -> &Task {
        &self.tasks[task_id]
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> &mut Task {
        &mut self.tasks[task_id]
    }

    pub fn cpu_is_idle(&self) -> bool {
        self.current.is_none()
    }

    // Return previous state
    pub fn mark_runnable(&mut self, task_id: TaskId) -> TaskState {
        let task = self.task_mut(task_id);
        debug_assert!(
            task.state != TaskState::Completed,
            "Completed task {} cannot be runnable",
            task.id
        );
        let prev = task.state;
        task.state = TaskState::Runnable;
        prev
    }

    // Return previous state; records the response-time anchor on first run
    pub fn set_running(&mut self, task_id: TaskId) -> TaskState {
        debug_assert!(self.current.is_none(), "CPU already running a task");

        let now = self.now;
        self.current = Some(task_id);
        let task = self.task_mut(task_id);
        let prev = task.state;
        task.state = TaskState::Running;
        task.first_run_time.get_or_insert(now);
        prev
    }

    pub fn clear_cpu(&mut self) {
        self.current = None;
    }

    pub fn mark_completed(&mut self, task_id: TaskId, completion_time: Ticks) {
        let task = &mut self.tasks[task_id];
        debug_assert!(
            task.state == TaskState::Running,
            "Task {task_id} must have been running before marked complete"
        );
        debug_assert_eq!(task.remaining_time, 0, "Task {task_id} has work left");

        task.state = TaskState::Completed;
        task.completion_time = Some(completion_time);
        self.completed += 1;
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.tasks.len()
    }

    pub fn total_burst(&self) -> Ticks {
        self.tasks.iter().map(|t| t.burst_time).sum()
    }
}
