pub mod driver;
pub mod event;
pub mod observer;
pub mod state;

pub use driver::{CoreState, SchedCore};
pub use event::SchedCoreEvent;
pub use state::{KernelCtx, Task, TaskId, TaskState, Ticks};
