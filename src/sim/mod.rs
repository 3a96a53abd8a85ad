pub mod driver;
pub mod job;
pub mod metrics;
pub mod timeline;

pub use driver::{Sim, SimOutput};
pub use job::{Job, JobId, JobInstance, ProcessSpec, validate};
pub use metrics::Summary;
pub use timeline::{Interval, Timeline, TimelineBuilder};
