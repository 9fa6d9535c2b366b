pub mod project;
pub mod task;
pub mod timeline;

pub use project::Project;
pub use task::Task;
pub use timeline::{TimelineMapper, TimelineScale, TimelineWindow};
