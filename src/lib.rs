//! Dependency-aware Gantt scheduling: hierarchy ordering, timeline
//! geometry, pointer-driven edits, finish-to-start cascades and batched
//! commits to a task store.

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod scheduler;

pub use config::{Role, SchedulerConfig};
pub use error::{Error, Result};
pub use model::{Project, Task, TimelineMapper, TimelineWindow};
pub use scheduler::{CommitBatch, Scheduler};
