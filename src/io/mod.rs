pub mod background;
pub mod file;
pub mod store;

pub use background::{BackgroundStore, CommitFailure};
pub use file::{load_project, save_project};
pub use store::{JsonFileStore, MemoryStore, TaskStore};
