//! The persistence collaborator the scheduler reads snapshots from and hands
//! committed batches to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::file::{load_project, save_project};
use crate::error::{Error, Result};
use crate::model::{Project, Task};

/// Authoritative task storage, one task list per project.
pub trait TaskStore: Send + Sync {
    fn get_tasks(&self, project: Uuid) -> Result<Vec<Task>>;

    /// Persist a single edited task.
    fn commit_task(&self, project: Uuid, task: Task) -> Result<()>;

    /// Persist every task changed by one interaction as one batch.
    fn commit_tasks(&self, project: Uuid, tasks: Vec<Task>) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store. Records the size of every commit call and can be told
/// to fail commits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<Uuid, Vec<Task>>>,
    calls: Mutex<Vec<usize>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, project: Uuid, tasks: Vec<Task>) {
        lock(&self.projects).insert(project, tasks);
    }

    /// Task count of each commit call so far, in call order.
    pub fn commit_calls(&self) -> Vec<usize> {
        lock(&self.calls).clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn apply(&self, project: Uuid, tasks: Vec<Task>) -> Result<()> {
        lock(&self.calls).push(tasks.len());
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::other("store rejected commit")));
        }
        let mut projects = lock(&self.projects);
        let stored = projects
            .get_mut(&project)
            .ok_or(Error::ProjectNotFound(project))?;
        for task in tasks {
            match stored.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task,
                None => stored.push(task),
            }
        }
        Ok(())
    }
}

impl TaskStore for MemoryStore {
    fn get_tasks(&self, project: Uuid) -> Result<Vec<Task>> {
        lock(&self.projects)
            .get(&project)
            .cloned()
            .ok_or(Error::ProjectNotFound(project))
    }

    fn commit_task(&self, project: Uuid, task: Task) -> Result<()> {
        self.apply(project, vec![task])
    }

    fn commit_tasks(&self, project: Uuid, tasks: Vec<Task>) -> Result<()> {
        self.apply(project, tasks)
    }
}

/// One `<project-id>.gantt.json` file per project in a directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on the files.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, project: Uuid) -> PathBuf {
        self.dir.join(format!("{project}.gantt.json"))
    }

    pub fn save(&self, project: &Project) -> Result<()> {
        let _guard = lock(&self.write_lock);
        save_project(project, &self.path_for(project.id))
    }

    pub fn load(&self, project: Uuid) -> Result<Project> {
        let path = self.path_for(project);
        if !path.exists() {
            return Err(Error::ProjectNotFound(project));
        }
        load_project(&path)
    }
}

impl TaskStore for JsonFileStore {
    fn get_tasks(&self, project: Uuid) -> Result<Vec<Task>> {
        Ok(self.load(project)?.tasks)
    }

    fn commit_task(&self, project: Uuid, task: Task) -> Result<()> {
        self.commit_tasks(project, vec![task])
    }

    fn commit_tasks(&self, project: Uuid, tasks: Vec<Task>) -> Result<()> {
        let _guard = lock(&self.write_lock);
        let mut stored = self.load(project)?;
        stored.upsert_tasks(tasks);
        save_project(&stored, &self.path_for(project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_memory_store_commit_and_failure() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let mut task = Task::new("A", day(1), day(2));
        store.insert_project(project, vec![task.clone()]);

        task.shift_to(day(5));
        store.commit_task(project, task.clone()).unwrap();
        assert_eq!(store.get_tasks(project).unwrap(), vec![task.clone()]);

        store.set_failing(true);
        assert!(store.commit_tasks(project, vec![task]).is_err());
        assert_eq!(store.commit_calls(), vec![1, 1]);

        assert!(matches!(
            store.get_tasks(Uuid::new_v4()),
            Err(Error::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("projects")).unwrap();

        let mut project = Project::new("Files");
        let a = Task::new("A", day(1), day(3));
        let b = Task::new("B", day(4), day(6)).depending_on(&[a.id]);
        project.tasks = vec![a.clone(), b.clone()];
        store.save(&project).unwrap();

        let mut moved_a = a.clone();
        moved_a.shift_to(day(10));
        let mut moved_b = b.clone();
        moved_b.shift_to(day(14));
        store
            .commit_tasks(project.id, vec![moved_a.clone(), moved_b.clone()])
            .unwrap();

        assert_eq!(store.get_tasks(project.id).unwrap(), vec![moved_a, moved_b]);
        assert!(store.path_for(project.id).exists());
        assert!(matches!(
            store.get_tasks(Uuid::new_v4()),
            Err(Error::ProjectNotFound(_))
        ));
    }
}
