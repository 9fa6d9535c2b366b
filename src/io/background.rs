//! Fire-and-forget commits: batches go to a worker thread so the UI returns
//! to idle without waiting on the store. Failures come back on a channel.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use uuid::Uuid;

use super::store::TaskStore;
use crate::error::{Error, Result};
use crate::model::Task;

enum Job {
    Single(Uuid, Task),
    Bulk(Uuid, Vec<Task>),
}

/// A commit the wrapped store refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFailure {
    pub project: Uuid,
    pub task_ids: Vec<Uuid>,
    pub error: String,
}

pub struct BackgroundStore<S: TaskStore + 'static> {
    inner: Arc<S>,
    jobs: Option<Sender<Job>>,
    failures: Receiver<CommitFailure>,
    worker: Option<JoinHandle<()>>,
}

impl<S: TaskStore + 'static> BackgroundStore<S> {
    pub fn spawn(inner: S) -> Result<Self> {
        let inner = Arc::new(inner);
        let (job_tx, job_rx) = unbounded::<Job>();
        let (fail_tx, fail_rx) = unbounded::<CommitFailure>();

        let store = Arc::clone(&inner);
        let worker = std::thread::Builder::new()
            .name("commit-worker".to_string())
            .spawn(move || {
                for job in job_rx {
                    let (project, task_ids, result) = match job {
                        Job::Single(project, task) => {
                            let ids = vec![task.id];
                            (project, ids, store.commit_task(project, task))
                        }
                        Job::Bulk(project, tasks) => {
                            let ids = tasks.iter().map(|t| t.id).collect();
                            (project, ids, store.commit_tasks(project, tasks))
                        }
                    };
                    if let Err(e) = result {
                        tracing::warn!(%project, "commit failed: {}", e);
                        let _ = fail_tx.send(CommitFailure {
                            project,
                            task_ids,
                            error: e.to_string(),
                        });
                    }
                }
                tracing::debug!("commit worker stopped");
            })?;

        Ok(Self {
            inner,
            jobs: Some(job_tx),
            failures: fail_rx,
            worker: Some(worker),
        })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Failures reported since the last call. Never blocks.
    pub fn drain_failures(&self) -> Vec<CommitFailure> {
        self.failures.try_iter().collect()
    }

    /// Finish every queued job and stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("commit worker panicked");
            }
        }
    }

    fn send(&self, job: Job) -> Result<()> {
        self.jobs
            .as_ref()
            .ok_or(Error::StoreClosed)?
            .send(job)
            .map_err(|_| Error::StoreClosed)
    }
}

impl<S: TaskStore + 'static> TaskStore for BackgroundStore<S> {
    fn get_tasks(&self, project: Uuid) -> Result<Vec<Task>> {
        self.inner.get_tasks(project)
    }

    fn commit_task(&self, project: Uuid, task: Task) -> Result<()> {
        self.send(Job::Single(project, task))
    }

    fn commit_tasks(&self, project: Uuid, tasks: Vec<Task>) -> Result<()> {
        self.send(Job::Bulk(project, tasks))
    }
}

impl<S: TaskStore + 'static> Drop for BackgroundStore<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;
    use chrono::NaiveDate;

    fn task(name: &str) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        Task::new(name, day, day)
    }

    #[test]
    fn test_jobs_reach_inner_store() {
        let project = Uuid::new_v4();
        let a = task("a");
        let b = task("b");
        let memory = MemoryStore::new();
        memory.insert_project(project, vec![a.clone(), b.clone()]);

        let store = BackgroundStore::spawn(memory).unwrap();
        store.commit_task(project, a).unwrap();
        store.commit_tasks(project, vec![b.clone(), b]).unwrap();

        let inner = Arc::clone(&store.inner);
        store.shutdown();
        assert_eq!(inner.commit_calls(), vec![1, 2]);
    }

    #[test]
    fn test_failures_are_reported() {
        let project = Uuid::new_v4();
        let a = task("a");
        let memory = MemoryStore::new();
        memory.insert_project(project, vec![a.clone()]);
        memory.set_failing(true);

        let store = BackgroundStore::spawn(memory).unwrap();
        store.commit_task(project, a.clone()).unwrap();

        // Failures arrive asynchronously; wait for the worker.
        let failure = store
            .failures
            .recv_timeout(std::time::Duration::from_secs(5))
            .unwrap();
        assert_eq!(failure.project, project);
        assert_eq!(failure.task_ids, vec![a.id]);
        assert!(store.drain_failures().is_empty());
    }
}
