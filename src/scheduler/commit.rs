//! Working copy of one interaction's edits and the batch handed to the store.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::Result;
use crate::io::TaskStore;
use crate::model::Task;

/// Copy-on-write overlay on a task snapshot.
#[derive(Debug)]
pub struct Draft<'a> {
    base: &'a [Task],
    index: HashMap<Uuid, usize>,
    edits: HashMap<Uuid, Task>,
}

impl<'a> Draft<'a> {
    pub fn new(base: &'a [Task]) -> Self {
        Self {
            base,
            index: base.iter().enumerate().map(|(i, t)| (t.id, i)).collect(),
            edits: HashMap::new(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.edits
            .get(&id)
            .or_else(|| self.index.get(&id).map(|&i| &self.base[i]))
    }

    /// Mutable access, cloning the snapshot version on first use.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        if !self.edits.contains_key(&id) {
            let original = self.base[*self.index.get(&id)?].clone();
            self.edits.insert(id, original);
        }
        self.edits.get_mut(&id)
    }

    /// Tasks that differ from the snapshot, in snapshot order.
    pub fn changed(&self) -> Vec<&Task> {
        self.base
            .iter()
            .filter_map(|original| {
                self.edits
                    .get(&original.id)
                    .filter(|edited| *edited != original)
            })
            .collect()
    }
}

/// Everything one interaction changed, dispatched as a single store call.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitBatch {
    Single(Task),
    Bulk(Vec<Task>),
}

impl CommitBatch {
    /// `None` when the draft changed nothing.
    pub fn from_draft(draft: &Draft<'_>) -> Option<Self> {
        let mut changed: Vec<Task> = draft.changed().into_iter().cloned().collect();
        match changed.len() {
            0 => None,
            1 => changed.pop().map(CommitBatch::Single),
            _ => Some(CommitBatch::Bulk(changed)),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        match self {
            CommitBatch::Single(task) => std::slice::from_ref(task),
            CommitBatch::Bulk(tasks) => tasks,
        }
    }

    pub fn task_ids(&self) -> Vec<Uuid> {
        self.tasks().iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks().is_empty()
    }

    /// Merge the batch into a local snapshot.
    pub fn apply_to(&self, tasks: &mut [Task]) {
        for changed in self.tasks() {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == changed.id) {
                *task = changed.clone();
            }
        }
    }

    /// Hand the batch to the store in one call.
    pub fn dispatch(self, store: &dyn TaskStore, project: Uuid) -> Result<()> {
        tracing::info!(%project, tasks = self.len(), "committing schedule change");
        match self {
            CommitBatch::Single(task) => store.commit_task(project, task),
            CommitBatch::Bulk(tasks) => store.commit_tasks(project, tasks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn snapshot() -> Vec<Task> {
        vec![
            Task::new("a", d(1), d(3)),
            Task::new("b", d(4), d(6)),
            Task::new("c", d(7), d(9)),
        ]
    }

    #[test]
    fn test_untouched_or_reverted_draft_is_empty() {
        let tasks = snapshot();
        let mut draft = Draft::new(&tasks);
        assert!(CommitBatch::from_draft(&draft).is_none());

        let task = draft.get_mut(tasks[0].id).unwrap();
        task.shift_to(d(2));
        task.shift_to(d(1));
        assert!(CommitBatch::from_draft(&draft).is_none());
    }

    #[test]
    fn test_single_and_bulk() {
        let tasks = snapshot();
        let mut draft = Draft::new(&tasks);
        draft.get_mut(tasks[2].id).unwrap().shift_to(d(10));
        let batch = CommitBatch::from_draft(&draft).unwrap();
        assert!(matches!(batch, CommitBatch::Single(ref t) if t.id == tasks[2].id));

        draft.get_mut(tasks[0].id).unwrap().shift_to(d(2));
        let batch = CommitBatch::from_draft(&draft).unwrap();
        // Snapshot order, not edit order.
        assert_eq!(batch.task_ids(), vec![tasks[0].id, tasks[2].id]);
        assert!(matches!(batch, CommitBatch::Bulk(_)));
    }

    #[test]
    fn test_draft_reads_through_to_snapshot() {
        let tasks = snapshot();
        let mut draft = Draft::new(&tasks);
        draft.get_mut(tasks[1].id).unwrap().shift_to(d(20));
        assert_eq!(draft.get(tasks[1].id).unwrap().start, d(20));
        assert_eq!(draft.get(tasks[0].id).unwrap().start, d(1));
        assert_eq!(tasks[1].start, d(4));
        assert!(draft.get_mut(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_dispatch_uses_one_call() {
        let mut tasks = snapshot();
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        store.insert_project(project, tasks.clone());

        let mut draft = Draft::new(&tasks);
        draft.get_mut(tasks[0].id).unwrap().shift_to(d(2));
        draft.get_mut(tasks[1].id).unwrap().shift_to(d(5));
        let batch = CommitBatch::from_draft(&draft).unwrap();
        drop(draft);

        batch.apply_to(&mut tasks);
        batch.dispatch(&store, project).unwrap();

        assert_eq!(store.commit_calls(), vec![2]);
        assert_eq!(store.get_tasks(project).unwrap(), tasks);
    }
}
