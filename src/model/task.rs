use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task or milestone in the Gantt chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Progress from 0.0 (not started) to 1.0 (complete).
    #[serde(default)]
    pub progress: f32,
    /// Parent task for the outline hierarchy.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Tasks that must finish before this one starts (finish-to-start).
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
    /// If true, this is a milestone (rendered as a diamond, zero-duration).
    #[serde(default)]
    pub is_milestone: bool,
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start,
            end: end.max(start),
            progress: 0.0,
            parent_id: None,
            dependencies: Vec::new(),
            is_milestone: false,
        }
    }

    /// Create a new milestone.
    pub fn new_milestone(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            is_milestone: true,
            ..Self::new(name, date, date)
        }
    }

    /// Builder-style parent assignment.
    pub fn with_parent(mut self, parent: Uuid) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Builder-style dependency assignment.
    pub fn depending_on(mut self, predecessors: &[Uuid]) -> Self {
        self.dependencies.extend_from_slice(predecessors);
        self
    }

    /// Number of days between start and end.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Move the task so it begins on `start`, keeping its duration.
    pub fn shift_to(&mut self, start: NaiveDate) {
        let duration = self.duration();
        self.start = start;
        self.end = start + duration;
    }
}
