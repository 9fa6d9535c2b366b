//! The dependency-aware scheduling core. Everything here is a pure function
//! of the task snapshot handed in, apart from the one active interaction
//! session and the fixed timeline while it runs.

pub mod cascade;
pub mod commit;
pub mod graph;
pub mod hierarchy;
pub mod interaction;
pub mod layout;

pub use cascade::{cascade, earliest_start};
pub use commit::{CommitBatch, Draft};
pub use graph::{DependencyGraph, Direction, LinkOutcome, Step};
pub use hierarchy::{build_hierarchy, HierarchicalTask};
pub use interaction::{Edit, Interaction, InteractionKind, InteractionState, Preview};
pub use layout::{
    ChartLayout, Hit, HitZone, LinkAnchors, Point, RowLayout, TaskPosition, MIN_BAR_WIDTH,
};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::{Role, SchedulerConfig};
use crate::model::{Task, TimelineMapper, TimelineWindow};

pub struct Scheduler {
    config: SchedulerConfig,
    mapper: TimelineMapper,
    interaction: Interaction,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, tasks: &[Task], today: NaiveDate) -> Self {
        let window = TimelineWindow::fit(tasks, config.padding_days, today);
        let mapper = TimelineMapper::new(window, config.day_width);
        Self {
            config,
            mapper,
            interaction: Interaction::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn mapper(&self) -> &TimelineMapper {
        &self.mapper
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.config.role = role;
    }

    pub fn zoom_in(&mut self) {
        if self.interaction.is_idle() {
            self.mapper.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.interaction.is_idle() {
            self.mapper.zoom_out();
        }
    }

    /// Refit the timeline to the tasks. Held fixed while a session is
    /// active so coordinates do not drift under the pointer. Returns whether
    /// the window changed.
    pub fn sync_window(&mut self, tasks: &[Task], today: NaiveDate) -> bool {
        if !self.interaction.is_idle() {
            return false;
        }
        let window = TimelineWindow::fit(tasks, self.config.padding_days, today);
        if window == self.mapper.window {
            return false;
        }
        self.mapper.window = window;
        true
    }

    pub fn layout(&self, tasks: &[Task]) -> ChartLayout {
        ChartLayout::compute(tasks, &self.mapper, self.config.row_height)
    }

    pub fn hit_test(&self, layout: &ChartLayout, pointer: Point) -> Option<Hit> {
        layout.hit_test(pointer, self.config.handle_width)
    }

    /// Start a session for whatever is under `pointer`.
    pub fn press(&mut self, layout: &ChartLayout, pointer: Point) -> bool {
        let Some(hit) = self.hit_test(layout, pointer) else {
            return false;
        };
        let Some(row) = layout.row(hit.task_id) else {
            return false;
        };
        let knob = layout.link_knob(row, self.config.handle_width);
        self.interaction
            .press(hit.zone.into(), row, pointer, knob, self.config.role)
    }

    pub fn drag(&mut self, pointer: Point) -> Option<Preview> {
        self.interaction.drag(pointer, &self.mapper)
    }

    pub fn preview(&self) -> Option<Preview> {
        self.interaction.preview(&self.mapper)
    }

    /// End the session and compute everything it changed.
    pub fn release(
        &mut self,
        tasks: &[Task],
        layout: &ChartLayout,
        pointer: Point,
    ) -> Option<CommitBatch> {
        let target = self.hit_test(layout, pointer).map(|hit| hit.task_id);
        let edit = self.interaction.release(pointer, target, &self.mapper)?;
        self.apply_edit(tasks, edit)
    }

    /// Apply a validated edit to `tasks` and cascade it through the
    /// dependency graph. `None` when nothing changes.
    pub fn apply_edit(&self, tasks: &[Task], edit: Edit) -> Option<CommitBatch> {
        let mut graph = DependencyGraph::from_tasks(tasks);
        let mut draft = Draft::new(tasks);
        let buffer_days = self.config.buffer_days;

        let seed = match edit {
            Edit::Reschedule {
                task_id,
                start,
                end,
            } => {
                let task = draft.get_mut(task_id)?;
                task.start = start;
                task.end = end.max(start);
                task_id
            }
            Edit::Link { from, to } => {
                let outcome = graph.add_dependency(from, to);
                if !outcome.is_added() {
                    tracing::debug!(%from, %to, ?outcome, "link rejected");
                    return None;
                }
                let required = earliest_start(draft.get(from)?.end, buffer_days);
                let task = draft.get_mut(to)?;
                task.dependencies.push(from);
                if task.start < required {
                    task.shift_to(required);
                }
                to
            }
        };

        let shifted = cascade(&mut draft, &graph, &[seed], buffer_days);
        tracing::debug!(task = %seed, cascaded = shifted.len(), "edit applied");
        CommitBatch::from_draft(&draft)
    }

    /// Link two tasks directly (outside a pointer session).
    pub fn link(&self, tasks: &[Task], from: Uuid, to: Uuid) -> Option<CommitBatch> {
        if !self.config.role.can_edit_schedule() {
            return None;
        }
        self.apply_edit(tasks, Edit::Link { from, to })
    }

    /// Remove the edge "`to` depends on `from`". Removing an edge never
    /// requires rescheduling.
    pub fn unlink(&self, tasks: &[Task], from: Uuid, to: Uuid) -> Option<CommitBatch> {
        if !self.config.role.can_edit_schedule() {
            return None;
        }
        let mut graph = DependencyGraph::from_tasks(tasks);
        if !graph.remove_dependency(from, to) {
            tracing::debug!(%from, %to, "unlink ignored: no such dependency");
            return None;
        }
        let mut draft = Draft::new(tasks);
        let task = draft.get_mut(to)?;
        task.dependencies.retain(|&d| d != from);
        CommitBatch::from_draft(&draft)
    }
}
