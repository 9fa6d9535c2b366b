//! Finish-to-start dependency graph over task ids.
//!
//! Edges are stored in both directions so the same bounded breadth-first
//! walk serves cycle checks (walking upstream through `dependencies`) and
//! cascade propagation (walking downstream to dependents).

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::model::Task;

/// Which way to follow edges during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From a task to the tasks it depends on.
    Upstream,
    /// From a task to the tasks that depend on it.
    Downstream,
}

/// What a [`DependencyGraph::walk`] visitor wants done with a reached task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Queue the task so its own neighbors are visited.
    Expand,
    /// Do not queue the task from this edge.
    Skip,
    /// End the walk.
    Stop,
}

/// Outcome of a request to link two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Added,
    SelfLink,
    /// The edge, or a transitive path covering it, already exists.
    AlreadyLinked,
    WouldCycle,
    UnknownTask,
}

impl LinkOutcome {
    pub fn is_added(self) -> bool {
        self == LinkOutcome::Added
    }
}

/// Adjacency-by-id view of the `dependencies` relation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// task -> tasks it depends on, in the task's own order.
    upstream: HashMap<Uuid, Vec<Uuid>>,
    /// task -> tasks depending on it, in snapshot order.
    downstream: HashMap<Uuid, Vec<Uuid>>,
}

impl DependencyGraph {
    /// Build the graph from a task snapshot. Dependencies naming tasks that
    /// are not in the snapshot are ignored.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph = Self::default();
        for task in tasks {
            graph.upstream.entry(task.id).or_default();
            graph.downstream.entry(task.id).or_default();
        }
        for task in tasks {
            for &dep in &task.dependencies {
                if dep != task.id && graph.contains(dep) {
                    graph.insert_edge(dep, task.id);
                }
            }
        }
        graph
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.upstream.contains_key(&id)
    }

    /// Tasks that `id` depends on.
    pub fn dependencies_of(&self, id: Uuid) -> &[Uuid] {
        self.upstream.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tasks that depend on `id`.
    pub fn dependents_of(&self, id: Uuid) -> &[Uuid] {
        self.downstream.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, from: Uuid, to: Uuid) -> bool {
        self.dependencies_of(to).contains(&from)
    }

    fn neighbors(&self, id: Uuid, direction: Direction) -> &[Uuid] {
        match direction {
            Direction::Upstream => self.dependencies_of(id),
            Direction::Downstream => self.dependents_of(id),
        }
    }

    /// Breadth-first walk from `starts`. `visit(current, next)` is called for
    /// every edge leaving a dequeued task; its [`Step`] decides whether `next`
    /// is queued. Each task is queued at most once, so the walk is bounded by
    /// the task count and terminates even on a graph that already contains
    /// a cycle.
    pub fn walk<F>(&self, starts: impl IntoIterator<Item = Uuid>, direction: Direction, mut visit: F)
    where
        F: FnMut(Uuid, Uuid) -> Step,
    {
        let mut queued: HashSet<Uuid> = HashSet::new();
        let mut queue: VecDeque<Uuid> = VecDeque::new();
        for id in starts {
            if queued.insert(id) {
                queue.push_back(id);
            }
        }

        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current, direction) {
                match visit(current, next) {
                    Step::Stop => return,
                    Step::Skip => {}
                    Step::Expand => {
                        if queued.insert(next) {
                            queue.push_back(next);
                        }
                    }
                }
            }
        }
    }

    /// True if `target` is reachable from `start` following `direction`.
    pub fn reaches(&self, start: Uuid, target: Uuid, direction: Direction) -> bool {
        let mut found = false;
        self.walk([start], direction, |_, next| {
            if next == target {
                found = true;
                Step::Stop
            } else {
                Step::Expand
            }
        });
        found
    }

    /// True if making `to` depend on `from` would close a loop, i.e. `from`
    /// already depends (transitively) on `to`, or the two are the same task.
    pub fn would_create_cycle(&self, from: Uuid, to: Uuid) -> bool {
        from == to || self.reaches(from, to, Direction::Upstream)
    }

    /// True if `to` already depends on `from`, directly or transitively.
    pub fn is_implied(&self, from: Uuid, to: Uuid) -> bool {
        self.reaches(to, from, Direction::Upstream)
    }

    /// Make `to` depend on `from`. The graph is unchanged unless the result
    /// is [`LinkOutcome::Added`].
    pub fn add_dependency(&mut self, from: Uuid, to: Uuid) -> LinkOutcome {
        if from == to {
            return LinkOutcome::SelfLink;
        }
        if !self.contains(from) || !self.contains(to) {
            return LinkOutcome::UnknownTask;
        }
        if self.is_implied(from, to) {
            return LinkOutcome::AlreadyLinked;
        }
        if self.would_create_cycle(from, to) {
            return LinkOutcome::WouldCycle;
        }
        self.insert_edge(from, to);
        LinkOutcome::Added
    }

    /// Drop the edge "`to` depends on `from`". Returns whether it existed.
    pub fn remove_dependency(&mut self, from: Uuid, to: Uuid) -> bool {
        let existed = self.has_edge(from, to);
        if let Some(deps) = self.upstream.get_mut(&to) {
            deps.retain(|&d| d != from);
        }
        if let Some(dependents) = self.downstream.get_mut(&from) {
            dependents.retain(|&d| d != to);
        }
        existed
    }

    fn insert_edge(&mut self, from: Uuid, to: Uuid) {
        let deps = self.upstream.entry(to).or_default();
        if deps.contains(&from) {
            return;
        }
        deps.push(from);
        self.downstream.entry(from).or_default().push(to);
    }
}
