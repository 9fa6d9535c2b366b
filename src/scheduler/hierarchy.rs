//! Outline ordering: flat task list to depth-annotated pre-order rows.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::Task;

/// A task annotated with its depth in the parent/child forest.
///
/// Borrowed from the snapshot it was built from and rebuilt on every layout
/// pass.
#[derive(Debug, Clone, Copy)]
pub struct HierarchicalTask<'a> {
    pub task: &'a Task,
    pub depth: usize,
}

/// Order tasks for display: pre-order over the parent/child forest, each
/// sibling group sorted by start date (ties keep input order).
///
/// A task whose parent is missing or is itself counts as a root. Tasks only
/// reachable through a parent cycle are emitted afterwards as roots.
pub fn build_hierarchy(tasks: &[Task]) -> Vec<HierarchicalTask<'_>> {
    let ids: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();

    let mut roots: Vec<&Task> = Vec::new();
    let mut children: HashMap<Uuid, Vec<&Task>> = HashMap::new();
    for task in tasks {
        match task.parent_id {
            Some(parent) if parent != task.id && ids.contains(&parent) => {
                children.entry(parent).or_default().push(task);
            }
            _ => roots.push(task),
        }
    }

    // `sort_by_key` is stable, which keeps equal start dates in input order.
    roots.sort_by_key(|t| t.start);
    for group in children.values_mut() {
        group.sort_by_key(|t| t.start);
    }

    let mut out = Vec::with_capacity(tasks.len());
    let mut visited = HashSet::with_capacity(tasks.len());
    for &root in &roots {
        emit(root, 0, &children, &mut visited, &mut out);
    }

    if out.len() < tasks.len() {
        let mut stranded: Vec<&Task> = tasks.iter().filter(|t| !visited.contains(&t.id)).collect();
        stranded.sort_by_key(|t| t.start);
        for task in stranded {
            if !visited.contains(&task.id) {
                emit(task, 0, &children, &mut visited, &mut out);
            }
        }
    }

    out
}

fn emit<'a>(
    task: &'a Task,
    depth: usize,
    children: &HashMap<Uuid, Vec<&'a Task>>,
    visited: &mut HashSet<Uuid>,
    out: &mut Vec<HierarchicalTask<'a>>,
) {
    if !visited.insert(task.id) {
        return;
    }
    out.push(HierarchicalTask { task, depth });
    if let Some(group) = children.get(&task.id) {
        for &child in group {
            emit(child, depth + 1, children, visited, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn names<'a>(rows: &[HierarchicalTask<'a>]) -> Vec<(&'a str, usize)> {
        rows.iter().map(|r| (r.task.name.as_str(), r.depth)).collect()
    }

    #[test]
    fn test_preorder_with_sorted_siblings() {
        let phase2 = Task::new("Phase 2", d(10), d(20));
        let phase1 = Task::new("Phase 1", d(1), d(9));
        let build = Task::new("Build", d(12), d(18)).with_parent(phase2.id);
        let design = Task::new("Design", d(10), d(11)).with_parent(phase2.id);
        let kickoff = Task::new("Kickoff", d(1), d(2)).with_parent(phase1.id);
        let tasks = vec![build, phase2, kickoff, phase1, design];

        let rows = build_hierarchy(&tasks);
        assert_eq!(
            names(&rows),
            vec![
                ("Phase 1", 0),
                ("Kickoff", 1),
                ("Phase 2", 0),
                ("Design", 1),
                ("Build", 1),
            ]
        );
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let tasks = vec![
            Task::new("first", d(3), d(4)),
            Task::new("second", d(3), d(9)),
            Task::new("earlier", d(2), d(2)),
            Task::new("third", d(3), d(5)),
        ];
        let rows = build_hierarchy(&tasks);
        assert_eq!(
            names(&rows),
            vec![("earlier", 0), ("first", 0), ("second", 0), ("third", 0)]
        );
    }

    #[test]
    fn test_missing_and_self_parents_become_roots() {
        let orphan = Task::new("orphan", d(5), d(6)).with_parent(uuid::Uuid::new_v4());
        let mut selfish = Task::new("selfish", d(1), d(2));
        selfish.parent_id = Some(selfish.id);
        let tasks = vec![orphan, selfish];

        let rows = build_hierarchy(&tasks);
        assert_eq!(names(&rows), vec![("selfish", 0), ("orphan", 0)]);
    }

    #[test]
    fn test_parent_cycle_does_not_drop_tasks() {
        let mut a = Task::new("a", d(2), d(3));
        let mut b = Task::new("b", d(1), d(3));
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let c = Task::new("c", d(4), d(4)).with_parent(a.id);
        let tasks = vec![a, b, c];

        let rows = build_hierarchy(&tasks);
        assert_eq!(rows.len(), 3);
        assert_eq!(names(&rows), vec![("b", 0), ("a", 1), ("c", 2)]);
    }

    #[test]
    fn test_parent_always_precedes_child() {
        let root = Task::new("root", d(10), d(20));
        let mid = Task::new("mid", d(1), d(5)).with_parent(root.id);
        let leaf = Task::new("leaf", d(1), d(1)).with_parent(mid.id);
        let tasks = vec![leaf, mid, root];

        let rows = build_hierarchy(&tasks);
        let pos = |name: &str| rows.iter().position(|r| r.task.name == name).unwrap();
        assert!(pos("root") < pos("mid"));
        assert!(pos("mid") < pos("leaf"));
        assert_eq!(rows[pos("leaf")].depth, 2);
    }
}
