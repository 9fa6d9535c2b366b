//! Push dependents later when an edited task now ends too close to them.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use super::commit::Draft;
use super::graph::{DependencyGraph, Direction, Step};

/// First day a dependent may start: `buffer_days` whole days must stay free
/// after the predecessor's end date.
pub fn earliest_start(predecessor_end: NaiveDate, buffer_days: i64) -> NaiveDate {
    predecessor_end + Duration::days(buffer_days + 1)
}

/// Walk outgoing dependency edges from `seeds` and shift every dependent
/// that starts before [`earliest_start`] of its predecessor, keeping its
/// duration.
///
/// A shifted task is queued at most once (seeds count as queued), so a
/// diamond resolves its join task a single time. Returns the shifted task
/// ids in the order they first moved.
///
/// A task shifted again after it was already expanded is not re-queued: when
/// one branch into a join is longer than another, the join's own dependents
/// keep the requirement from the join's first position.
pub fn cascade(
    draft: &mut Draft<'_>,
    graph: &DependencyGraph,
    seeds: &[Uuid],
    buffer_days: i64,
) -> Vec<Uuid> {
    let mut changed: Vec<Uuid> = Vec::new();

    graph.walk(seeds.iter().copied(), Direction::Downstream, |predecessor, next| {
        let Some(required) = draft.get(predecessor).map(|p| earliest_start(p.end, buffer_days)) else {
            return Step::Skip;
        };
        let Some(task) = draft.get_mut(next) else {
            return Step::Skip;
        };
        if task.start >= required {
            return Step::Skip;
        }

        tracing::debug!(task = %next, from = %task.start, to = %required, "cascading shift");
        task.shift_to(required);
        if !changed.contains(&next) {
            changed.push(next);
        }
        Step::Expand
    });

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_example_two_tasks() {
        let a = Task::new("A", d(1), d(5));
        let b = Task::new("B", d(3), d(7)).depending_on(&[a.id]);
        let tasks = vec![a.clone(), b.clone()];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        draft.get_mut(a.id).unwrap().shift_to(d(10));
        let changed = cascade(&mut draft, &graph, &[a.id], 1);

        assert_eq!(changed, vec![b.id]);
        let b = draft.get(b.id).unwrap();
        assert_eq!((b.start, b.end), (d(16), d(20)));
    }

    #[test]
    fn test_chain_shifts_every_descendant() {
        let a = Task::new("A", d(1), d(2));
        let b = Task::new("B", d(3), d(4)).depending_on(&[a.id]);
        let c = Task::new("C", d(5), d(6)).depending_on(&[b.id]);
        let e = Task::new("D", d(7), d(8)).depending_on(&[c.id]);
        let tasks = vec![a.clone(), b.clone(), c.clone(), e.clone()];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        draft.get_mut(a.id).unwrap().shift_to(d(5));
        let changed = cascade(&mut draft, &graph, &[a.id], 1);

        assert_eq!(changed, vec![b.id, c.id, e.id]);
        for pair in [(a.id, b.id), (b.id, c.id), (c.id, e.id)] {
            let pred = draft.get(pair.0).unwrap();
            let next = draft.get(pair.1).unwrap();
            assert!(next.start > pred.end + Duration::days(1));
            assert_eq!(next.duration().num_days(), 1);
        }
    }

    #[test]
    fn test_slack_stops_propagation() {
        let a = Task::new("A", d(1), d(2));
        let b = Task::new("B", d(20), d(21)).depending_on(&[a.id]);
        let c = Task::new("C", d(3), d(4)).depending_on(&[b.id]);
        let tasks = vec![a.clone(), b, c];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        draft.get_mut(a.id).unwrap().shift_to(d(5));
        assert!(cascade(&mut draft, &graph, &[a.id], 1).is_empty());
    }

    #[test]
    fn test_diamond_join_resolved_once() {
        let a = Task::new("A", d(1), d(2));
        let b = Task::new("B", d(3), d(6)).depending_on(&[a.id]);
        let c = Task::new("C", d(3), d(4)).depending_on(&[a.id]);
        let join = Task::new("D", d(7), d(8)).depending_on(&[b.id, c.id]);
        let after = Task::new("E", d(9), d(9)).depending_on(&[join.id]);
        let tasks = vec![a.clone(), b.clone(), c.clone(), join.clone(), after.clone()];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        draft.get_mut(a.id).unwrap().shift_to(d(10));
        let changed = cascade(&mut draft, &graph, &[a.id], 1);

        assert_eq!(changed.iter().filter(|&&id| id == join.id).count(), 1);
        assert_eq!(changed.len(), 4);
        // B is the longer branch (13..16), so D must start on the 18th.
        let join = draft.get(join.id).unwrap();
        assert_eq!(join.start, d(18));
        assert_eq!(draft.get(after.id).unwrap().start, d(21));
    }

    #[test]
    fn test_join_shifted_late_is_not_requeued() {
        // A -> B -> X -> Y -> D and A -> C -> D, then D -> E.
        let a = Task::new("A", d(1), d(1));
        let b = Task::new("B", d(3), d(3)).depending_on(&[a.id]);
        let x = Task::new("X", d(5), d(5)).depending_on(&[b.id]);
        let y = Task::new("Y", d(7), d(7)).depending_on(&[x.id]);
        let c = Task::new("C", d(3), d(6)).depending_on(&[a.id]);
        let join = Task::new("D", d(9), d(9)).depending_on(&[y.id, c.id]);
        let e = Task::new("E", d(11), d(11)).depending_on(&[join.id]);
        let tasks = vec![a.clone(), b, x, y, c, join.clone(), e.clone()];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        draft.get_mut(a.id).unwrap().shift_to(d(5));
        let changed = cascade(&mut draft, &graph, &[a.id], 1);

        assert_eq!(changed.iter().filter(|&&id| id == join.id).count(), 1);
        // C puts D on the 12th and E follows on the 14th; Y later pushes D to
        // the 13th, but D was already expanded.
        assert_eq!(draft.get(join.id).unwrap().start, d(13));
        assert_eq!(draft.get(e.id).unwrap().start, d(14));
    }

    #[test]
    fn test_zero_buffer() {
        let a = Task::new("A", d(1), d(5));
        let b = Task::new("B", d(3), d(7)).depending_on(&[a.id]);
        let tasks = vec![a.clone(), b.clone()];
        let graph = DependencyGraph::from_tasks(&tasks);

        let mut draft = Draft::new(&tasks);
        assert_eq!(cascade(&mut draft, &graph, &[a.id], 0), vec![b.id]);
        // Day after A's end date.
        assert_eq!(draft.get(b.id).unwrap().start, d(6));
    }
}
