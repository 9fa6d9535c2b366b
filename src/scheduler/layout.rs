//! Chart geometry: one box per hierarchy row, anchor points per dependency
//! edge, and hit testing. Coordinates are chart-local: x from the window
//! anchor, y from the top of the first row.

use std::collections::HashMap;

use uuid::Uuid;

use super::hierarchy::build_hierarchy;
use crate::model::{Task, TimelineMapper};

/// Narrowest bar drawn and hit-tested, so same-day tasks stay grabbable.
pub const MIN_BAR_WIDTH: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Horizontal placement of a task bar in its row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskPosition {
    pub row_index: usize,
    pub x_start: f32,
    pub width: f32,
}

impl TaskPosition {
    pub fn x_end(&self) -> f32 {
        self.x_start + self.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub task_id: Uuid,
    pub depth: usize,
    pub is_milestone: bool,
    pub position: TaskPosition,
}

impl RowLayout {
    /// Right edge of the bar as drawn. Milestones are a point at their date.
    pub fn bar_end(&self) -> f32 {
        if self.is_milestone {
            self.position.x_end()
        } else {
            self.position.x_start + self.position.width.max(MIN_BAR_WIDTH)
        }
    }
}

/// Pixel endpoints of one dependency arrow: from the predecessor's end to
/// the dependent's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnchors {
    pub from: Uuid,
    pub to: Uuid,
    pub start: Point,
    pub end: Point,
}

/// Part of a bar that a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Body,
    StartHandle,
    EndHandle,
    /// The knob past the bar's end used to draw a dependency.
    LinkKnob,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub task_id: Uuid,
    pub zone: HitZone,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct ChartLayout {
    pub rows: Vec<RowLayout>,
    pub links: Vec<LinkAnchors>,
    pub row_height: f32,
}

impl ChartLayout {
    pub fn compute(tasks: &[Task], mapper: &TimelineMapper, row_height: f32) -> Self {
        let rows: Vec<RowLayout> = build_hierarchy(tasks)
            .into_iter()
            .enumerate()
            .map(|(row_index, row)| {
                let x_start = mapper.date_to_x(row.task.start);
                let x_end = mapper.date_to_x(row.task.end);
                RowLayout {
                    task_id: row.task.id,
                    depth: row.depth,
                    is_milestone: row.task.is_milestone,
                    position: TaskPosition {
                        row_index,
                        x_start,
                        width: x_end - x_start,
                    },
                }
            })
            .collect();

        let by_id: HashMap<Uuid, &RowLayout> = rows.iter().map(|r| (r.task_id, r)).collect();
        let mut links = Vec::new();
        for task in tasks {
            let Some(row) = by_id.get(&task.id) else {
                continue;
            };
            for dep in &task.dependencies {
                let Some(pred) = by_id.get(dep) else {
                    continue;
                };
                links.push(LinkAnchors {
                    from: pred.task_id,
                    to: row.task_id,
                    start: Point::new(
                        pred.bar_end(),
                        row_center(pred.position.row_index, row_height),
                    ),
                    end: Point::new(
                        row.position.x_start,
                        row_center(row.position.row_index, row_height),
                    ),
                });
            }
        }

        Self {
            rows,
            links,
            row_height,
        }
    }

    pub fn row(&self, task_id: Uuid) -> Option<&RowLayout> {
        self.rows.iter().find(|r| r.task_id == task_id)
    }

    pub fn row_center_y(&self, row_index: usize) -> f32 {
        row_center(row_index, self.row_height)
    }

    /// Total height of all rows.
    pub fn height(&self) -> f32 {
        self.rows.len() as f32 * self.row_height
    }

    /// Where the dependency knob sits for a row.
    pub fn link_knob(&self, row: &RowLayout, handle_width: f32) -> Point {
        Point::new(
            row.bar_end() + knob_offset(row, handle_width, self.row_height),
            self.row_center_y(row.position.row_index),
        )
    }

    /// Resolve the element under `point`. Returns `None` over empty space.
    pub fn hit_test(&self, point: Point, handle_width: f32) -> Option<Hit> {
        if point.y < 0.0 || self.row_height <= 0.0 {
            return None;
        }
        let row_index = (point.y / self.row_height) as usize;
        let row = self.rows.get(row_index)?;
        let zone = classify(row, point.x, handle_width, self.row_height)?;
        Some(Hit {
            task_id: row.task_id,
            zone,
        })
    }
}

fn row_center(row_index: usize, row_height: f32) -> f32 {
    row_index as f32 * row_height + row_height / 2.0
}

/// Milestone diamonds are a row tall, so their knob sits further out.
fn knob_offset(row: &RowLayout, handle_width: f32, row_height: f32) -> f32 {
    if row.is_milestone {
        row_height / 2.0 + handle_width
    } else {
        handle_width
    }
}

fn classify(row: &RowLayout, x: f32, handle_width: f32, row_height: f32) -> Option<HitZone> {
    let half = handle_width / 2.0;
    let start = row.position.x_start;
    let end = row.bar_end();

    let knob_x = end + knob_offset(row, handle_width, row_height);
    if (x - knob_x).abs() <= half {
        return Some(HitZone::LinkKnob);
    }
    if row.is_milestone {
        let reach = (row_height / 2.0).max(half);
        return ((x - start).abs() <= reach).then_some(HitZone::Body);
    }
    // Too narrow for two handles: the drawn bar is all body, handles sit
    // just outside it.
    if end - start < handle_width * 2.0 {
        if x >= start && x <= end {
            return Some(HitZone::Body);
        }
        if x >= start - half && x < start {
            return Some(HitZone::StartHandle);
        }
        return (x > end && x <= end + half).then_some(HitZone::EndHandle);
    }
    if (x - start).abs() <= half {
        return Some(HitZone::StartHandle);
    }
    if (x - end).abs() <= half {
        return Some(HitZone::EndHandle);
    }
    (x > start && x < end).then_some(HitZone::Body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimelineWindow;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn mapper() -> TimelineMapper {
        TimelineMapper::new(
            TimelineWindow {
                anchor: d(1),
                total_days: 31,
            },
            10.0,
        )
    }

    #[test]
    fn test_rows_follow_hierarchy_order() {
        let parent = Task::new("parent", d(2), d(10));
        let child = Task::new("child", d(3), d(5)).with_parent(parent.id);
        let tasks = vec![child.clone(), parent.clone()];

        let layout = ChartLayout::compute(&tasks, &mapper(), 30.0);
        assert_eq!(layout.rows[0].task_id, parent.id);
        assert_eq!(layout.rows[1].task_id, child.id);
        assert_eq!(layout.rows[1].depth, 1);
        assert_eq!(
            layout.rows[1].position,
            TaskPosition {
                row_index: 1,
                x_start: 20.0,
                width: 20.0,
            }
        );
        assert_eq!(layout.height(), 60.0);
    }

    #[test]
    fn test_link_anchors_connect_end_to_start() {
        let a = Task::new("a", d(1), d(4));
        let b = Task::new("b", d(6), d(8)).depending_on(&[a.id]);
        let tasks = vec![a.clone(), b.clone()];

        let layout = ChartLayout::compute(&tasks, &mapper(), 20.0);
        assert_eq!(layout.links.len(), 1);
        let link = layout.links[0];
        assert_eq!((link.from, link.to), (a.id, b.id));
        assert_eq!(link.start, Point::new(30.0, 10.0));
        assert_eq!(link.end, Point::new(50.0, 30.0));
    }

    #[test]
    fn test_hit_zones() {
        let a = Task::new("a", d(3), d(8));
        let tasks = vec![a.clone()];
        let layout = ChartLayout::compute(&tasks, &mapper(), 20.0);
        // Bar spans x 20..70 on row 0.
        let hit = |x: f32, y: f32| layout.hit_test(Point::new(x, y), 6.0).map(|h| h.zone);

        assert_eq!(hit(40.0, 10.0), Some(HitZone::Body));
        assert_eq!(hit(21.0, 10.0), Some(HitZone::StartHandle));
        assert_eq!(hit(68.0, 10.0), Some(HitZone::EndHandle));
        assert_eq!(hit(76.0, 10.0), Some(HitZone::LinkKnob));
        assert_eq!(hit(120.0, 10.0), None);
        assert_eq!(hit(40.0, 25.0), None);
        assert_eq!(hit(40.0, -1.0), None);
    }

    #[test]
    fn test_milestone_body_hit() {
        let m = Task::new_milestone("ship", d(5));
        let layout = ChartLayout::compute(&[m.clone()], &mapper(), 20.0);
        let hit = layout.hit_test(Point::new(43.0, 10.0), 6.0).unwrap();
        assert_eq!(hit.task_id, m.id);
        assert_eq!(hit.zone, HitZone::Body);

        let knob = layout.link_knob(&layout.rows[0], 6.0);
        assert_eq!(knob, Point::new(56.0, 10.0));
        let hit = layout.hit_test(knob, 6.0).unwrap();
        assert_eq!(hit.zone, HitZone::LinkKnob);
    }

    #[test]
    fn test_same_day_task_is_grabbable() {
        let a = Task::new("one-day", d(10), d(10));
        let layout = ChartLayout::compute(&[a.clone()], &mapper(), 20.0);
        let row = &layout.rows[0];
        // Drawn as a minimum-width bar from x 90 to 96.
        assert_eq!(row.position.width, 0.0);
        assert_eq!(row.bar_end(), 90.0 + MIN_BAR_WIDTH);
        let hit = |x: f32| layout.hit_test(Point::new(x, 10.0), 6.0).map(|h| h.zone);

        for x in [90.0, 93.0, 96.0] {
            assert_eq!(hit(x), Some(HitZone::Body), "x = {x}");
        }
        assert_eq!(hit(88.0), Some(HitZone::StartHandle));
        assert_eq!(hit(98.0), Some(HitZone::EndHandle));
        assert_eq!(layout.link_knob(row, 6.0), Point::new(102.0, 10.0));
        assert_eq!(hit(102.0), Some(HitZone::LinkKnob));
    }
}
