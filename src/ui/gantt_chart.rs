use std::collections::{HashMap, HashSet};

use crate::ui::theme;
use chrono::{Datelike, Duration, NaiveDate};
use egui::{Color32, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use gantt_scheduler::model::{Task, TimelineMapper, TimelineScale};
use gantt_scheduler::scheduler::{
    ChartLayout, CommitBatch, HitZone, InteractionKind, Point, Preview, RowLayout, Scheduler,
    MIN_BAR_WIDTH,
};
use uuid::Uuid;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Default)]
pub struct ChartInteraction {
    /// Everything a finished drag or link changed.
    pub batch: Option<CommitBatch>,
    /// A pointer session ended without changing anything.
    pub rejected: bool,
}

/// Chart-local coordinates: x from the timeline anchor, y from the first row.
struct Canvas {
    origin: Pos2,
}

impl Canvas {
    fn body_top(&self) -> f32 {
        self.origin.y + theme::HEADER_HEIGHT
    }

    fn to_local(&self, pos: Pos2) -> Point {
        Point::new(pos.x - self.origin.x, pos.y - self.body_top())
    }

    fn to_screen(&self, point: Point) -> Pos2 {
        Pos2::new(self.origin.x + point.x, self.body_top() + point.y)
    }
}

/// Render the Gantt chart area and drive the scheduler from pointer input.
pub fn show_gantt_chart(
    tasks: &[Task],
    scheduler: &mut Scheduler,
    scale: TimelineScale,
    selected_task: &mut Option<Uuid>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let layout = scheduler.layout(tasks);
    let by_id: HashMap<Uuid, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let parents: HashSet<Uuid> = tasks.iter().filter_map(|t| t.parent_id).collect();

    let available = ui.available_size();
    let chart_width = scheduler.mapper().total_width().max(available.x);
    let chart_height = theme::HEADER_HEIGHT + layout.height() + 40.0;

    // Handle zoom with scroll wheel
    let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        if scroll_delta.y > 0.0 {
            scheduler.zoom_in();
        } else if scroll_delta.y < 0.0 {
            scheduler.zoom_out();
        }
    }

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(chart_width, chart_height.max(available.y)),
                Sense::click_and_drag(),
            );
            let canvas = Canvas {
                origin: response.rect.min,
            };
            let mapper = *scheduler.mapper();

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_row_backgrounds(&painter, &canvas, &layout, chart_width);
            draw_timeline_header(&painter, &canvas, &mapper, scale, chart_width, chart_height);
            draw_today_line(&painter, &canvas, &mapper, chart_height);

            for link in &layout.links {
                draw_link(
                    &painter,
                    canvas.to_screen(link.start),
                    canvas.to_screen(link.end),
                    Stroke::new(1.2, theme::LINK_COLOR),
                );
            }

            let hovered = response
                .hover_pos()
                .and_then(|pos| scheduler.hit_test(&layout, canvas.to_local(pos)));

            for row in &layout.rows {
                let Some(task) = by_id.get(&row.task_id) else {
                    continue;
                };
                let is_selected = *selected_task == Some(row.task_id);
                if row.is_milestone {
                    draw_milestone(&painter, &canvas, &layout, row, task, is_selected);
                } else {
                    let is_parent = parents.contains(&row.task_id);
                    draw_task_bar(&painter, &canvas, &layout, row, task, is_selected, is_parent);
                }
                let show_knob = is_selected || hovered.is_some_and(|h| h.task_id == row.task_id);
                if show_knob && scheduler.role().can_edit_schedule() {
                    let knob = layout.link_knob(row, scheduler.config().handle_width);
                    painter.circle_stroke(
                        canvas.to_screen(knob),
                        theme::KNOB_RADIUS,
                        Stroke::new(1.5, theme::HANDLE_COLOR),
                    );
                }
            }

            // ── Pointer session ────────────────────────────────────────
            if response.drag_started() {
                let press = ui
                    .input(|i| i.pointer.press_origin())
                    .or_else(|| response.interact_pointer_pos());
                if let Some(pos) = press {
                    let local = canvas.to_local(pos);
                    if let Some(hit) = scheduler.hit_test(&layout, local) {
                        *selected_task = Some(hit.task_id);
                    }
                    scheduler.press(&layout, local);
                }
            }

            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    scheduler.drag(canvas.to_local(pos));
                }
            }

            if response.drag_stopped() {
                let release = response
                    .interact_pointer_pos()
                    .or_else(|| ui.input(|i| i.pointer.latest_pos()))
                    .map(|pos| canvas.to_local(pos))
                    .or_else(|| scheduler.interaction().session().map(|s| s.pointer));
                // Idle here means the drag began on empty space or was refused.
                if let Some(point) = release.filter(|_| !scheduler.interaction().is_idle()) {
                    interaction.batch = scheduler.release(tasks, &layout, point);
                    interaction.rejected = interaction.batch.is_none();
                }
            }

            if let Some(preview) = scheduler.preview() {
                draw_preview(&painter, &canvas, &layout, preview);
            }

            // ── Cursor + tooltip ───────────────────────────────────────
            if let Some(session) = scheduler.interaction().session() {
                let icon = match session.kind {
                    InteractionKind::Move => egui::CursorIcon::Grabbing,
                    InteractionKind::CreateLink => egui::CursorIcon::Crosshair,
                    InteractionKind::ResizeStart | InteractionKind::ResizeEnd => {
                        egui::CursorIcon::ResizeHorizontal
                    }
                };
                ui.ctx().set_cursor_icon(icon);
            } else if let Some(hit) = hovered {
                let icon = match hit.zone {
                    HitZone::Body => egui::CursorIcon::Grab,
                    HitZone::StartHandle | HitZone::EndHandle => egui::CursorIcon::ResizeHorizontal,
                    HitZone::LinkKnob => egui::CursorIcon::Crosshair,
                };
                ui.ctx().set_cursor_icon(icon);

                if let Some(task) = by_id.get(&hit.task_id) {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("task-tip", task.id)),
                        |ui| {
                            ui.strong(&task.name);
                            if task.is_milestone {
                                ui.label(task.start.format("%d/%m/%Y").to_string());
                            } else {
                                ui.label(format!(
                                    "{} → {}",
                                    task.start.format("%d/%m/%Y"),
                                    task.end.format("%d/%m/%Y"),
                                ));
                            }
                            if !task.dependencies.is_empty() {
                                ui.label(format!("Depends on {} task(s)", task.dependencies.len()));
                            }
                            ui.label(format!("Progress: {}%", (task.progress * 100.0) as i32));
                        },
                    );
                }
            }

            // Click selects; a click on empty space clears the selection.
            if response.clicked() {
                *selected_task = response
                    .interact_pointer_pos()
                    .and_then(|pos| scheduler.hit_test(&layout, canvas.to_local(pos)))
                    .map(|hit| hit.task_id);
            }
        });

    interaction
}

fn draw_row_backgrounds(painter: &egui::Painter, canvas: &Canvas, layout: &ChartLayout, width: f32) {
    for i in 0..layout.rows.len() {
        let y = canvas.body_top() + i as f32 * layout.row_height;
        let row_bg = if i % 2 == 0 {
            theme::BG_PANEL
        } else {
            theme::BG_DARK
        };
        painter.rect_filled(
            Rect::from_min_size(
                Pos2::new(canvas.origin.x, y),
                Vec2::new(width, layout.row_height),
            ),
            0.0,
            row_bg,
        );
        painter.line_segment(
            [
                Pos2::new(canvas.origin.x, y + layout.row_height),
                Pos2::new(canvas.origin.x + width, y + layout.row_height),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_timeline_header(
    painter: &egui::Painter,
    canvas: &Canvas,
    mapper: &TimelineMapper,
    scale: TimelineScale,
    width: f32,
    height: f32,
) {
    let origin = canvas.origin;
    let bottom = origin.y + height;

    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, theme::HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, canvas.body_top()),
            Pos2::new(origin.x + width, canvas.body_top()),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let end = mapper.window.end();
    let grid = |x: f32| {
        painter.line_segment(
            [Pos2::new(x, canvas.body_top()), Pos2::new(x, bottom)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    };

    // Weekends are only shaded, never excluded from scheduling.
    if mapper.day_width >= 8.0 {
        let mut date = mapper.window.anchor;
        while date <= end {
            if date.weekday().num_days_from_monday() >= 5 {
                let x = origin.x + mapper.date_to_x(date);
                painter.rect_filled(
                    Rect::from_min_size(
                        Pos2::new(x, canvas.body_top()),
                        Vec2::new(mapper.day_width, height - theme::HEADER_HEIGHT),
                    ),
                    0.0,
                    theme::WEEKEND_SHADE,
                );
            }
            date += Duration::days(1);
        }
    }

    let mut date = mapper.window.anchor;
    match scale {
        TimelineScale::Days => {
            while date <= end {
                let x = origin.x + mapper.date_to_x(date);
                grid(x);
                if mapper.day_width >= 20.0 {
                    let is_weekend = date.weekday().num_days_from_monday() >= 5;
                    let day_color = if is_weekend {
                        theme::TEXT_DIM
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    painter.text(
                        Pos2::new(x + 3.0, origin.y + 28.0),
                        egui::Align2::LEFT_CENTER,
                        date.format("%d").to_string(),
                        theme::font_sub(),
                        day_color,
                    );
                }
                if date.day() == 1 {
                    month_label(painter, x, origin.y + 12.0, date);
                }
                date += Duration::days(1);
            }
        }
        TimelineScale::Weeks => {
            // The anchor is always a Monday.
            while date <= end {
                let x = origin.x + mapper.date_to_x(date);
                grid(x);
                painter.text(
                    Pos2::new(x + 3.0, origin.y + 28.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("W%V").to_string(),
                    theme::font_sub(),
                    theme::TEXT_SECONDARY,
                );
                if date.day() <= 7 {
                    month_label(painter, x, origin.y + 12.0, date);
                }
                date += Duration::days(7);
            }
        }
        TimelineScale::Months => {
            date = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
            while date <= end {
                let x = origin.x + mapper.date_to_x(date).max(0.0);
                grid(x);
                month_label(painter, x + 2.0, origin.y + 18.0, date);
                date = next_month(date);
            }
        }
    }
}

fn month_label(painter: &egui::Painter, x: f32, y: f32, date: NaiveDate) {
    painter.text(
        Pos2::new(x + 3.0, y),
        egui::Align2::LEFT_CENTER,
        date.format("%b %Y").to_string(),
        theme::font_header(),
        theme::TEXT_PRIMARY,
    );
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(date + Duration::days(30))
}

fn draw_today_line(painter: &egui::Painter, canvas: &Canvas, mapper: &TimelineMapper, height: f32) {
    let today = chrono::Local::now().date_naive();
    if !mapper.window.contains(today) {
        return;
    }
    let x = canvas.origin.x + mapper.date_to_x(today);

    painter.line_segment(
        [
            Pos2::new(x, canvas.body_top()),
            Pos2::new(x, canvas.origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, canvas.body_top() - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn bar_bounds(canvas: &Canvas, layout: &ChartLayout, row_index: usize, x_start: f32, width: f32) -> Rect {
    let top = canvas.body_top() + row_index as f32 * layout.row_height + theme::BAR_INSET;
    Rect::from_min_size(
        Pos2::new(canvas.origin.x + x_start, top),
        Vec2::new(width.max(MIN_BAR_WIDTH), layout.row_height - theme::BAR_INSET * 2.0),
    )
}

fn draw_task_bar(
    painter: &egui::Painter,
    canvas: &Canvas,
    layout: &ChartLayout,
    row: &RowLayout,
    task: &Task,
    is_selected: bool,
    is_parent: bool,
) {
    let position = row.position;
    let bar_rect = bar_bounds(canvas, layout, position.row_index, position.x_start, position.width);
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let color = theme::task_color(position.row_index, false);

    // Soft shadow
    painter.rect_filled(
        bar_rect.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar_rect, rounding, color);
    let highlight_rect = Rect::from_min_size(
        bar_rect.min,
        Vec2::new(bar_rect.width(), (bar_rect.height() * 0.45).max(4.0)),
    );
    painter.rect_filled(
        highlight_rect,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if task.progress > 0.0 {
        let progress_width = bar_rect.width() * task.progress.clamp(0.0, 1.0);
        let progress_rect =
            Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, bar_rect.height()));
        painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);
    }

    // Parents get a thin bracket under the bar.
    if is_parent {
        painter.line_segment(
            [
                Pos2::new(bar_rect.left(), bar_rect.bottom() + 1.0),
                Pos2::new(bar_rect.right(), bar_rect.bottom() + 1.0),
            ],
            Stroke::new(1.0, theme::TEXT_DIM),
        );
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
        let handle_h = bar_rect.height() * 0.55;
        let handle_y = bar_rect.center().y - handle_h / 2.0;
        for x in [bar_rect.left() - 1.5, bar_rect.right() - 2.5] {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
                Rounding::same(2.0),
                theme::HANDLE_COLOR,
            );
        }
    }

    // Task name on bar (single line, clipped to bar bounds)
    if bar_rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(task.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let clipped = painter.with_clip_rect(bar_rect);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(
            Pos2::new(bar_rect.left() + 6.0, text_y),
            galley,
            Color32::TRANSPARENT,
        );
    }
}

fn draw_milestone(
    painter: &egui::Painter,
    canvas: &Canvas,
    layout: &ChartLayout,
    row: &RowLayout,
    task: &Task,
    is_selected: bool,
) {
    let center = canvas.to_screen(Point::new(
        row.position.x_start,
        layout.row_center_y(row.position.row_index),
    ));
    let size = (layout.row_height / 2.0 - 3.0).max(6.0);
    let points = vec![
        Pos2::new(center.x, center.y - size),
        Pos2::new(center.x + size, center.y),
        Pos2::new(center.x, center.y + size),
        Pos2::new(center.x - size, center.y),
    ];

    let shadow: Vec<Pos2> = points.iter().map(|p| *p + Vec2::new(1.0, 1.5)).collect();
    painter.add(Shape::convex_polygon(shadow, Color32::from_black_alpha(40), Stroke::NONE));
    painter.add(Shape::convex_polygon(
        points.clone(),
        theme::task_color(row.position.row_index, true),
        Stroke::NONE,
    ));
    if is_selected {
        painter.add(Shape::convex_polygon(
            points,
            Color32::TRANSPARENT,
            Stroke::new(2.0, theme::BORDER_ACCENT),
        ));
    }

    painter.text(
        Pos2::new(center.x + size + 6.0, center.y),
        egui::Align2::LEFT_CENTER,
        &task.name,
        theme::font_bar(),
        theme::TEXT_SECONDARY,
    );
}

/// Elbow connector with an arrow head: out of the predecessor's end, down to
/// the dependent's row, into its start.
fn draw_link(painter: &egui::Painter, from: Pos2, to: Pos2, stroke: Stroke) {
    let elbow = 8.0;
    let out = Pos2::new(from.x + elbow, from.y);
    let into = Pos2::new(to.x - elbow, to.y);
    let points = if into.x >= out.x {
        vec![from, Pos2::new(out.x, from.y), Pos2::new(out.x, to.y), into]
    } else {
        // Dependent starts left of the predecessor's end: route around.
        let mid_y = (from.y + to.y) / 2.0;
        vec![
            from,
            out,
            Pos2::new(out.x, mid_y),
            Pos2::new(into.x, mid_y),
            into,
        ]
    };
    painter.add(Shape::line(points, stroke));
    painter.arrow(into, Vec2::new(elbow, 0.0), stroke);
}

fn draw_preview(painter: &egui::Painter, canvas: &Canvas, layout: &ChartLayout, preview: Preview) {
    match preview {
        Preview::Bar {
            task_id,
            x_start,
            width,
        } => {
            let Some(row) = layout.row(task_id) else {
                return;
            };
            let ghost = bar_bounds(canvas, layout, row.position.row_index, x_start, width);
            painter.rect_filled(ghost, Rounding::same(theme::BAR_ROUNDING), theme::GHOST_FILL);
            painter.rect_stroke(
                ghost,
                Rounding::same(theme::BAR_ROUNDING),
                Stroke::new(1.5, theme::BORDER_ACCENT),
            );
        }
        Preview::Link { start, end, .. } => {
            let stroke = Stroke::new(1.5, theme::LINK_PREVIEW);
            painter.extend(Shape::dashed_line(
                &[canvas.to_screen(start), canvas.to_screen(end)],
                stroke,
                6.0,
                4.0,
            ));
            painter.circle_filled(canvas.to_screen(end), theme::KNOB_RADIUS, theme::LINK_PREVIEW);
        }
    }
}
