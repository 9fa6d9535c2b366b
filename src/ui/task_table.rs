use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use gantt_scheduler::model::Task;
use gantt_scheduler::scheduler::build_hierarchy;
use uuid::Uuid;

const INDENT: f32 = 12.0;

/// Actions that the task table can request.
pub enum TaskTableAction {
    None,
    Select(Uuid),
    /// Drop the dependency of `to` on `from`.
    Unlink { from: Uuid, to: Uuid },
}

/// Render the outline of tasks in the side panel. The selected task lists
/// its predecessors, each removable when `can_edit` is set.
pub fn show_task_table(
    tasks: &[Task],
    selected_task: Option<Uuid>,
    can_edit: bool,
    ui: &mut Ui,
) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Tasks")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("({})", tasks.len()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(6.0);
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, entry) in build_hierarchy(tasks).into_iter().enumerate() {
                let task = entry.task;
                let is_selected = selected_task == Some(task.id);
                let color = theme::task_color(i, task.is_milestone);

                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    ..Default::default()
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        ui.add_space(entry.depth as f32 * INDENT);

                        let (dot_rect, _) =
                            ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot_rect.center(), 3.0, color);

                        let name = if task.is_milestone {
                            format!("◆ {}", task.name)
                        } else {
                            task.name.clone()
                        };
                        let name_text = RichText::new(name).size(12.0).color(if is_selected {
                            Color32::WHITE
                        } else {
                            theme::TEXT_PRIMARY
                        });
                        ui.add(egui::Label::new(name_text).truncate());

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            ui.add(
                                egui::ProgressBar::new(task.progress)
                                    .desired_width(40.0)
                                    .fill(color)
                                    .rounding(egui::Rounding::same(3.0)),
                            );
                            let dates = if task.is_milestone {
                                task.start.format("%m/%d").to_string()
                            } else {
                                format!("{} → {}", task.start.format("%m/%d"), task.end.format("%m/%d"))
                            };
                            ui.label(RichText::new(dates).size(10.0).color(theme::TEXT_SECONDARY));
                        });
                    });
                });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("task-row", task.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = TaskTableAction::Select(task.id);
                }

                if is_selected && !task.dependencies.is_empty() {
                    if let Some(unlink) = show_predecessors(tasks, task, entry.depth, can_edit, ui) {
                        action = unlink;
                    }
                }
                ui.add_space(1.0);
            }
        });

    action
}

fn show_predecessors(
    tasks: &[Task],
    task: &Task,
    depth: usize,
    can_edit: bool,
    ui: &mut Ui,
) -> Option<TaskTableAction> {
    let mut action = None;
    for &from in &task.dependencies {
        let name = tasks
            .iter()
            .find(|t| t.id == from)
            .map_or("(missing task)", |t| t.name.as_str());
        ui.horizontal(|ui| {
            ui.add_space((depth + 1) as f32 * INDENT + 12.0);
            ui.label(
                RichText::new(format!("after {name}"))
                    .size(10.5)
                    .color(theme::TEXT_SECONDARY),
            );
            if can_edit {
                let del_btn = ui.add(
                    egui::Button::new(RichText::new("✕").size(10.0).color(theme::TEXT_DIM))
                        .frame(false),
                );
                if del_btn.on_hover_text("Remove dependency").clicked() {
                    action = Some(TaskTableAction::Unlink { from, to: task.id });
                }
            }
        });
    }
    action
}
