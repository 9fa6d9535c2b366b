use crate::app::GanttApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use gantt_scheduler::model::TimelineScale;
use gantt_scheduler::Role;

/// Render the top menu bar.
pub fn show_toolbar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Open...").clicked() {
                app.open_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Reload").clicked() {
                app.reload_tasks();
                ui.close_menu();
            }
            if ui.button("  Reset Sample Project").clicked() {
                app.reset_sample();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.scheduler.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.scheduler.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            for (scale, label) in [
                (TimelineScale::Days, "Days"),
                (TimelineScale::Weeks, "Weeks"),
                (TimelineScale::Months, "Months"),
            ] {
                if ui.radio_value(&mut app.scale, scale, label).clicked() {
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Role  ").font(theme::font_menu()), |ui| {
            let current = app.scheduler.role();
            for role in Role::ALL {
                if ui.radio(current == role, role.label()).clicked() {
                    app.set_role(role);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(&app.project.name).size(11.0).weak());
        });
    });
}
