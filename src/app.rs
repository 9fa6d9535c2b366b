use chrono::{Duration, NaiveDate};
use directories::ProjectDirs;
use std::path::PathBuf;
use uuid::Uuid;

use gantt_scheduler::io::{BackgroundStore, JsonFileStore, TaskStore};
use gantt_scheduler::model::{Project, Task, TimelineScale};
use gantt_scheduler::scheduler::CommitBatch;
use gantt_scheduler::{Role, Scheduler, SchedulerConfig};

use crate::ui;

/// The project every fresh install opens with.
const SAMPLE_PROJECT_ID: Uuid = Uuid::from_u128(0x6a1e_5c4e_d01e_4b7a_9a3c_51d2_e0f4_0001);

/// Main application state.
pub struct GanttApp {
    pub project: Project,
    pub store: Option<BackgroundStore<JsonFileStore>>,
    pub scheduler: Scheduler,
    pub selected_task: Option<Uuid>,
    pub scale: TimelineScale,
    pub show_about: bool,
    pub status_message: String,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn store_dir() -> PathBuf {
    ProjectDirs::from("com", "hjertis", "gantt-scheduler")
        .map(|dirs| dirs.data_dir().join("projects"))
        .unwrap_or_else(|| std::env::temp_dir().join("gantt-scheduler"))
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        ui::theme::apply_theme(&cc.egui_ctx);

        let mut status_message = "Ready".to_string();
        let config = SchedulerConfig::load().unwrap_or_else(|e| {
            tracing::warn!("using default settings: {}", e);
            status_message = format!("Settings ignored: {}", e);
            SchedulerConfig::default()
        });

        let files = match JsonFileStore::new(store_dir()) {
            Ok(files) => Some(files),
            Err(e) => {
                tracing::error!("project store unavailable: {}", e);
                status_message = format!("Changes will not be saved: {}", e);
                None
            }
        };

        let project = files
            .as_ref()
            .and_then(|files| match files.load(SAMPLE_PROJECT_ID) {
                Ok(project) => Some(project),
                Err(e) => {
                    tracing::info!("creating sample project: {}", e);
                    None
                }
            })
            .unwrap_or_else(|| {
                let project = Self::sample_project();
                if let Some(files) = &files {
                    if let Err(e) = files.save(&project) {
                        tracing::warn!("could not store sample project: {}", e);
                    }
                }
                project
            });

        let store = files.and_then(|files| match BackgroundStore::spawn(files) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!("commit worker failed to start: {}", e);
                None
            }
        });

        let scheduler = Scheduler::new(config, &project.tasks, today());
        tracing::info!(project = %project.id, tasks = project.tasks.len(), "project opened");

        Self {
            project,
            store,
            scheduler,
            selected_task: None,
            scale: TimelineScale::Days,
            show_about: false,
            status_message,
        }
    }

    fn sample_project() -> Project {
        let today = today();
        let mut project = Project::new("Sample Project");
        project.id = SAMPLE_PROJECT_ID;

        // ── Phase 1: Planning ───────────────────────────────────────
        let phase1 = Task::new("Planning", today - Duration::days(5), today + Duration::days(8));

        let mut t1 = Task::new(
            "Project Kickoff",
            today - Duration::days(5),
            today - Duration::days(3),
        )
        .with_parent(phase1.id);
        t1.progress = 1.0;

        let mut t2 = Task::new(
            "Requirements Gathering",
            today - Duration::days(1),
            today + Duration::days(5),
        )
        .with_parent(phase1.id)
        .depending_on(&[t1.id]);
        t2.progress = 0.6;

        let m1 = Task::new_milestone("Planning Complete", today + Duration::days(8))
            .with_parent(phase1.id)
            .depending_on(&[t2.id]);

        // ── Phase 2: Execution ──────────────────────────────────────
        let phase2 = Task::new("Execution", today + Duration::days(10), today + Duration::days(40));

        let t3 = Task::new(
            "UI Design",
            today + Duration::days(10),
            today + Duration::days(18),
        )
        .with_parent(phase2.id)
        .depending_on(&[m1.id]);

        let t4 = Task::new(
            "Backend Development",
            today + Duration::days(10),
            today + Duration::days(28),
        )
        .with_parent(phase2.id)
        .depending_on(&[m1.id]);

        let t5 = Task::new(
            "Testing & QA",
            today + Duration::days(30),
            today + Duration::days(38),
        )
        .with_parent(phase2.id)
        .depending_on(&[t3.id, t4.id]);

        let m2 = Task::new_milestone("Launch", today + Duration::days(40)).depending_on(&[t5.id]);

        project.tasks = vec![phase1, t1, t2, m1, phase2, t3, t4, t5, m2];
        project
    }

    // --- File operations ---

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Gantt Project", &["gantt.json", "json"])
            .pick_file()
        {
            match gantt_scheduler::io::load_project(&path) {
                Ok(project) => {
                    if let Some(store) = &self.store {
                        if let Err(e) = store.inner().save(&project) {
                            self.status_message = format!("Opened read-only: {}", e);
                        }
                    }
                    self.replace_project(project);
                    self.status_message = "Project loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Gantt Project", &["gantt.json", "json"])
            .set_file_name(format!("{}.gantt.json", self.project.name))
            .save_file()
        {
            match gantt_scheduler::io::save_project(&self.project, &path) {
                Ok(()) => self.status_message = "Project saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        }
    }

    /// Replace the local snapshot with the store's copy.
    pub fn reload_tasks(&mut self) {
        let Some(store) = &self.store else {
            self.status_message = "No project store".to_string();
            return;
        };
        match store.get_tasks(self.project.id) {
            Ok(tasks) => {
                self.project.tasks = tasks;
                self.status_message = "Reloaded from store".to_string();
            }
            Err(e) => self.status_message = format!("Reload failed: {}", e),
        }
    }

    pub fn reset_sample(&mut self) {
        let project = Self::sample_project();
        if let Some(store) = &self.store {
            if let Err(e) = store.inner().save(&project) {
                tracing::warn!("could not store sample project: {}", e);
            }
        }
        self.replace_project(project);
        self.status_message = "Sample project restored".to_string();
    }

    pub fn set_role(&mut self, role: Role) {
        self.scheduler.set_role(role);
        self.status_message = format!("Role: {}", role.label());
    }

    pub fn unlink(&mut self, from: Uuid, to: Uuid) {
        match self.scheduler.unlink(&self.project.tasks, from, to) {
            Some(batch) => self.commit(batch),
            None => self.status_message = "Dependency not removed".to_string(),
        }
    }

    fn replace_project(&mut self, project: Project) {
        self.project = project;
        self.selected_task = None;
        self.scheduler.sync_window(&self.project.tasks, today());
    }

    /// Apply a finished interaction locally, then hand it to the store
    /// without waiting for the write.
    fn commit(&mut self, batch: CommitBatch) {
        batch.apply_to(&mut self.project.tasks);
        self.project.touch();

        self.status_message = match &batch {
            CommitBatch::Single(task) => format!(
                "Updated '{}' ({} → {})",
                task.name,
                task.start.format("%Y-%m-%d"),
                task.end.format("%Y-%m-%d")
            ),
            CommitBatch::Bulk(tasks) => format!("Rescheduled {} tasks", tasks.len()),
        };

        match &self.store {
            Some(store) => {
                if let Err(e) = batch.dispatch(store, self.project.id) {
                    self.status_message = format!("Could not save: {}", e);
                }
            }
            None => self.status_message.push_str(" (not saved)"),
        }
    }

    /// Surface commits the worker could not persist and fall back to the
    /// store's copy.
    fn handle_commit_failures(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let failures = store.drain_failures();
        let Some(last) = failures.last() else {
            return;
        };
        self.status_message = format!("Save failed: {}", last.error);
        if let Ok(tasks) = store.get_tasks(self.project.id) {
            self.project.tasks = tasks;
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_commit_failures();
        self.scheduler.sync_window(&self.project.tasks, today());

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let default_width = SchedulerConfig::default().day_width;
                        let info = format!(
                            "Tasks: {} · Zoom: {:.0}% · {}",
                            self.project.tasks.len(),
                            self.scheduler.mapper().day_width / default_width * 100.0,
                            self.scheduler.role().label(),
                        );
                        ui.label(egui::RichText::new(info).size(10.5).color(ui::theme::TEXT_DIM));
                    });
                });
            });

        // Left panel: task outline
        let mut table_action = ui::task_table::TaskTableAction::None;
        egui::SidePanel::left("task_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                table_action = ui::task_table::show_task_table(
                    &self.project.tasks,
                    self.selected_task,
                    self.scheduler.role().can_edit_schedule(),
                    ui,
                );
            });
        match table_action {
            ui::task_table::TaskTableAction::Select(id) => self.selected_task = Some(id),
            ui::task_table::TaskTableAction::Unlink { from, to } => self.unlink(from, to),
            ui::task_table::TaskTableAction::None => {}
        }

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let mut outcome = None;
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            outcome = Some(ui::gantt_chart::show_gantt_chart(
                &self.project.tasks,
                &mut self.scheduler,
                self.scale,
                &mut self.selected_task,
                ui,
            ));
        });

        if let Some(outcome) = outcome {
            if let Some(batch) = outcome.batch {
                self.commit(batch);
            } else if outcome.rejected {
                self.status_message = "No change".to_string();
            }
        }

        ui::dialogs::show_about_dialog(self, ctx);
    }
}
