use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{self, RichText, ScrollArea, Ui};
use rusty_charts::chart::ChartKind;
use rusty_charts::export::{ExportArtifact, ExportFormat};
use rusty_charts::session::Action;

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – cleaning, column selection, chart type, conversion
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let mut actions: Vec<Action> = Vec::new();

    let pipeline = state.session.pipeline();
    let Some(table) = pipeline.table() else {
        ui.heading("Controls");
        ui.separator();
        ui.label("📌 Please upload a file to get started.");
        return;
    };
    let artifact = pipeline.artifact().cloned();
    let mut save_requested = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Cleaning ----
            ui.heading("🛠 Data Cleaning Options");
            let current = pipeline.cleaning();
            let mut cleaning = current;
            ui.checkbox(&mut cleaning.deduplicate, "Remove Duplicates");
            ui.checkbox(&mut cleaning.drop_missing, "Remove Missing Values");
            if cleaning != current {
                actions.push(Action::SetCleaning(cleaning));
            }
            ui.separator();

            // ---- Column selection ----
            ui.heading("📊 Select Columns for Visualization");
            let selected = pipeline.selection();
            let mut names: Vec<String> = selected.names().to_vec();
            let mut changed = false;
            for name in table.column_names() {
                let mut checked = selected.contains(name);
                if ui.checkbox(&mut checked, name).changed() {
                    changed = true;
                    if checked {
                        names.push(name.to_string());
                    } else {
                        names.retain(|n| n != name);
                    }
                }
            }
            if changed {
                actions.push(Action::SelectColumns(names));
            }

            // ---- Chart type (only once something is selected) ----
            if !selected.is_empty() {
                ui.separator();
                ui.strong("Choose Chart Type");
                let current_kind = pipeline.chart_kind();
                egui::ComboBox::from_id_salt("chart_kind")
                    .selected_text(current_kind.label())
                    .show_ui(ui, |ui: &mut Ui| {
                        for kind in ChartKind::ALL {
                            if ui
                                .selectable_label(current_kind == kind, kind.label())
                                .clicked()
                                && kind != current_kind
                            {
                                actions.push(Action::SetChartKind(kind));
                            }
                        }
                    });
            }
            ui.separator();

            // ---- Conversion ----
            ui.heading("🔄 Convert File");
            let current_format = pipeline.export_format();
            egui::ComboBox::from_id_salt("export_format")
                .selected_text(current_format.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for format in ExportFormat::ALL {
                        if ui
                            .selectable_label(current_format == format, format.label())
                            .clicked()
                            && format != current_format
                        {
                            actions.push(Action::SetExportFormat(format));
                        }
                    }
                });
            if ui.button("Convert & Download").clicked() {
                actions.push(Action::Export);
            }
            // Read from the pipeline, so the button goes away as soon as the
            // artifact is invalidated.
            if let Some(artifact) = &artifact {
                if ui.button(format!("📥 Download {}", artifact.file_name)).clicked() {
                    save_requested = true;
                }
            }
        });

    if let Some(artifact) = artifact.filter(|_| save_requested) {
        match save_artifact(&artifact) {
            Ok(Some(path)) => {
                log::info!("Saved {} to {}", artifact.file_name, path.display());
                state.status = Some(Status::Success(format!("Saved {}", path.display())));
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to save: {e:#}");
                state.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    state.dispatch_all(actions);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    let mut actions: Vec<Action> = Vec::new();

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                if let Some(action) = open_file_dialog(state) {
                    actions.push(action);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        let pipeline = state.session.pipeline();
        if let (Some(name), Some(table)) = (pipeline.file_name(), pipeline.table()) {
            ui.label(format!(
                "{name}: {} rows, {} columns ({})",
                table.len(),
                table.width(),
                pipeline.stage()
            ));
            ui.separator();
        }

        if ui
            .button(format!("⭐ {} points", state.session.points()))
            .on_hover_text("Earn a point")
            .clicked()
        {
            actions.push(Action::EarnPoint);
        }

        if let Some(status) = &state.status {
            ui.separator();
            ui.label(RichText::new(status.text()).color(status.color()));
        }
    });

    state.dispatch_all(actions);
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Ask for a file and turn it into an upload action.
pub fn open_file_dialog(state: &mut AppState) -> Option<Action> {
    let path = rfd::FileDialog::new()
        .set_title("Upload your CSV or Excel file")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "xlsb", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls", "xlsb"])
        .pick_file()?;

    match read_upload(&path) {
        Ok(action) => Some(action),
        Err(e) => {
            log::error!("Failed to open file: {e:#}");
            state.status = Some(Status::Error(format!("Error reading file: {e:#}")));
            None
        }
    }
}

fn read_upload(path: &std::path::Path) -> Result<Action> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?
        .to_string();
    Ok(Action::Upload { file_name, bytes })
}

/// Ask where to save `artifact` and write it. `None` if the user cancelled.
fn save_artifact(artifact: &ExportArtifact) -> Result<Option<PathBuf>> {
    let extension = std::path::Path::new(&artifact.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&artifact.file_name)
        .add_filter(artifact.mime, &[extension])
        .save_file()
    else {
        return Ok(None);
    };
    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}
