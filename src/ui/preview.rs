use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// First rows of the upload, above the chart.
pub fn data_preview(ui: &mut Ui, state: &AppState) {
    let pipeline = state.session.pipeline();
    let Some(preview) = pipeline.preview(state.session.settings.preview_rows) else {
        return;
    };
    let total = pipeline.uploaded().map_or(0, |t| t.len());

    ui.heading("📄 Data Preview");
    ui.label(format!("Showing {} of {total} rows", preview.len()));

    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), preview.width())
                .header(20.0, |mut header| {
                    for name in preview.column_names() {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for index in 0..preview.len() {
                        body.row(18.0, |mut row| {
                            for cell in preview.row(index) {
                                row.col(|ui| {
                                    ui.label(cell.to_string());
                                });
                            }
                        });
                    }
                });
        });

    ui.separator();
}
