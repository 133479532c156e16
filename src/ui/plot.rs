use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points};
use rusty_charts::chart::{bar_slot, BarGroup, BarSeries, ChartHandle, LineSeries, ScatterPoint};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the current chart, or the reason there is none.
pub fn chart_plot(ui: &mut Ui, state: &AppState) {
    let pipeline = state.session.pipeline();
    if pipeline.table().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload a CSV or Excel file to generate charts  (File → Open…)");
        });
        return;
    }

    let handle = match pipeline.chart() {
        None => {
            ui.label("Select columns to chart them.");
            return;
        }
        Some(Err(warning)) => {
            ui.label(RichText::new(format!("⚠️ {warning}")).color(Color32::YELLOW));
            return;
        }
        Some(Ok(handle)) => handle,
    };

    ui.heading(handle.title());

    let plot = Plot::new("chart_plot")
        .legend(Legend::default())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    match handle {
        ChartHandle::Line { series } => {
            plot.x_axis_label("Row").show(ui, |plot_ui| line_series(plot_ui, series));
        }
        ChartHandle::Bar { series, groups } => {
            plot.x_axis_label("Row")
                .show(ui, |plot_ui| grouped_bars(plot_ui, series, groups));
        }
        ChartHandle::Scatter {
            x_label,
            y_label,
            points,
        } => {
            plot.x_axis_label(x_label.as_str())
                .y_axis_label(y_label.as_str())
                .show(ui, |plot_ui| scatter_points(plot_ui, points));
        }
    }
}

/// Lines joined through markers; each segment is drawn separately so missing
/// values leave a gap.
fn line_series(plot_ui: &mut PlotUi, series: &[LineSeries]) {
    for s in series {
        for segment in &s.segments {
            let line: PlotPoints = segment.iter().copied().collect();
            plot_ui.line(Line::new(line).name(&s.name).color(s.color).width(1.5));

            let markers: PlotPoints = segment.iter().copied().collect();
            plot_ui.points(Points::new(markers).name(&s.name).color(s.color).radius(3.0));
        }
    }
}

fn grouped_bars(plot_ui: &mut PlotUi, series: &[BarSeries], groups: &[BarGroup]) {
    for (index, s) in series.iter().enumerate() {
        let (offset, width) = bar_slot(index, series.len());
        let bars: Vec<Bar> = groups
            .iter()
            .flat_map(|group| {
                group
                    .bars
                    .iter()
                    .filter(|bar| bar.series == index)
                    .map(move |bar| Bar::new(group.category as f64 + offset, bar.value).width(width))
            })
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(s.color));
    }
}

fn scatter_points(plot_ui: &mut PlotUi, points: &[ScatterPoint]) {
    for p in points {
        plot_ui.points(
            Points::new(vec![[p.x, p.y]])
                .color(p.color)
                .radius(p.radius)
                .filled(true),
        );
    }
}
