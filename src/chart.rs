//! Chart composition: turns a [`NumericView`] into a renderable
//! [`ChartHandle`]. Composition depends only on the view's column order, so
//! the same view always yields the same chart.

use std::fmt;

use eframe::egui::Color32;
use thiserror::Error;

use crate::color::{generate_palette, ColorScale};
use crate::data::view::NumericView;

/// Fraction of one category slot covered by a group of bars.
pub const BAR_GROUP_WIDTH: f64 = 0.8;

pub const MAX_MARKER_RADIUS: f32 = 10.0;
pub const MIN_MARKER_RADIUS: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Scatter];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line Chart",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Scatter => "Scatter Plot",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub kind: ChartKind,
    pub source: &'a NumericView,
}

/// A chart precondition that does not hold. Reported to the user; nothing is
/// drawn.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartWarning {
    #[error("no numeric columns: the selected columns do not contain numeric data")]
    NoNumericColumns,
    #[error("need ≥2 numeric columns: select at least 2 numeric columns for a scatter plot")]
    NeedTwoNumericColumns,
    #[error("size column '{0}' has negative values")]
    NegativeSize(String),
}

// ---------------------------------------------------------------------------
// ChartHandle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub color: Color32,
    /// Runs of consecutive non-missing points as `[row label, value]`.
    /// A missing value ends a run.
    pub segments: Vec<Vec<[f64; 2]>>,
}

impl LineSeries {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub color: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedBar {
    /// Index into the chart's series.
    pub series: usize,
    pub value: f64,
}

/// The bars drawn for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    /// Row label the group sits at.
    pub category: usize,
    pub bars: Vec<GroupedBar>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Color32,
    pub radius: f32,
}

/// Renderable chart returned to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartHandle {
    Line {
        series: Vec<LineSeries>,
    },
    Bar {
        series: Vec<BarSeries>,
        groups: Vec<BarGroup>,
    },
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<ScatterPoint>,
    },
}

impl ChartHandle {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartHandle::Line { .. } => ChartKind::Line,
            ChartHandle::Bar { .. } => ChartKind::Bar,
            ChartHandle::Scatter { .. } => ChartKind::Scatter,
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind().label()
    }
}

/// Horizontal offset from the category centre and width of bar `index` in a
/// group of `count` bars.
pub fn bar_slot(index: usize, count: usize) -> (f64, f64) {
    let count = count.max(1);
    let width = BAR_GROUP_WIDTH / count as f64;
    let offset = (index as f64 - (count as f64 - 1.0) / 2.0) * width;
    (offset, width)
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

pub fn chart(request: &ChartRequest<'_>) -> Result<ChartHandle, ChartWarning> {
    let view = request.source;
    let result = match request.kind {
        ChartKind::Line => line_chart(view),
        ChartKind::Bar => bar_chart(view),
        ChartKind::Scatter => scatter_chart(view),
    };
    if let Err(warning) = &result {
        log::warn!("{} not drawn: {warning}", request.kind);
    }
    result
}

fn line_chart(view: &NumericView) -> Result<ChartHandle, ChartWarning> {
    if view.is_empty() {
        return Err(ChartWarning::NoNumericColumns);
    }
    let palette = generate_palette(view.width());
    let series = view
        .columns()
        .iter()
        .zip(palette)
        .map(|(col, color)| {
            let mut segments: Vec<Vec<[f64; 2]>> = Vec::new();
            let mut current: Vec<[f64; 2]> = Vec::new();
            for (label, value) in view.labels().iter().zip(&col.values) {
                match value {
                    Some(v) => current.push([*label as f64, *v]),
                    None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                segments.push(current);
            }
            LineSeries {
                name: col.name.clone(),
                color,
                segments,
            }
        })
        .collect();
    Ok(ChartHandle::Line { series })
}

fn bar_chart(view: &NumericView) -> Result<ChartHandle, ChartWarning> {
    if view.is_empty() {
        return Err(ChartWarning::NoNumericColumns);
    }
    let series = view
        .columns()
        .iter()
        .zip(generate_palette(view.width()))
        .map(|(col, color)| BarSeries {
            name: col.name.clone(),
            color,
        })
        .collect();
    let groups = view
        .labels()
        .iter()
        .enumerate()
        .map(|(row, &label)| BarGroup {
            category: label,
            bars: view
                .columns()
                .iter()
                .enumerate()
                .filter_map(|(series, col)| {
                    let value = col.values.get(row).copied().flatten()?;
                    Some(GroupedBar { series, value })
                })
                .collect(),
        })
        .collect();
    Ok(ChartHandle::Bar { series, groups })
}

/// Column 0 is X and colour, column 1 is Y and marker size.
fn scatter_chart(view: &NumericView) -> Result<ChartHandle, ChartWarning> {
    let [x_col, y_col, ..] = view.columns() else {
        return Err(ChartWarning::NeedTwoNumericColumns);
    };

    let pairs: Vec<(f64, f64)> = x_col
        .values
        .iter()
        .zip(&y_col.values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.iter().any(|&(_, y)| y < 0.0) {
        return Err(ChartWarning::NegativeSize(y_col.name.clone()));
    }

    let max_size = pairs.iter().map(|&(_, y)| y).fold(0.0_f64, f64::max);
    let scale = ColorScale::spanning(pairs.iter().map(|&(x, _)| x));
    let points = pairs
        .iter()
        .map(|&(x, y)| ScatterPoint {
            x,
            y,
            color: scale.map_or(Color32::LIGHT_BLUE, |s| s.color_for(x)),
            radius: marker_radius(y, max_size),
        })
        .collect();

    Ok(ChartHandle::Scatter {
        x_label: x_col.name.clone(),
        y_label: y_col.name.clone(),
        points,
    })
}

/// Marker area is proportional to `size`.
fn marker_radius(size: f64, max_size: f64) -> f32 {
    if max_size <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    let r = MAX_MARKER_RADIUS * (size / max_size).sqrt() as f32;
    r.max(MIN_MARKER_RADIUS)
}
