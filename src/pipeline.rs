use std::fmt;

use crate::chart::{chart, ChartHandle, ChartKind, ChartRequest, ChartWarning};
use crate::data::clean::Cleaning;
use crate::data::loader::{ingest, ParseError};
use crate::data::model::Table;
use crate::data::view::{numeric_view, select, ColumnSelection, NumericView, SelectionError};
use crate::export::{export_artifact, ExportArtifact, ExportError, ExportFormat};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Where a session is in `Empty → Loaded → {Cleaned}* → Selected → Charted →
/// Exported`. Derived from what the pipeline currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    Loaded,
    Cleaned,
    Selected,
    Charted,
    Exported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Empty => "empty",
            Stage::Loaded => "loaded",
            Stage::Cleaned => "cleaned",
            Stage::Selected => "selected",
            Stage::Charted => "charted",
            Stage::Exported => "exported",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

struct Loaded {
    file_name: String,
    /// The table as uploaded.
    source: Table,
    /// `source` after the active cleaning steps.
    working: Table,
}

/// Per-session pipeline state. Every derived artifact (working table, chart,
/// export) is dropped and recomputed when one of its inputs changes.
#[derive(Default)]
pub struct Pipeline {
    loaded: Option<Loaded>,
    cleaning: Cleaning,
    selection: ColumnSelection,
    chart_kind: ChartKind,
    chart: Option<Result<ChartHandle, ChartWarning>>,
    export_format: ExportFormat,
    artifact: Option<ExportArtifact>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        if self.loaded.is_none() {
            Stage::Empty
        } else if self.artifact.is_some() {
            Stage::Exported
        } else if matches!(self.chart, Some(Ok(_))) {
            Stage::Charted
        } else if !self.selection.is_empty() {
            Stage::Selected
        } else if self.cleaning.is_active() {
            Stage::Cleaned
        } else {
            Stage::Loaded
        }
    }

    /// Replace whatever was loaded. A parse failure leaves the pipeline empty.
    pub fn load(&mut self, bytes: &[u8], file_name: &str) -> Result<&Table, ParseError> {
        *self = Self {
            chart_kind: self.chart_kind,
            export_format: self.export_format,
            ..Self::default()
        };
        let source = ingest(bytes, file_name).map_err(|e| {
            log::error!("Failed to read '{file_name}': {e}");
            e
        })?;
        let loaded = self.loaded.insert(Loaded {
            file_name: file_name.to_string(),
            working: source.clone(),
            source,
        });
        Ok(&loaded.working)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.file_name.as_str())
    }

    /// The uploaded table after cleaning.
    pub fn table(&self) -> Option<&Table> {
        self.loaded.as_ref().map(|l| &l.working)
    }

    /// The table as uploaded, before any cleaning.
    pub fn uploaded(&self) -> Option<&Table> {
        self.loaded.as_ref().map(|l| &l.source)
    }

    /// The first `rows` rows of the upload. Cleaning does not change it.
    pub fn preview(&self, rows: usize) -> Option<Table> {
        self.uploaded().map(|t| t.head(rows))
    }

    pub fn cleaning(&self) -> Cleaning {
        self.cleaning
    }

    /// Re-derive the working table from the uploaded one. Switching a step
    /// off brings its rows back.
    pub fn set_cleaning(&mut self, cleaning: Cleaning) {
        self.cleaning = cleaning;
        if let Some(loaded) = &mut self.loaded {
            loaded.working = cleaning.apply(&loaded.source);
            log::info!(
                "Cleaning {cleaning:?}: {} of {} rows remain",
                loaded.working.len(),
                loaded.source.len()
            );
        }
        self.artifact = None;
        self.rechart();
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    /// Choose the columns to chart. Any previous chart or export is
    /// discarded; an empty selection leaves nothing to chart.
    pub fn select_columns<I, S>(&mut self, names: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(table) = self.table() else {
            let unknown: Option<String> = names.into_iter().next().map(Into::into);
            return match unknown {
                Some(name) => Err(SelectionError::UnknownColumn(name)),
                None => Ok(()),
            };
        };
        let selection = ColumnSelection::new(table, names)?;
        log::debug!("Selected columns {:?}", selection.names());
        self.selection = selection;
        self.artifact = None;
        self.rechart();
        Ok(())
    }

    /// The selected columns of the cleaned table.
    pub fn selected_table(&self) -> Option<Table> {
        self.table().map(|t| select(t, &self.selection))
    }

    /// Numeric projection of the selected columns.
    pub fn numeric_view(&self) -> Option<NumericView> {
        self.selected_table().map(|t| numeric_view(&t))
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart_kind = kind;
        self.artifact = None;
        self.rechart();
    }

    /// The current chart outcome; `None` when nothing is selected.
    pub fn chart(&self) -> Option<&Result<ChartHandle, ChartWarning>> {
        self.chart.as_ref()
    }

    fn rechart(&mut self) {
        self.chart = None;
        if self.selection.is_empty() {
            return;
        }
        if let Some(view) = self.numeric_view() {
            let request = ChartRequest {
                kind: self.chart_kind,
                source: &view,
            };
            self.chart = Some(chart(&request));
        }
    }

    pub fn export_format(&self) -> ExportFormat {
        self.export_format
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        self.export_format = format;
        self.artifact = None;
    }

    /// Convert the cleaned table (all columns, not just the selection). A
    /// failure leaves cleaning and selection as they were. `None` when
    /// nothing is loaded.
    pub fn export(&mut self, stem: &str) -> Option<Result<&ExportArtifact, ExportError>> {
        let table = self.table()?;
        let result = export_artifact(table, self.export_format, stem);
        Some(match result {
            Ok(artifact) => Ok(self.artifact.insert(artifact)),
            Err(e) => {
                log::error!("Export as {} failed: {e}", self.export_format);
                self.artifact = None;
                Err(e)
            }
        })
    }

    pub fn artifact(&self) -> Option<&ExportArtifact> {
        self.artifact.as_ref()
    }
}
