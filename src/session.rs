//! Caller-owned session context. The UI builds an [`Action`] for each user
//! interaction and hands it to [`Session::handle`], which answers with a
//! [`Response`] describing what to show.

use thiserror::Error;

use crate::chart::{ChartHandle, ChartKind, ChartWarning};
use crate::data::clean::Cleaning;
use crate::data::loader::ParseError;
use crate::data::view::SelectionError;
use crate::export::{ExportArtifact, ExportError, ExportFormat};
use crate::pipeline::{Pipeline, Stage};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Upload { file_name: String, bytes: Vec<u8> },
    SetCleaning(Cleaning),
    SelectColumns(Vec<String>),
    SetChartKind(ChartKind),
    SetExportFormat(ExportFormat),
    Export,
    EarnPoint,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Error reading file: {0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Selection(#[from] SelectionError),
    #[error("Error during file conversion: {0}")]
    Export(#[from] ExportError),
    #[error("no file loaded")]
    NotLoaded,
}

#[derive(Debug)]
pub enum Response {
    Loaded { rows: usize, columns: usize },
    /// State changed; nothing to chart (no columns selected).
    Updated(Stage),
    Chart(ChartHandle),
    Warning(ChartWarning),
    Download(ExportArtifact),
    Points(u64),
    Failed(ActionError),
}

/// Everything one user's session owns.
#[derive(Default)]
pub struct Session {
    pub settings: Settings,
    pipeline: Pipeline,
    points: u64,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            pipeline: Pipeline::new(),
            points: 0,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    pub fn handle(&mut self, action: Action) -> Response {
        match self.apply(action) {
            Ok(response) => response,
            Err(e) => Response::Failed(e),
        }
    }

    fn apply(&mut self, action: Action) -> Result<Response, ActionError> {
        match action {
            Action::Upload { file_name, bytes } => {
                let table = self.pipeline.load(&bytes, &file_name)?;
                Ok(Response::Loaded {
                    rows: table.len(),
                    columns: table.width(),
                })
            }
            Action::SetCleaning(cleaning) => {
                self.require_loaded()?;
                self.pipeline.set_cleaning(cleaning);
                Ok(self.chart_response())
            }
            Action::SelectColumns(names) => {
                self.require_loaded()?;
                self.pipeline.select_columns(names)?;
                Ok(self.chart_response())
            }
            Action::SetChartKind(kind) => {
                self.pipeline.set_chart_kind(kind);
                Ok(self.chart_response())
            }
            Action::SetExportFormat(format) => {
                self.pipeline.set_export_format(format);
                Ok(Response::Updated(self.pipeline.stage()))
            }
            Action::Export => {
                let stem = self.settings.export_stem.clone();
                let artifact = self.pipeline.export(&stem).ok_or(ActionError::NotLoaded)??;
                Ok(Response::Download(artifact.clone()))
            }
            Action::EarnPoint => {
                self.points = self.points.saturating_add(1);
                log::debug!("Session points: {}", self.points);
                Ok(Response::Points(self.points))
            }
        }
    }

    fn require_loaded(&self) -> Result<(), ActionError> {
        match self.pipeline.stage() {
            Stage::Empty => Err(ActionError::NotLoaded),
            _ => Ok(()),
        }
    }

    fn chart_response(&self) -> Response {
        match self.pipeline.chart() {
            Some(Ok(handle)) => Response::Chart(handle.clone()),
            Some(Err(warning)) => Response::Warning(warning.clone()),
            None => Response::Updated(self.pipeline.stage()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(session: &mut Session, bytes: &[u8]) -> Response {
        session.handle(Action::Upload {
            file_name: "data.csv".into(),
            bytes: bytes.to_vec(),
        })
    }

    #[test]
    fn points_increment_by_one() {
        let mut session = Session::default();
        assert!(matches!(session.handle(Action::EarnPoint), Response::Points(1)));
        assert!(matches!(session.handle(Action::EarnPoint), Response::Points(2)));
        assert_eq!(session.points(), 2);
    }

    #[test]
    fn points_survive_a_new_upload() {
        let mut session = Session::default();
        session.handle(Action::EarnPoint);
        upload(&mut session, b"a\n1\n");
        assert_eq!(session.points(), 1);
    }

    #[test]
    fn upload_reports_shape() {
        let mut session = Session::default();
        let response = upload(&mut session, b"a,b\n1,2\n3,4\n5,6\n");
        assert!(matches!(response, Response::Loaded { rows: 3, columns: 2 }));
    }

    #[test]
    fn parse_failure_is_reported() {
        let mut session = Session::default();
        let response = upload(&mut session, b"a\n1,2\n");
        let Response::Failed(err) = response else {
            panic!("expected a failure");
        };
        assert!(err.to_string().starts_with("Error reading file:"));
        assert_eq!(session.pipeline().stage(), Stage::Empty);
    }

    #[test]
    fn actions_before_upload_fail() {
        let mut session = Session::default();
        for action in [
            Action::SetCleaning(Cleaning::default()),
            Action::SelectColumns(vec!["a".into()]),
            Action::Export,
        ] {
            assert!(matches!(
                session.handle(action),
                Response::Failed(ActionError::NotLoaded)
            ));
        }
    }

    #[test]
    fn chart_warning_is_not_a_failure() {
        let mut session = Session::default();
        upload(&mut session, b"name\nann\n");
        let response = session.handle(Action::SelectColumns(vec!["name".into()]));
        assert!(matches!(
            response,
            Response::Warning(ChartWarning::NoNumericColumns)
        ));
    }

    #[test]
    fn export_uses_configured_stem() {
        let mut session = Session::default();
        session.settings.export_stem = "report".into();
        upload(&mut session, b"a\n1\n");
        session.handle(Action::SetExportFormat(ExportFormat::Excel));
        let Response::Download(artifact) = session.handle(Action::Export) else {
            panic!("expected a download");
        };
        assert_eq!(artifact.file_name, "report.xlsx");
    }
}
