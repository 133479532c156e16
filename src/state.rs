use eframe::egui::Color32;
use rusty_charts::session::{Action, Response, Session};
use rusty_charts::settings::Settings;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Success(s) | Status::Error(s) => s,
        }
    }

    pub fn color(&self) -> Color32 {
        match self {
            Status::Success(_) => Color32::from_rgb(80, 200, 120),
            Status::Error(_) => Color32::RED,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Chart and export artifacts
/// are read back from the session's pipeline, never cached here.
pub struct AppState {
    pub session: Session,

    /// Outcome of the last upload / conversion / save, shown in the top bar.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            session: Session::new(settings),
            status: None,
        }
    }

    /// Run one user action through the session.
    pub fn dispatch(&mut self, action: Action) {
        match self.session.handle(action) {
            Response::Loaded { rows, columns } => {
                self.status = Some(Status::Success(format!(
                    "✅ File uploaded successfully! {rows} rows, {columns} columns"
                )));
            }
            Response::Download(artifact) => {
                self.status = Some(Status::Success(format!(
                    "✅ File converted successfully! {} is ready",
                    artifact.file_name
                )));
            }
            Response::Failed(e) => {
                log::error!("{e}");
                self.status = Some(Status::Error(e.to_string()));
            }
            // Charts and chart warnings are drawn from the pipeline itself.
            Response::Chart(_) | Response::Warning(_) | Response::Updated(_) | Response::Points(_) => {}
        }
    }

    /// Run several actions collected while drawing a frame.
    pub fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }
}
