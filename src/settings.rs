use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File the app looks for in its working directory.
pub const SETTINGS_FILE: &str = "rusty-charts.json";

/// User-tunable settings. Missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    /// Converted files are named `{export_stem}.csv` / `{export_stem}.xlsx`.
    pub export_stem: String,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            export_stem: "converted_file".to_string(),
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&text).context("parsing settings JSON")
    }

    /// Settings from `path` if it exists, defaults otherwise. A file that
    /// fails to parse is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "preview_rows": 10 }"#).unwrap();
        assert_eq!(settings.preview_rows, 10);
        assert_eq!(settings.export_stem, "converted_file");
    }

    #[test]
    fn absent_file_gives_defaults() {
        let settings = Settings::load_or_default(Path::new("does/not/exist.json"));
        assert_eq!(settings, Settings::default());
    }
}
