use std::path::Path;

use serde::Deserialize;

use crate::data::loader::{CsvEncoding, LoaderOptions};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Optional settings read from `dashboard.json` in the working directory.
/// Every field has a default, so the file may list only what it changes:
///
/// ```json
/// { "csv_encoding": "auto", "preview_rows": 200 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Encoding assumed for CSV uploads.
    pub csv_encoding: CsvEncoding,
    /// Rows shown in the table preview.
    pub preview_rows: usize,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    /// Show the demo dataset until a file is opened.
    pub show_demo_on_start: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv_encoding: CsvEncoding::Latin1,
            preview_rows: 500,
            window_size: [1200.0, 800.0],
            show_demo_on_start: true,
        }
    }
}

impl DashboardConfig {
    pub const FILE_NAME: &'static str = "dashboard.json";

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read the config file; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Like [`load`](Self::load), but falls back to defaults on error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            csv_encoding: self.csv_encoding,
        }
    }
}
