use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::schema::SHEET_MASTER;

/// Name of the optional settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "proforma-dash.json";

/// Startup settings. Every field has a default so a partial (or absent)
/// settings file still yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Workbook the dashboard tries to load at startup.
    pub source_path: String,
    /// Sheet holding the master dataset.
    pub sheet_name: String,
    /// How many clients the top-clients chart shows.
    pub top_clients: usize,
    /// How many rows the reconciliation warning table shows.
    pub reconciliation_top: usize,
    /// Bin count for the aging histogram.
    pub aging_bins: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source_path: "PROFORMAS_2026_master_clean_dashboard_data.xlsx".to_string(),
            sheet_name: SHEET_MASTER.to_string(),
            top_clients: 15,
            reconciliation_top: 10,
            aging_bins: 30,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file yields defaults silently;
    /// a malformed file yields defaults with a warning, so a bad edit never
    /// blocks startup.
    pub fn load_from(path: &Path) -> Settings {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Settings::default(),
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring malformed {}: {e}", path.display());
                Settings::default()
            }
        }
    }

    /// Settings from `proforma-dash.json` in the working directory.
    pub fn load() -> Settings {
        Settings::load_from(&PathBuf::from(SETTINGS_FILE))
    }
}
