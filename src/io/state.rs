use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::display::DisplayMode;

const STATE_FILE: &str = ".state.json";

/// Persisted view state (written to .state.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Active tag filter
    #[serde(default)]
    pub selected_tag: Option<String>,
    /// Chosen display mode (None = use the config default)
    #[serde(default)]
    pub display_mode: Option<DisplayMode>,
}

impl UiState {
    /// Effective display mode, falling back to `default`
    pub fn display_mode_or(&self, default: DisplayMode) -> DisplayMode {
        self.display_mode.unwrap_or(default)
    }
}

/// Read .state.json from the data directory
pub fn read_ui_state(data_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(data_dir.join(STATE_FILE)).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed view state");
            None
        }
    }
}

/// Write .state.json to the data directory
pub fn write_ui_state(data_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    crate::io::store::atomic_write(data_dir, &data_dir.join(STATE_FILE), content.as_bytes())
}
