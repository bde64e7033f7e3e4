use serde::{Deserialize, Serialize};

use crate::model::display::DisplayMode;

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overwrite saved collections even when they are empty.
    /// Off by default: an empty collection never replaces a saved one.
    #[serde(default)]
    pub save_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Display mode used until one is chosen with `tp theme`
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// ANSI styling of human-readable output
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            display_mode: DisplayMode::default(),
            color: true,
        }
    }
}

fn default_true() -> bool {
    true
}
