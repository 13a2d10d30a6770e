use crate::shared::paths::{ensure_dir, get_settings_path};
use crate::tasks::watcher::DEFAULT_DEBOUNCE_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const MIN_DEBOUNCE_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Whether the completed section starts expanded.
    pub show_completed: bool,
    pub debounce_ms: u64,
    /// Whether to react to external edits of the document.
    pub watch: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_completed: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            watch: true,
        }
    }
}

impl AppSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.max(MIN_DEBOUNCE_MS))
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub fn load_settings() -> AppSettings {
    load_settings_from(&get_settings_path())
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }

    match load_settings_from_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(
                target: "system",
                path = %path.display(),
                error = %e,
                "Ignoring unreadable settings"
            );
            AppSettings::default()
        }
    }
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;
    Ok(())
}
