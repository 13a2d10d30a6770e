use std::path::{Path, PathBuf};

const APP_DIR: &str = "neptune";

/// Get the base storage directory following XDG Base Directory Specification.
/// Returns `$XDG_DATA_HOME/neptune`, falling back to the platform data dir.
pub fn get_storage_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        if !xdg_data.is_empty() {
            return PathBuf::from(xdg_data).join(APP_DIR);
        }
    }

    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir() -> PathBuf {
    get_storage_dir().join("logs")
}

/// Get the settings file path.
/// Returns `{storage_dir}/settings.json`.
pub fn get_settings_path() -> PathBuf {
    get_storage_dir().join("settings.json")
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Resolve a user-supplied path against the current directory without
/// requiring it to exist.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
