use super::types::Document;
use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Maximum number of parse attempts when a foreign writer may be mid-write.
const MAX_PARSE_RETRIES: u32 = 3;
/// Backoff duration between parse retries in milliseconds.
const PARSE_RETRY_BACKOFF_MS: u64 = 50;

const CORRUPT_SUFFIX: &str = "corrupt";

// ============================================================================
// Reading
// ============================================================================

/// Reads and parses the document at `path`, surfacing every failure.
pub fn read_document(path: &Path) -> Result<Document, StorageError> {
    let content = std::fs::read(path).map_err(|e| StorageError::io(path, e))?;
    let data: Document = serde_json::from_slice(&content)?;
    Ok(data)
}

/// Loads the document, creating the file when it is absent.
///
/// Never fails: unreadable or malformed content yields an empty document so
/// a corrupt file can never block the caller.
pub fn load(path: &Path) -> Document {
    match create_if_missing(path) {
        Ok(true) => return Document::default(),
        Ok(false) => {}
        Err(e) => {
            tracing::error!(
                target: "tasks::storage",
                path = %path.display(),
                error = %e,
                "Failed to initialize document, using empty document"
            );
            return Document::default();
        }
    }

    match read_document(path) {
        Ok(data) => {
            tracing::debug!(
                target: "tasks::storage",
                path = %path.display(),
                tasks = data.tasks.len(),
                completed = data.completed.len(),
                skipped = data.skipped.len(),
                "Document loaded"
            );
            data
        }
        Err(StorageError::Parse(e)) => {
            tracing::warn!(
                target: "tasks::storage",
                path = %path.display(),
                error = %e,
                "Malformed document, using empty document"
            );
            preserve_malformed(path);
            Document::default()
        }
        Err(e) => {
            tracing::error!(
                target: "tasks::storage",
                path = %path.display(),
                error = %e,
                "Failed to read document, using empty document"
            );
            Document::default()
        }
    }
}

/// Loads the document for a watcher-triggered reload.
///
/// An external editor may still be writing when the change is observed, so
/// parse failures are retried with a short linear backoff before falling back
/// to [`load`].
pub fn load_with_retry(path: &Path) -> Document {
    for attempt in 0..MAX_PARSE_RETRIES {
        match read_document(path) {
            Ok(data) => {
                if attempt > 0 {
                    tracing::debug!(
                        target: "tasks::storage",
                        path = %path.display(),
                        attempt = attempt + 1,
                        "Loaded document after retry"
                    );
                }
                return data;
            }
            Err(StorageError::Parse(e)) if attempt + 1 < MAX_PARSE_RETRIES => {
                tracing::debug!(
                    target: "tasks::storage",
                    path = %path.display(),
                    attempt = attempt + 1,
                    error = %e,
                    "JSON parse failed, retrying..."
                );
                thread::sleep(Duration::from_millis(
                    PARSE_RETRY_BACKOFF_MS * (attempt as u64 + 1),
                ));
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(
                    target: "tasks::storage",
                    path = %path.display(),
                    "Document removed externally, recreating"
                );
                break;
            }
            Err(_) => break,
        }
    }

    load(path)
}

/// Copies unparseable bytes next to the document so a later save cannot
/// destroy the only copy. Blank files are not worth keeping.
fn preserve_malformed(path: &Path) {
    let Ok(content) = std::fs::read(path) else {
        return;
    };
    if content.iter().all(u8::is_ascii_whitespace) {
        return;
    }

    let backup = corrupt_backup_path(path);
    match std::fs::write(&backup, &content) {
        Ok(()) => tracing::info!(
            target: "tasks::storage",
            backup = %backup.display(),
            "Malformed document preserved"
        ),
        Err(e) => tracing::warn!(
            target: "tasks::storage",
            backup = %backup.display(),
            error = %e,
            "Could not preserve malformed document"
        ),
    }
}

pub fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(CORRUPT_SUFFIX);
    path.with_file_name(name)
}

// ============================================================================
// Writing
// ============================================================================

/// Writes the empty document if nothing exists at `path` yet.
/// Returns whether the file was created.
pub fn create_if_missing(path: &Path) -> Result<bool, StorageError> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(dir) = parent_dir(path) {
        ensure_dir(dir).map_err(|e| StorageError::io(dir, e))?;
    }

    try_save(path, &Document::default())?;
    tracing::info!(
        target: "tasks::storage",
        path = %path.display(),
        "Created empty document"
    );
    Ok(true)
}

/// Serializes the full document and atomically replaces the file.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the target, so observers never see a half-written document.
pub fn try_save(path: &Path, data: &Document) -> Result<(), StorageError> {
    if path.file_name().is_none() {
        return Err(StorageError::InvalidPath(path.to_path_buf()));
    }
    let dir = parent_dir(path).unwrap_or(Path::new("."));
    let content = serde_json::to_string_pretty(data)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| StorageError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StorageError::io(temp.path(), e))?;

    if let Ok(meta) = std::fs::metadata(path) {
        // Keep the existing file mode instead of the temp file's private one.
        if let Err(e) = temp.as_file().set_permissions(meta.permissions()) {
            tracing::debug!(
                target: "tasks::storage",
                path = %path.display(),
                error = %e,
                "Could not copy file mode to replacement"
            );
        }
    }

    temp.persist(path)
        .map_err(|e| StorageError::persist(path, e.error))?;
    Ok(())
}

/// Saves the document, reporting failure instead of raising it.
/// The previous file content is untouched when this returns `false`.
pub fn save(path: &Path, data: &Document) -> bool {
    match try_save(path, data) {
        Ok(()) => {
            tracing::debug!(
                target: "tasks::storage",
                path = %path.display(),
                "Document saved"
            );
            true
        }
        Err(e) => {
            tracing::error!(
                target: "tasks::storage",
                path = %path.display(),
                error = %e,
                "Failed to save document"
            );
            false
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
