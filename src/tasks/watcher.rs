//! File watcher for the open document.
//!
//! Watches the document's directory, filters events down to the document's
//! own file name and invokes a callback once per debounced batch. Saves
//! replace the file by rename, which is why the directory is watched rather
//! than the file's inode.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Watches one document path until stopped or dropped.
pub struct DocumentWatcher {
    /// The debounced watcher instance.
    debouncer: Debouncer<RecommendedWatcher>,
    /// The directory containing the document.
    watched_dir: PathBuf,
    active: bool,
}

impl DocumentWatcher {
    /// Starts watching `document_path`, calling `on_change` after each
    /// debounced burst of modifications to that file.
    pub fn start<F>(
        document_path: &Path,
        debounce: Duration,
        on_change: F,
    ) -> Result<Self, notify::Error>
    where
        F: Fn() + Send + 'static,
    {
        let file_name = document_path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| {
                notify::Error::generic(&format!(
                    "Document path has no file name: {}",
                    document_path.display()
                ))
            })?;
        let watched_dir = document_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let (tx, rx) = channel::<DebounceEventResult>();
        let mut debouncer = new_debouncer(debounce, tx)?;

        std::thread::spawn(move || {
            handle_events(rx, file_name, on_change);
        });

        debouncer
            .watcher()
            .watch(&watched_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(
            target: "tasks::watcher",
            path = %document_path.display(),
            debounce_ms = debounce.as_millis() as u64,
            "File watcher started"
        );

        Ok(Self {
            debouncer,
            watched_dir,
            active: true,
        })
    }

    /// Stops watching and releases the OS watch handle.
    pub fn stop(&mut self) -> Result<(), notify::Error> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.debouncer.watcher().unwatch(&self.watched_dir)?;
        tracing::info!(
            target: "tasks::watcher",
            path = %self.watched_dir.display(),
            "File watcher stopped"
        );
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for DocumentWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(
                target: "tasks::watcher",
                error = %e,
                "Failed to unwatch on drop"
            );
        }
    }
}

/// Forwards debounced batches touching the document to `on_change`.
fn handle_events<F>(rx: Receiver<DebounceEventResult>, file_name: OsString, on_change: F)
where
    F: Fn(),
{
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if events
                    .iter()
                    .any(|event| is_document_path(&event.path, &file_name))
                {
                    tracing::debug!(
                        target: "tasks::watcher",
                        events = events.len(),
                        "Document changed on disk"
                    );
                    on_change();
                }
            }
            Ok(Err(e)) => {
                tracing::error!(
                    target: "tasks::watcher",
                    error = %e,
                    "Watcher error"
                );
            }
            Err(_) => {
                // Channel closed, watcher was dropped
                tracing::debug!(
                    target: "tasks::watcher",
                    "Watcher channel closed, stopping event handler"
                );
                break;
            }
        }
    }
}

fn is_document_path(path: &Path, file_name: &OsStr) -> bool {
    path.file_name() == Some(file_name)
}
