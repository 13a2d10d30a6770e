use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::helpers::label_from_path;
use super::storage;
use super::types::{Document, TaskId};
use super::watcher::DocumentWatcher;
use crate::shared::errors::StorageError;
use crate::shared::paths::absolutize;

/// Result of routing one mutation through the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed and nothing was pending, so nothing was written.
    Unchanged,
    Saved,
    /// The write failed; the edit is kept in memory for a later retry.
    SaveFailed,
}

/// One open document: its path, the authoritative in-memory copy and the
/// watcher observing the file.
///
/// Mutations take `&mut self`, so they are serialized by whoever owns the
/// session. Each mutation is applied to a copy, saved, and only then becomes
/// the current document.
pub struct Session {
    path: PathBuf,
    document: Document,
    dirty: bool,
    /// What this session last wrote (or read) successfully. A reload that
    /// finds exactly this on disk is our own save echoing back.
    last_persisted: Document,
    watcher: Option<DocumentWatcher>,
}

impl Session {
    /// Opens `path`, creating the empty document on disk when absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let requested = path.as_ref();
        let path = absolutize(requested).map_err(|e| StorageError::io(requested, e))?;

        storage::create_if_missing(&path)?;
        let document = storage::load(&path);

        tracing::info!(
            target: "tasks::session",
            path = %path.display(),
            tasks = document.tasks.len(),
            completed = document.completed.len(),
            skipped = document.skipped.len(),
            "Document opened"
        );

        Ok(Self {
            path,
            last_persisted: document.clone(),
            document,
            dirty: false,
            watcher: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// True when the last save failed and memory is ahead of disk.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn add_task(&mut self, text: impl Into<String>) -> (TaskId, Outcome) {
        let mut next = self.document.clone();
        let id = next.add_task(text, Utc::now());
        (id, self.commit("add", next, true))
    }

    /// Adds one task per dropped file, labelled with the file name.
    pub fn add_tasks_from_files(&mut self, files: &[PathBuf]) -> (Vec<TaskId>, Outcome) {
        let mut next = self.document.clone();
        let now = Utc::now();
        let ids: Vec<TaskId> = files
            .iter()
            .map(|file| next.add_task(label_from_path(file), now))
            .collect();
        let changed = !ids.is_empty();
        (ids, self.commit("drop_files", next, changed))
    }

    pub fn complete_task(&mut self, id: &TaskId) -> Outcome {
        let now = Utc::now();
        self.apply("complete", |doc| doc.complete_task(id, now))
    }

    pub fn skip_task(&mut self, id: &TaskId) -> Outcome {
        let now = Utc::now();
        self.apply("skip", |doc| doc.skip_task(id, now))
    }

    pub fn update_text(&mut self, id: &TaskId, text: impl Into<String>) -> Outcome {
        let text = text.into();
        self.apply("update_text", |doc| doc.update_text(id, text))
    }

    pub fn set_due_date(&mut self, id: &TaskId, due: Option<NaiveDate>) -> Outcome {
        self.apply("set_due_date", |doc| doc.set_due_date(id, due))
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Outcome {
        if from >= self.document.tasks.len() || to >= self.document.tasks.len() {
            tracing::warn!(
                target: "tasks::session",
                from,
                to,
                len = self.document.tasks.len(),
                "Rejected reorder with out-of-range index"
            );
        }
        self.apply("reorder", |doc| doc.reorder(from, to))
    }

    pub fn delete_permanently(&mut self, id: &TaskId) -> Outcome {
        self.apply("delete", |doc| doc.delete_permanently(id))
    }

    /// Writes the in-memory document again after an earlier failure.
    pub fn retry_save(&mut self) -> Outcome {
        self.apply("retry", |_| false)
    }

    /// Replaces the in-memory document with what is on disk. Returns whether
    /// the content differed.
    ///
    /// An unsaved edit survives while the file still holds what this session
    /// last wrote; only a change made by someone else discards it.
    pub fn reload(&mut self) -> bool {
        let fresh = storage::load_with_retry(&self.path);
        if self.dirty && fresh == self.last_persisted {
            tracing::debug!(
                target: "tasks::session",
                path = %self.path.display(),
                "Disk still holds our last save, keeping unsaved changes"
            );
            return false;
        }

        let changed = fresh != self.document;
        if self.dirty {
            tracing::warn!(
                target: "tasks::session",
                path = %self.path.display(),
                "Reload discarded unsaved changes"
            );
        }
        self.last_persisted = fresh.clone();
        self.document = fresh;
        self.dirty = false;

        tracing::debug!(
            target: "tasks::session",
            changed,
            "Document reloaded"
        );
        changed
    }

    fn apply(&mut self, action: &'static str, mutate: impl FnOnce(&mut Document) -> bool) -> Outcome {
        let mut next = self.document.clone();
        let changed = mutate(&mut next);
        self.commit(action, next, changed)
    }

    fn commit(&mut self, action: &'static str, next: Document, changed: bool) -> Outcome {
        if !changed && !self.dirty {
            tracing::debug!(target: "tasks::session", action, "No-op mutation");
            return Outcome::Unchanged;
        }

        let saved = storage::save(&self.path, &next);
        if saved {
            self.last_persisted = next.clone();
        }
        self.document = next;
        self.dirty = !saved;

        if saved {
            tracing::debug!(target: "tasks::session", action, "Mutation saved");
            Outcome::Saved
        } else {
            tracing::warn!(
                target: "tasks::session",
                action,
                "Mutation kept in memory, save failed"
            );
            Outcome::SaveFailed
        }
    }

    // ------------------------------------------------------------------
    // Watching
    // ------------------------------------------------------------------

    /// Starts observing the document file. A no-op when already watching.
    pub fn watch<F>(&mut self, debounce: Duration, on_change: F) -> Result<(), notify::Error>
    where
        F: Fn() + Send + 'static,
    {
        if self.watcher.is_some() {
            tracing::debug!(target: "tasks::session", "Watcher already running");
            return Ok(());
        }
        self.watcher = Some(DocumentWatcher::start(&self.path, debounce, on_change)?);
        Ok(())
    }

    pub fn unwatch(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(e) = watcher.stop() {
                tracing::warn!(
                    target: "tasks::session",
                    error = %e,
                    "Failed to stop watcher"
                );
            }
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Closes the document, releasing the watcher.
    pub fn close(mut self) {
        self.unwatch();
        tracing::info!(
            target: "tasks::session",
            path = %self.path.display(),
            unsaved = self.dirty,
            "Document closed"
        );
    }
}
