//! Terminal task list controller.
//!
//! User input and file-watch signals arrive on one queue and are handled one
//! at a time, so no two mutations ever interleave. Each handled mutation is
//! followed by a redraw of the post-save document.

pub mod command;
pub mod view;

use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::app::settings::{load_settings_from, save_settings_to, AppSettings};
use crate::tasks::{today_local, Outcome, Session, TaskId};
use command::{Command, HELP};
use view::ViewOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Input(String),
    InputClosed,
    FileChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller<W: Write> {
    session: Session,
    out: W,
    show_completed: bool,
    /// Where the completed-section preference is remembered, if anywhere.
    settings_path: Option<PathBuf>,
}

impl<W: Write> Controller<W> {
    pub fn new(
        session: Session,
        settings: &AppSettings,
        settings_path: Option<PathBuf>,
        out: W,
    ) -> Self {
        Self {
            session,
            out,
            show_completed: settings.show_completed,
            settings_path,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Handles events until `quit`, end of input, or the queue closing.
    pub fn run(&mut self, events: &Receiver<Event>) -> io::Result<()> {
        while let Ok(event) = events.recv() {
            if self.handle(event)? == Flow::Quit {
                break;
            }
        }
        self.out.flush()
    }

    pub fn handle(&mut self, event: Event) -> io::Result<Flow> {
        match event {
            Event::Input(line) => self.handle_input(&line),
            Event::InputClosed => Ok(Flow::Quit),
            Event::FileChanged => {
                if self.session.reload() {
                    tracing::info!(target: "controller", "External change loaded");
                    self.render()?;
                } else {
                    tracing::debug!(target: "controller", "Reload matched memory, view kept");
                }
                Ok(Flow::Continue)
            }
        }
    }

    fn handle_input(&mut self, line: &str) -> io::Result<Flow> {
        match command::parse(line, today_local()) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => {
                self.prompt()?;
                Ok(Flow::Continue)
            }
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                self.prompt()?;
                Ok(Flow::Continue)
            }
        }
    }

    fn execute(&mut self, command: Command) -> io::Result<Flow> {
        tracing::debug!(target: "controller", command = ?command, "Executing command");

        let outcome = match command {
            Command::Add(text) => self.session.add_task(text).1,
            Command::DropFiles(files) => self.session.add_tasks_from_files(&files).1,
            Command::Complete(index) => match self.active_id(index)? {
                Some(id) => self.session.complete_task(&id),
                None => return self.continue_with_prompt(),
            },
            Command::Skip(index) => match self.active_id(index)? {
                Some(id) => self.session.skip_task(&id),
                None => return self.continue_with_prompt(),
            },
            Command::Edit(index, text) => match self.active_id(index)? {
                Some(id) => self.session.update_text(&id, text),
                None => return self.continue_with_prompt(),
            },
            Command::Due(index, due) => match self.active_id(index)? {
                Some(id) => self.session.set_due_date(&id, due),
                None => return self.continue_with_prompt(),
            },
            Command::Move { from, to } => {
                let len = self.session.document().tasks.len();
                if from >= len || to >= len {
                    writeln!(self.out, "Positions must be between 1 and {}", len)?;
                    return self.continue_with_prompt();
                }
                self.session.reorder(from, to)
            }
            Command::Delete(index) => match self.completed_id(index)? {
                Some(id) => self.session.delete_permanently(&id),
                None => return self.continue_with_prompt(),
            },
            Command::ToggleCompleted => {
                self.show_completed = !self.show_completed;
                self.remember_show_completed();
                self.render()?;
                return Ok(Flow::Continue);
            }
            Command::Retry => {
                if !self.session.has_unsaved_changes() {
                    writeln!(self.out, "Nothing to save")?;
                    return self.continue_with_prompt();
                }
                self.session.retry_save()
            }
            Command::Reload => {
                self.session.reload();
                self.render()?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
                return self.continue_with_prompt();
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        if outcome == Outcome::SaveFailed {
            writeln!(
                self.out,
                "Could not save {}. Your edit is kept; type `retry` to try again.",
                self.session.path().display()
            )?;
        }
        self.render()?;
        Ok(Flow::Continue)
    }

    fn active_id(&mut self, index: usize) -> io::Result<Option<TaskId>> {
        let id = self
            .session
            .document()
            .tasks
            .get(index)
            .map(|task| task.id.clone());
        if id.is_none() {
            writeln!(self.out, "No task #{}", index + 1)?;
        }
        Ok(id)
    }

    fn completed_id(&mut self, index: usize) -> io::Result<Option<TaskId>> {
        let id = self
            .session
            .document()
            .completed
            .get(index)
            .map(|task| task.id.clone());
        if id.is_none() {
            writeln!(self.out, "No completed task #{}", index + 1)?;
        }
        Ok(id)
    }

    fn remember_show_completed(&self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let mut stored = load_settings_from(path);
        stored.show_completed = self.show_completed;
        if let Err(e) = save_settings_to(path, &stored) {
            tracing::warn!(
                target: "controller",
                error = %e,
                "Failed to remember completed section preference"
            );
        }
    }

    /// Redraws the full list followed by the prompt.
    pub fn render(&mut self) -> io::Result<()> {
        let title = self
            .session
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let options = ViewOptions {
            title: &title,
            show_completed: self.show_completed,
            unsaved: self.session.has_unsaved_changes(),
        };
        let text = view::render(self.session.document(), &options, today_local());
        write!(self.out, "\n{}", text)?;
        self.prompt()
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }

    fn continue_with_prompt(&mut self) -> io::Result<Flow> {
        self.prompt()?;
        Ok(Flow::Continue)
    }
}
