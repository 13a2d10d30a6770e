pub mod app;
pub mod controller;
pub mod shared;
pub mod tasks;

use crossbeam_channel::Sender;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::app::settings::AppSettings;
use crate::controller::{Controller, Event};
use crate::shared::errors::AppError;
use crate::tasks::Session;

/// Opens `path`, wires the watcher and stdin into one event queue and runs
/// the controller until the user quits or input ends.
pub fn run(
    path: &Path,
    settings: AppSettings,
    settings_path: Option<PathBuf>,
) -> Result<(), AppError> {
    let mut session = Session::open(path)?;
    let (tx, rx) = crossbeam_channel::unbounded::<Event>();

    if settings.watch {
        let watch_tx = tx.clone();
        let started = session.watch(settings.debounce(), move || {
            let _ = watch_tx.send(Event::FileChanged);
        });
        if let Err(e) = started {
            tracing::warn!(
                target: "system",
                error = %e,
                "External changes will not be picked up"
            );
        }
    }

    spawn_input_reader(tx);

    let stdout = std::io::stdout();
    let mut controller = Controller::new(session, &settings, settings_path, stdout.lock());
    controller.render()?;
    controller.run(&rx)?;
    controller.into_session().close();
    Ok(())
}

/// Forwards stdin lines to the event queue from a dedicated thread.
fn spawn_input_reader(tx: Sender<Event>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let event = match line {
                Ok(line) => Event::Input(line),
                Err(e) => {
                    tracing::error!(target: "system", error = %e, "Failed to read input");
                    break;
                }
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        let _ = tx.send(Event::InputClosed);
    });
}
