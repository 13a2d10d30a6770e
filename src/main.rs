//! neptune - edit a to-do file and keep it in sync with external edits.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use neptune_lib::app::{logging, settings};
use neptune_lib::shared::paths::{get_log_dir, get_settings_path};

#[derive(Parser, Debug)]
#[command(name = "neptune")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the to-do file (created with an empty list if missing)
    file: PathBuf,

    /// Start with the completed section expanded
    #[arg(long)]
    show_completed: bool,

    /// Ignore edits made to the file by other programs
    #[arg(long)]
    no_watch: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logging_guards = match logging::init_logging(&get_log_dir()) {
        Ok(guards) => Some(guards),
        Err(e) => {
            eprintln!("neptune: logging disabled: {}", e);
            None
        }
    };

    let mut app_settings = settings::load_settings();
    if cli.show_completed {
        app_settings.show_completed = true;
    }
    if cli.no_watch {
        app_settings.watch = false;
    }

    match neptune_lib::run(&cli.file, app_settings, Some(get_settings_path())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(target: "system", error = %e, "Exiting after fatal error");
            eprintln!("neptune: {}", e);
            ExitCode::FAILURE
        }
    }
}
