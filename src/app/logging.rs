use std::collections::HashMap;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Target prefixes that get their own log file; everything else goes to
/// `system.log`.
const COMPONENTS: [&str; 2] = ["tasks", "controller"];

/// Keeps the non-blocking writers flushing until dropped.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

struct ComponentWriter {
    writers: HashMap<String, NonBlocking>,
    system_writer: NonBlocking,
}

impl ComponentWriter {
    fn new(writers: HashMap<String, NonBlocking>, system_writer: NonBlocking) -> Self {
        Self {
            writers,
            system_writer,
        }
    }

    fn writer_for_target(&self, target: &str) -> &NonBlocking {
        self.writers
            .iter()
            .find(|(component, _)| matches_component(target, component))
            .map(|(_, writer)| writer)
            .unwrap_or(&self.system_writer)
    }
}

impl<'a> MakeWriter<'a> for ComponentWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.system_writer.clone()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        self.writer_for_target(meta.target()).clone()
    }
}

fn matches_component(target: &str, component: &str) -> bool {
    target == component
        || target
            .strip_prefix(component)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Installs the global subscriber writing daily-rotated files under
/// `log_dir`. Stdout stays free for the task list.
pub fn init_logging(log_dir: &Path) -> std::io::Result<LoggingGuards> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let mut guards = Vec::new();
    let mut component_writers = HashMap::new();

    for component in COMPONENTS {
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", component));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        component_writers.insert(component.to_string(), non_blocking);
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let writer = ComponentWriter::new(component_writers, system_writer);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber).map_err(std::io::Error::other)?;

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}
