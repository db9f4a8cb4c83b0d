//! Log output for the client binaries.
//!
//! Libraries only emit `tracing` events; this module decides where they go:
//! stderr at a level picked by `--quiet` / `--debug`, and optionally a log
//! file with its own level. Lines read `[LEVEL]: message`.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Level accepted by `--log-file-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Everything, including per-class progress.
    #[value(name = "DEBUG")]
    Debug,
    /// Phase progress.
    #[value(name = "INFO")]
    Info,
    /// Anomalies such as duplicate classes.
    #[value(name = "WARNING")]
    Warning,
    /// Failed queries and writes only.
    #[value(name = "ERROR")]
    Error,
}

impl LogLevel {
    /// The matching `tracing` filter.
    #[must_use]
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Errors only on the console.
    pub quiet: bool,
    /// Debug output on the console (ignored when `quiet`).
    pub debug: bool,
    /// Optional log file.
    pub log_file: Option<PathBuf>,
    /// Level for the log file.
    pub log_file_level: LogLevel,
}

/// Console level for the given flags.
#[must_use]
pub fn console_level(quiet: bool, debug: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// `[LEVEL]: message`
struct Bracketed;

impl<S, N> FormatEvent<S, N> for Bracketed
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}]: ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes the log file when dropped; keep it alive
/// until the program ends.
///
/// # Errors
///
/// Returns an error if the log file path has no file name or a global
/// subscriber is already installed.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(Bracketed)
        .with_filter(console_level(settings.quiet, settings.debug));

    let (file, guard) = match &settings.log_file {
        Some(path) => {
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .event_format(Bracketed)
                .with_filter(settings.log_file_level.filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install log subscriber")?;
    tracing::debug!("Logging initialised");
    Ok(guard)
}
