use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Level used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LEVEL: &str = "warn";

// --- Formatter ---

struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(writer, "{} ", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        // Library events are tagged with their crate, binary events with file:line.
        let target = meta.target();
        if target.starts_with("fiscal_cli") || target == "fiscal" {
            let file = meta.file().map(|f| {
                f.strip_prefix("src/")
                    .or_else(|| f.strip_prefix("src\\"))
                    .unwrap_or(f)
            });
            if let (Some(file), Some(line)) = (file, meta.line()) {
                if ansi {
                    write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
                } else {
                    write!(writer, "{file}:{line} ")?;
                }
            }
        } else if ansi {
            write!(writer, "\x1b[36m{target}\x1b[0m ")?;
        } else {
            write!(writer, "{target} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Configuration ---

/// Logging options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// A bare level ("warn", "debug", ...) or any EnvFilter directive.
    pub level: Option<String>,
    /// Append log records to this file as well.
    pub file: Option<PathBuf>,
}

/// Builds the global filter: explicit level first, then `RUST_LOG`, then
/// [`DEFAULT_LEVEL`].
pub fn make_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level.to_lowercase())
            .with_context(|| format!("invalid log level '{level}'")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Builds the subscriber without installing it.
///
/// - Stderr: colored when attached to a terminal, plain when piped. Results
///   go to stdout, so logs never mix with `--json` output.
/// - File: plain text, appended, only when [`LogConfig::file`] is set.
pub fn build_subscriber(config: &LogConfig) -> Result<impl Subscriber + Send + Sync + 'static> {
    let filter = make_filter(config.level.as_deref())?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = match &config.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(LocalFmt)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(filter) // global level ceiling for both outputs
        .with(stderr_layer)
        .with(file_layer))
}

/// Initializes logging. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .context("logging already initialized")
}
