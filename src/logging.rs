use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Number of daily log files kept before the oldest is deleted (~30 days).
pub const MAX_LOG_FILES: usize = 30;

/// Build the daily rotating appender, creating `log_dir` if needed.
fn file_appender(log_dir: &str, log_prefix: &str) -> Result<RollingFileAppender> {
    let log_path = Utf8PathBuf::from(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .with_context(|| format!("Failed to create log file appender in {}", log_dir))
}

/// Keeps file logging alive and allows the level to be changed after startup.
///
/// Must be held for the duration of the program; dropping it flushes the file log.
pub struct LoggingGuard {
    _worker: WorkerGuard,
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LoggingGuard {
    /// Switch between debug and info level (a `RUST_LOG` setting still wins).
    pub fn set_debug_mode(&self, debug_mode: bool) -> Result<()> {
        self.filter
            .reload(env_filter(debug_mode))
            .context("Failed to change log level")?;
        tracing::debug!("Log level changed, debug={}", debug_mode);
        Ok(())
    }
}

fn env_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Setup logging with a rotating file appender only.
///
/// # Arguments
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_prefix` - Prefix for log files (e.g., "App_Log")
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(log_dir: &str, log_prefix: &str, debug_mode: bool) -> Result<LoggingGuard> {
    setup_logging_with_console(log_dir, log_prefix, debug_mode, false)
}

/// Setup logging with optional console output.
///
/// Logs are written to `log_dir` as `<log_prefix>.<date>.log`, rotated daily,
/// keeping the last [`MAX_LOG_FILES`] files. `RUST_LOG` overrides the level.
///
/// # Arguments
/// * `log_dir` - Directory for log files
/// * `log_prefix` - Prefix for log files
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to stderr
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging_with_console(
    log_dir: &str,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<LoggingGuard> {
    let (non_blocking, worker) = tracing_appender::non_blocking(file_appender(log_dir, log_prefix)?);
    let (filter_layer, filter) = reload::Layer::new(env_filter(debug_mode));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if console_output {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(file_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}",
        log_dir,
        log_prefix,
        debug_mode,
        console_output
    );

    Ok(LoggingGuard {
        _worker: worker,
        filter,
    })
}
