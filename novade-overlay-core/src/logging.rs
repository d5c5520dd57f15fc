//! Logging setup for the overlay crates.
//!
//! Built on the `tracing` ecosystem: a console layer on stdout and an
//! optional daily-rolling file layer, each in text or JSON format.

use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{CoreError, LoggingError};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the non-blocking file writer alive so buffered lines get flushed.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Installs a minimal stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Meant for tests and early startup. An already installed subscriber is left
/// untouched.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn parse_level(level: &str) -> Result<Level, CoreError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(LoggingError::FilterError(format!("Invalid log level in config: {}", other)).into()),
    }
}

fn is_json(format: &str) -> Result<bool, CoreError> {
    match format.to_lowercase().as_str() {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(LoggingError::InitializationFailure(format!("Invalid log format in config: {}", other)).into()),
    }
}

fn create_file_layer(log_path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| CoreError::Filesystem {
        message: "Failed to create log directory".to_string(),
        path: directory.to_path_buf(),
        source,
    })?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("overlay.log"));
    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer = if json {
        fmt::layer().json().with_writer(writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}

/// Installs the global subscriber described by `config`.
///
/// With `is_reload` set, failing to replace an existing subscriber is
/// reported on stderr instead of being returned.
///
/// # Errors
/// [`CoreError::Logging`] for an invalid level/format or when a subscriber is
/// already installed on initial setup; [`CoreError::Filesystem`] when the log
/// directory cannot be created.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let level = parse_level(&config.level)?;
    let json = is_json(&config.format)?;

    let stdout_filter = EnvFilter::new(level.to_string());
    let stdout_layer: BoxedLayer = if json {
        fmt::layer().json().with_writer(stdout).with_ansi(false).with_filter(stdout_filter).boxed()
    } else {
        fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(stdout_filter)
            .boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer];
    let mut file_guard = None;
    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, json)?;
        layers.push(file_layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        file_guard = Some(guard);
    }

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut slot) => *slot = file_guard,
        Err(e) => eprintln!("[ERROR] Failed to lock LOG_WORKER_GUARD: {}. Log flushing may be affected.", e),
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_reload => {
            eprintln!("[INFO] Logging re-initialization attempted; previous subscriber stays active: {}", e);
            Ok(())
        }
        Err(e) => Err(LoggingError::InitializationFailure(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))
        .into()),
    }
}
