//! Logging for the relay binaries.
//!
//! Provides dual output (stdout with colors + file) with thread-safe initialization.

use crate::error::RelayAppError;

use common::ErrorLocation;

use std::io::stdout;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const SERVER_LOG_FILE_NAME: &str = "relay-server.log";
pub const CLIENT_LOG_FILE_NAME: &str = "relay-client.log";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with level: ";
const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Where log lines go besides the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Colored stdout plus the file (server).
    StdoutAndFile,
    /// File only, leaving stdout to the console feed (client).
    FileOnly,
}

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Initialize the logger writing to `{log_dir}/{file_name}` and, depending on
/// `output`, to stdout.
///
/// Safe to call multiple times: later calls log a warning and return Ok.
///
/// # Errors
///
/// Returns [`RelayAppError::Logger`] if the log file cannot be created or the
/// global logger cannot be installed.
pub fn initialize(
    log_dir: &Path,
    file_name: &str,
    output: LogOutput,
) -> Result<(), RelayAppError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, file_name, output);
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{LOG_LEVEL:?}");
        }
    });

    result
}

fn initialize_internal(
    log_dir: &Path,
    file_name: &str,
    output: LogOutput,
) -> Result<(), RelayAppError> {
    build_dispatch(log_dir, file_name, output)?
        .apply()
        .map_err(|e| RelayAppError::Logger {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(std::panic::Location::caller()),
        })
}

/// Build the dispatch without installing it.
#[track_caller]
pub(crate) fn build_dispatch(
    log_dir: &Path,
    file_name: &str,
    output: LogOutput,
) -> Result<Dispatch, RelayAppError> {
    let log_file_path = log_dir.join(file_name);

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let base_dispatch = Dispatch::new().level(LOG_LEVEL);

    // Stdout dispatch (colored)
    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = color_configuration.color(record.level()),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(stdout());

    // File dispatch (plain text, no colors)
    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| RelayAppError::Logger {
                message: format!("Failed to create log file {}: {e}", log_file_path.display()),
                location: ErrorLocation::from(std::panic::Location::caller()),
            })?,
        );

    let dispatch = match output {
        LogOutput::StdoutAndFile => base_dispatch.chain(stdout_dispatch),
        LogOutput::FileOnly => base_dispatch,
    };

    Ok(dispatch.chain(file_dispatch))
}
