use relay_core::error::config::ConfigError;
use relay_core::error::server::ServerError;

use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error;

/// Errors that end a relay binary.
#[derive(Debug, Error)]
pub enum RelayAppError {
    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Config file or overrides are invalid
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Server could not start
    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },

    /// Terminal or signal I/O failed
    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ConfigError> for RelayAppError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        RelayAppError::Config {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<ServerError> for RelayAppError {
    #[track_caller]
    fn from(error: ServerError) -> Self {
        RelayAppError::Server {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}

impl From<IoError> for RelayAppError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        RelayAppError::Io {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
