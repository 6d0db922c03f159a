use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LogError {
    #[error("Log Open Error: {path}: {source} {location}")]
    Open {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Log Write Error: {path}: {source} {location}")]
    Write {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("Log Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Probe Error: liveness probe is never logged {location}")]
    Probe { location: ErrorLocation },
}

impl From<csv::Error> for LogError {
    #[track_caller]
    fn from(error: csv::Error) -> Self {
        LogError::Encode {
            message: error.to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
