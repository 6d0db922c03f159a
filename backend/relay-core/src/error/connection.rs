use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConnectionError {
    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Actor Stopped Error: {message} {location}")]
    ActorStopped {
        message: String,
        location: ErrorLocation,
    },
}

impl ConnectionError {
    /// True when the error came from the socket itself (and therefore flipped
    /// the connection to `Disconnected`), as opposed to a local refusal.
    pub fn is_io_failure(&self) -> bool {
        matches!(
            self,
            ConnectionError::Connect { .. }
                | ConnectionError::Send { .. }
                | ConnectionError::Read { .. }
                | ConnectionError::Closed { .. }
        )
    }

    #[track_caller]
    pub(crate) fn not_connected() -> Self {
        ConnectionError::NotConnected {
            message: "Not connected to server".to_string(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn actor_stopped() -> Self {
        ConnectionError::ActorStopped {
            message: "Connection actor is no longer running".to_string(),
            location: ErrorLocation::caller(),
        }
    }
}
