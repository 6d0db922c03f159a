// Unit tests for app error conversions

use crate::error::RelayAppError;

use relay_core::error::config::ConfigError;

use common::ErrorLocation;

use std::io::{Error as IoError, ErrorKind};

/// **VALUE**: Verifies config errors keep their message when surfaced by a binary.
///
/// **WHY THIS MATTERS**: The binary prints this error and exits; the user needs the
/// original reason (e.g. which value was invalid).
///
/// **BUG THIS CATCHES**: Would catch the `From<ConfigError>` impl discarding the message.
#[test]
fn given_config_error_when_converted_then_message_preserved() {
    // GIVEN: A config validation error
    let config_err = ConfigError::ValidationError {
        location: ErrorLocation::caller(),
        reason: "buffer_size must be greater than 0".to_string(),
    };

    // WHEN: Converting to the app error
    let err: RelayAppError = config_err.into();

    // THEN: Config variant carrying the reason
    assert!(matches!(err, RelayAppError::Config { .. }));
    assert!(err.to_string().contains("buffer_size must be greater than 0"));
}

/// **VALUE**: Verifies `?` on I/O errors records where the conversion happened.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being removed from the `From`
/// impl, which would make every I/O error point at `error.rs`.
#[test]
fn given_io_error_when_converted_with_question_mark_then_location_is_call_site() {
    // GIVEN: A function that propagates an I/O error with `?`
    fn fails() -> Result<(), RelayAppError> {
        Err::<(), _>(IoError::new(ErrorKind::BrokenPipe, "stdout closed"))?;
        Ok(())
    }

    // WHEN: Calling it
    let err = fails().unwrap_err();

    // THEN: The location points at this test file
    let RelayAppError::Io { location, message } = err else {
        panic!("Expected Io variant");
    };
    assert!(message.contains("stdout closed"));
    assert!(location.file.ends_with("error.rs"));
    assert!(location.file.contains("tests"));
}
