use relay_core::error::CoreError;
use relay_core::error::connection::ConnectionError;
use relay_core::error::log::LogError;
use relay_core::error::server::ServerError;

use common::ErrorLocation;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;
use std::path::PathBuf;

/// **VALUE**: Verifies server errors carry their source location.
///
/// **WHY THIS MATTERS**: Session errors are only ever seen in log lines. Without the
/// location, "Read Error: connection reset" gives no hint which read failed.
///
/// **BUG THIS CATCHES**: Would catch the location being dropped from the Display format.
#[test]
#[track_caller]
fn given_server_read_error_when_formatted_then_includes_location() {
    // GIVEN: A Read error with location
    let err = ServerError::Read {
        message: "Error reading from 127.0.0.1:5000: reset".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Formatting the error
    let error_string = err.to_string();

    // THEN: Kind, message and file location are present
    assert!(error_string.contains("Read Error"));
    assert!(error_string.contains("127.0.0.1:5000"));
    assert!(error_string.contains("error.rs"));
}

/// **VALUE**: Verifies bind errors keep the underlying I/O error as their source.
///
/// **WHY THIS MATTERS**: "Address in use" vs "permission denied" need different fixes.
///
/// **BUG THIS CATCHES**: Would catch `#[source]` being removed from `ServerError::Bind`.
#[test]
fn given_bind_error_when_source_queried_then_returns_io_error() {
    // GIVEN: A Bind error wrapping an I/O error
    let err = ServerError::Bind {
        message: "Failed to bind 127.0.0.1:8080".to_string(),
        location: ErrorLocation::caller(),
        source: IoError::new(ErrorKind::AddrInUse, "address in use"),
    };

    // WHEN: Walking the source chain
    let source = err.source();

    // THEN: The I/O error is reachable
    assert!(source.is_some());
    assert!(source.unwrap().to_string().contains("address in use"));
}

/// **VALUE**: Verifies which connection errors count as socket failures.
///
/// **WHY THIS MATTERS**: Only socket failures may produce a "connection lost" event;
/// local refusals must not.
///
/// **BUG THIS CATCHES**: Would catch `NotConnected` or `ActorStopped` being classified as
/// I/O failures, or `Closed` not being classified as one.
#[test]
fn given_connection_errors_when_classified_then_only_socket_failures_are_io() {
    // GIVEN: One error of each kind
    let location = ErrorLocation::caller();
    let message = String::from("test");
    let io_errors = [
        ConnectionError::Connect {
            message: message.clone(),
            location,
        },
        ConnectionError::Send {
            message: message.clone(),
            location,
        },
        ConnectionError::Read {
            message: message.clone(),
            location,
        },
        ConnectionError::Closed {
            message: message.clone(),
            location,
        },
    ];
    let local_errors = [
        ConnectionError::NotConnected {
            message: message.clone(),
            location,
        },
        ConnectionError::ActorStopped { message, location },
    ];

    // WHEN / THEN: Classification matches
    assert!(io_errors.iter().all(ConnectionError::is_io_failure));
    assert!(!local_errors.iter().any(ConnectionError::is_io_failure));
}

/// **VALUE**: Verifies module errors convert into `CoreError` transparently.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[from]`, or `CoreError` adding its own
/// prefix and hiding the original message.
#[test]
fn given_log_error_when_converted_to_core_error_then_message_preserved() {
    // GIVEN: A LogError
    let log_err = LogError::Write {
        location: ErrorLocation::caller(),
        path: PathBuf::from("server_log.csv"),
        source: IoError::new(ErrorKind::StorageFull, "disk full"),
    };
    let expected = log_err.to_string();

    // WHEN: Converting
    let core_err: CoreError = log_err.into();

    // THEN: Same rendering
    assert_eq!(core_err.to_string(), expected);
    assert!(expected.contains("disk full"));
}
