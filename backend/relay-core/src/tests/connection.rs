// Unit tests for ConnectionManager behavior that needs no live server
// Behavior against a live server is in integration_tests/client.rs

use crate::client::{ConnectionManager, ConnectionStatus};
use crate::error::connection::ConnectionError;

use tokio::net::TcpListener;

/// Address of a port that was just released, so nothing is listening on it.
async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// **VALUE**: Verifies a new manager starts disconnected.
///
/// **BUG THIS CATCHES**: Would catch a default status of `Connected` that would make the
/// health monitor probe a stream that does not exist.
#[test]
fn given_new_manager_when_created_then_status_is_disconnected() {
    // GIVEN / WHEN: A fresh manager
    let manager = ConnectionManager::new("127.0.0.1:1", 1024);

    // THEN: Disconnected
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

/// **VALUE**: Verifies sends are refused locally when disconnected.
///
/// **WHY THIS MATTERS**: A send while disconnected must produce "Not connected" without
/// touching the network.
///
/// **BUG THIS CATCHES**: Would catch the refusal being classified as an I/O failure,
/// which would make the UI report a spurious lost connection.
#[tokio::test]
async fn given_disconnected_when_send_message_then_refused_as_not_connected() {
    // GIVEN: A manager that never connected
    let mut manager = ConnectionManager::new("127.0.0.1:1", 1024);

    // WHEN: Sending
    let result = manager.send_message("hello").await;

    // THEN: NotConnected, which is not an I/O failure
    let err = result.unwrap_err();
    assert!(matches!(err, ConnectionError::NotConnected { .. }));
    assert!(!err.is_io_failure());
}

/// **VALUE**: Verifies a failed connect is a returned value, not a panic.
///
/// **WHY THIS MATTERS**: The health monitor retries connect every tick while the server
/// is down.
///
/// **BUG THIS CATCHES**: Would catch the status being left at `Connecting`.
#[tokio::test]
async fn given_unreachable_endpoint_when_connect_then_fails_and_stays_disconnected() {
    // GIVEN: A manager pointing at a closed port
    let mut manager = ConnectionManager::new(unreachable_endpoint().await, 1024);

    // WHEN: Connecting
    let result = manager.connect().await;

    // THEN: Connect error and Disconnected status
    assert!(matches!(result, Err(ConnectionError::Connect { .. })));
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

/// **VALUE**: Verifies `close()` can be called repeatedly.
///
/// **BUG THIS CATCHES**: Would catch a close that panics or errors on an absent stream.
#[tokio::test]
async fn given_disconnected_manager_when_closed_twice_then_stays_disconnected() {
    // GIVEN: A manager that never connected
    let mut manager = ConnectionManager::new("127.0.0.1:1", 1024);

    // WHEN: Closing twice
    manager.close().await;
    manager.close().await;

    // THEN: Still Disconnected
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}
