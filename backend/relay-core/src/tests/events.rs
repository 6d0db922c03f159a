// Unit tests for the UI-facing event vocabulary

use crate::client::{ClientEvent, ConnectionStatus};

/// **VALUE**: Verifies the console lines shown to users.
///
/// **WHY THIS MATTERS**: Users diagnose connection problems from these lines; "No
/// response or error occurred." in particular is the only signal a send was lost.
///
/// **BUG THIS CATCHES**: Would catch an event rendering as a Debug dump or losing its
/// payload.
#[test]
fn given_events_when_displayed_then_render_console_lines() {
    // GIVEN / WHEN / THEN: Each event renders its console line
    assert_eq!(ClientEvent::Connected.to_string(), "Connected to server.");
    assert_eq!(
        ClientEvent::ConnectFailed.to_string(),
        "Failed to connect to server."
    );
    assert_eq!(ClientEvent::Reconnected.to_string(), "Reconnected to server.");
    assert_eq!(
        ClientEvent::ConnectionLost.to_string(),
        "Connection lost. Server is off."
    );
    assert_eq!(
        ClientEvent::Sending {
            message: "hi".to_string()
        }
        .to_string(),
        "Sending: hi"
    );
    assert_eq!(
        ClientEvent::Received {
            response: "Great success!".to_string()
        }
        .to_string(),
        "Received: Great success!"
    );
    assert_eq!(
        ClientEvent::NoResponse.to_string(),
        "No response or error occurred."
    );
    assert_eq!(
        ClientEvent::NotConnected.to_string(),
        "Not connected to server."
    );
}

/// **VALUE**: Verifies which events move the status indicator.
///
/// **WHY THIS MATTERS**: The UI paints its indicator from `status()`; a send outcome
/// must not flip it, a lost connection must.
///
/// **BUG THIS CATCHES**: Would catch a transition event mapped to the wrong status.
#[test]
fn given_events_when_status_queried_then_only_transitions_report_status() {
    // GIVEN / WHEN / THEN
    assert_eq!(
        ClientEvent::Connected.status(),
        Some(ConnectionStatus::Connected)
    );
    assert_eq!(
        ClientEvent::Reconnected.status(),
        Some(ConnectionStatus::Connected)
    );
    assert_eq!(
        ClientEvent::ConnectionLost.status(),
        Some(ConnectionStatus::Disconnected)
    );
    assert_eq!(
        ClientEvent::ConnectFailed.status(),
        Some(ConnectionStatus::Disconnected)
    );
    assert_eq!(ClientEvent::NoResponse.status(), None);
    assert_eq!(ClientEvent::NotConnected.status(), None);
}

/// **VALUE**: Verifies which events settle a dispatched send.
///
/// **WHY THIS MATTERS**: The console waits for one of these per send before exiting;
/// missing one means waiting until timeout, counting an extra one drops a later outcome.
///
/// **BUG THIS CATCHES**: Would catch `ConnectionLost` being counted as a send outcome
/// (it follows `NoResponse` for the same send).
#[test]
fn given_events_when_checked_for_send_outcome_then_only_settling_events_match() {
    // GIVEN / WHEN / THEN
    assert!(ClientEvent::Received { response: "ok".to_string() }.is_send_outcome());
    assert!(ClientEvent::NoResponse.is_send_outcome());
    assert!(ClientEvent::NotConnected.is_send_outcome());
    assert!(!ClientEvent::ConnectionLost.is_send_outcome());
    assert!(!ClientEvent::Sending { message: "hi".to_string() }.is_send_outcome());
    assert!(!ClientEvent::Connected.is_send_outcome());
}
