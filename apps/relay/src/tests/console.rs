// Unit tests for console input parsing and event rendering
// Console behavior against a live server is in integration_tests/console.rs

use crate::console::{ConsoleCommand, render_event};

use relay_core::client::ClientEvent;

/// **VALUE**: Verifies commands are recognized and everything else is a message.
///
/// **BUG THIS CATCHES**: Would catch a command being sent to the server as text, or a
/// message that merely starts with a slash being swallowed.
#[test]
fn given_input_lines_when_parsed_then_commands_and_messages_distinguished() {
    // GIVEN / WHEN / THEN
    assert_eq!(ConsoleCommand::parse("/quit"), ConsoleCommand::Quit);
    assert_eq!(ConsoleCommand::parse("  /test  "), ConsoleCommand::Test);
    assert_eq!(ConsoleCommand::parse("/status"), ConsoleCommand::Status);
    assert_eq!(
        ConsoleCommand::parse("/testing things"),
        ConsoleCommand::Send("/testing things".to_string())
    );
    assert_eq!(
        ConsoleCommand::parse("hello"),
        ConsoleCommand::Send("hello".to_string())
    );
}

/// **VALUE**: Verifies transitions carry the status indicator and other events do not.
///
/// **WHY THIS MATTERS**: The console has no colored indicator; the bracketed status is
/// the only way a user sees the connection flip.
///
/// **BUG THIS CATCHES**: Would catch status prefixes missing from transitions or added
/// to ordinary feed lines.
#[test]
fn given_events_when_rendered_then_transitions_prefixed_with_status() {
    // GIVEN / WHEN / THEN
    assert_eq!(
        render_event(&ClientEvent::ConnectionLost),
        "[Disconnected] Connection lost. Server is off."
    );
    assert_eq!(
        render_event(&ClientEvent::Reconnected),
        "[Connected] Reconnected to server."
    );
    assert_eq!(
        render_event(&ClientEvent::NotConnected),
        "Not connected to server."
    );
}
