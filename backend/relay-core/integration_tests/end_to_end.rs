use crate::helpers::{eventually, start_test_server};

use relay_core::client::{ClientEvent, ConnectionStatus, RelayClient};
use relay_core::config::ClientConfig;

use common::wire::{ACK_MESSAGE, TEST_MESSAGE};

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

fn fast_config() -> ClientConfig {
    ClientConfig {
        health_check_interval_ms: 50,
        ..ClientConfig::default()
    }
}

async fn next_event(events: &mut UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("Timed out waiting for client event")
        .expect("Event channel closed")
}

/// Collect every event that arrives within `window`.
async fn events_within(
    events: &mut UnboundedReceiver<ClientEvent>,
    window: Duration,
) -> Vec<ClientEvent> {
    let mut collected = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(event)) = tokio::time::timeout_at(deadline, events.recv()).await {
        collected.push(event);
    }
    collected
}

/// **VALUE**: Sending "hello" while connected is logged and acknowledged.
///
/// **WHY THIS MATTERS**: This is the whole product in one scenario.
///
/// **BUG THIS CATCHES**: Would catch a break anywhere along UI send → connection actor →
/// session → log writer → ack → UI event.
#[tokio::test]
async fn given_connected_client_when_sending_hello_then_logged_and_acknowledged() {
    // GIVEN: A server and a started client
    let server = start_test_server().await;
    let (client, mut events) = RelayClient::start(server.endpoint(), &fast_config());
    assert_eq!(next_event(&mut events).await, ClientEvent::Connected);

    // WHEN: The user sends "hello"
    assert!(client.send("hello"));

    // THEN: The feed shows the send and the ack
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Sending {
            message: "hello".to_string()
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Received {
            response: ACK_MESSAGE.to_string()
        }
    );

    // AND: The server logged (timestamp, client address, "hello")
    let records = server.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "hello");
    assert!(records[0].remote_address.starts_with("127.0.0.1:"));

    client.close().await;
}

/// **VALUE**: Stopping the server produces exactly one "connection lost" event.
///
/// **WHY THIS MATTERS**: The UI's status indicator must turn red once and stay red
/// quietly while the monitor keeps retrying in the background.
///
/// **BUG THIS CATCHES**: Would catch a ConnectionLost repeated on every tick, or a
/// health monitor that never notices the outage.
#[tokio::test]
async fn given_connected_client_when_server_stops_then_connection_lost_reported_once() {
    // GIVEN: A connected client
    let server = start_test_server().await;
    let (client, mut events) = RelayClient::start(server.endpoint(), &fast_config());
    assert_eq!(next_event(&mut events).await, ClientEvent::Connected);

    // WHEN: The server stops and many health ticks elapse
    server.stop().await;
    let observed = events_within(&mut events, Duration::from_millis(800)).await;

    // THEN: Exactly one ConnectionLost and nothing else
    assert_eq!(observed, vec![ClientEvent::ConnectionLost]);
    assert_eq!(client.status(), ConnectionStatus::Disconnected);
}

/// **VALUE**: A send while disconnected is refused locally.
///
/// **WHY THIS MATTERS**: The user must get an explicit "Not connected" instead of a
/// silently dropped message.
///
/// **BUG THIS CATCHES**: Would catch the refusal being reported as a lost connection, or
/// no outcome being reported at all.
#[tokio::test]
async fn given_disconnected_client_when_sending_then_not_connected_reported() {
    // GIVEN: A client whose server does not exist
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    drop(listener);
    let (client, mut events) = RelayClient::start(endpoint, &fast_config());
    assert_eq!(next_event(&mut events).await, ClientEvent::ConnectFailed);

    // WHEN: The user sends a message
    assert!(client.send("hi"));

    // THEN: Sending, then NotConnected, and no connection events
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Sending {
            message: "hi".to_string()
        }
    );
    assert_eq!(next_event(&mut events).await, ClientEvent::NotConnected);
    assert!(
        events_within(&mut events, Duration::from_millis(200))
            .await
            .is_empty()
    );
}

/// **VALUE**: Blank input is not sent.
///
/// **BUG THIS CATCHES**: Would catch whitespace-only input reaching the wire and ending
/// up as a blank row in the server log.
#[tokio::test]
async fn given_blank_input_when_sending_then_ignored() {
    // GIVEN: A connected client
    let server = start_test_server().await;
    let (client, mut events) = RelayClient::start(server.endpoint(), &fast_config());
    assert_eq!(next_event(&mut events).await, ClientEvent::Connected);

    // WHEN: Sending blank input
    let dispatched = client.send("   ");

    // THEN: Not dispatched, no events
    assert!(!dispatched);
    assert!(
        events_within(&mut events, Duration::from_millis(200))
            .await
            .is_empty()
    );
}

/// **VALUE**: The test operation sends the fixed test message.
///
/// **BUG THIS CATCHES**: Would catch the test message being announced but never sent.
#[tokio::test]
async fn given_connected_client_when_send_test_then_test_message_acknowledged() {
    // GIVEN: A connected client
    let server = start_test_server().await;
    let (client, mut events) = RelayClient::start(server.endpoint(), &fast_config());
    assert_eq!(next_event(&mut events).await, ClientEvent::Connected);

    // WHEN: Triggering the test send
    client.send_test();

    // THEN: Announced, acknowledged and logged
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::SendingTest {
            message: TEST_MESSAGE.to_string()
        }
    );
    assert_eq!(
        next_event(&mut events).await,
        ClientEvent::Received {
            response: ACK_MESSAGE.to_string()
        }
    );
    assert!(
        eventually(Duration::from_secs(1), || server.records().len() == 1).await,
        "Test message should be logged"
    );
    assert_eq!(server.records()[0].message, TEST_MESSAGE);
}
