use crate::helpers::start_test_server;

use relay_core::client::{
    ClientEvent, ConnectionHandle, ConnectionManager, ConnectionStatus, HealthMonitor,
};

use common::wire::DEFAULT_BUFFER_SIZE;

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

const TEST_INTERVAL: Duration = Duration::from_millis(50);

fn monitor_for(
    endpoint: &str,
) -> (
    HealthMonitor,
    ConnectionHandle,
    mpsc::UnboundedReceiver<ClientEvent>,
) {
    let connection =
        ConnectionHandle::spawn(ConnectionManager::new(endpoint, DEFAULT_BUFFER_SIZE));
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let monitor = HealthMonitor::new(connection.clone(), TEST_INTERVAL, events_tx);
    (monitor, connection, events_rx)
}

fn drain(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// **VALUE**: Verifies a disconnected client reconnects on the next tick.
///
/// **WHY THIS MATTERS**: Automatic reconnection is the reason the health monitor exists.
///
/// **BUG THIS CATCHES**: Would catch the monitor probing instead of connecting when
/// disconnected, or emitting more than one event for a single reconnect.
#[tokio::test]
async fn given_disconnected_and_server_reachable_when_tick_then_reconnected_once() {
    // GIVEN: A running server and a monitor that has never connected
    let server = start_test_server().await;
    let (monitor, connection, mut events) = monitor_for(&server.endpoint());

    // WHEN: One tick runs
    let emitted = monitor.tick().await;

    // THEN: Connected, and exactly one Reconnected event
    assert_eq!(emitted, Some(ClientEvent::Reconnected));
    assert_eq!(connection.status(), ConnectionStatus::Connected);
    assert_eq!(drain(&mut events), vec![ClientEvent::Reconnected]);
}

/// **VALUE**: Verifies failed reconnect attempts are silent.
///
/// **WHY THIS MATTERS**: While the server is down the monitor retries every tick; an
/// event per attempt would flood the UI feed.
///
/// **BUG THIS CATCHES**: Would catch a "connection failed" event emitted on every tick.
#[tokio::test]
async fn given_disconnected_and_server_unreachable_when_ticking_then_no_events() {
    // GIVEN: A monitor pointing at a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    drop(listener);
    let (monitor, connection, mut events) = monitor_for(&endpoint);

    // WHEN: Several ticks run
    for _ in 0..3 {
        assert_eq!(monitor.tick().await, None);
    }

    // THEN: Still disconnected and nothing was emitted
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);
    assert!(drain(&mut events).is_empty());
}

/// **VALUE**: Verifies a lost connection is reported exactly once.
///
/// **WHY THIS MATTERS**: The UI should say "Connection lost" once when the server stops,
/// not once per tick for as long as it stays down.
///
/// **BUG THIS CATCHES**: Would catch:
/// - A probe that cannot notice a closed peer (no event at all)
/// - Repeated ConnectionLost events while the server remains down
#[tokio::test]
async fn given_connected_when_server_stops_then_connection_lost_emitted_once() {
    // GIVEN: A connected monitor
    let server = start_test_server().await;
    let (monitor, connection, mut events) = monitor_for(&server.endpoint());
    assert_eq!(monitor.tick().await, Some(ClientEvent::Reconnected));
    drain(&mut events);

    // WHEN: The server stops and several ticks run
    server.stop().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    for _ in 0..4 {
        monitor.tick().await;
    }

    // THEN: Exactly one ConnectionLost, and the client is disconnected
    assert_eq!(drain(&mut events), vec![ClientEvent::ConnectionLost]);
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);
}

/// **VALUE**: Verifies healthy ticks are silent and keep the connection.
///
/// **BUG THIS CATCHES**: Would catch a probe that wrongly reads its own silence as a
/// failure, or an event emitted for a steady state.
#[tokio::test]
async fn given_connected_and_server_healthy_when_ticking_then_no_events() {
    // GIVEN: A connected monitor
    let server = start_test_server().await;
    let (monitor, connection, mut events) = monitor_for(&server.endpoint());
    monitor.tick().await;
    drain(&mut events);

    // WHEN: Several ticks run
    for _ in 0..3 {
        assert_eq!(monitor.tick().await, None);
    }

    // THEN: Still connected, no events, nothing logged
    assert!(connection.is_connected());
    assert!(drain(&mut events).is_empty());
    assert!(server.records().is_empty());
}

/// **VALUE**: Verifies `run()` drives ticks on its own and stops with its receiver.
///
/// **BUG THIS CATCHES**: Would catch a run loop that never ticks, or one that keeps
/// running after the UI has gone away.
#[tokio::test]
async fn given_running_monitor_when_interval_elapses_then_reconnects_and_stops_with_receiver() {
    // GIVEN: A server and a monitor task
    let server = start_test_server().await;
    let (monitor, connection, mut events) = monitor_for(&server.endpoint());
    let task = tokio::spawn(monitor.run());

    // WHEN: Waiting for the first event
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("Monitor never ticked");

    // THEN: It reconnected
    assert_eq!(event, Some(ClientEvent::Reconnected));
    assert!(connection.is_connected());

    // AND: Dropping the receiver stops the task
    drop(events);
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("Monitor did not stop")
        .unwrap();
}
