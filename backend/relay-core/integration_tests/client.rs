use crate::helpers::start_test_server;

use relay_core::client::{ConnectionHandle, ConnectionManager, ConnectionStatus};
use relay_core::error::connection::ConnectionError;

use common::wire::{ACK_MESSAGE, DEFAULT_BUFFER_SIZE};

use std::time::Duration;

fn spawn_handle(endpoint: &str) -> ConnectionHandle {
    ConnectionHandle::spawn(ConnectionManager::new(endpoint, DEFAULT_BUFFER_SIZE))
}

/// **VALUE**: Verifies the basic connect/send cycle against a live server.
///
/// **WHY THIS MATTERS**: This is the user-visible happy path: connect, type, get the ack.
///
/// **BUG THIS CATCHES**: Would catch the status not reaching `Connected`, or the reply
/// being read with the wrong buffer/decoding.
#[tokio::test]
async fn given_running_server_when_connect_and_send_then_connected_and_acknowledged() {
    // GIVEN: A running server and a connection handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);

    // WHEN: Connecting and sending
    connection.connect().await.unwrap();
    let response = connection.send_message("hello").await;

    // THEN: Connected and acknowledged
    assert_eq!(connection.status(), ConnectionStatus::Connected);
    assert_eq!(response.unwrap(), ACK_MESSAGE);
}

/// **VALUE**: Verifies an I/O failure flips the status to Disconnected.
///
/// **WHY THIS MATTERS**: The health monitor decides between probing and reconnecting
/// from this status; a stale `Connected` would keep it probing a dead socket forever.
///
/// **BUG THIS CATCHES**: Would catch a failed send leaving the stream and status in place.
#[tokio::test]
async fn given_server_stopped_when_sending_then_io_failure_and_disconnected() {
    // GIVEN: A connected handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    connection.connect().await.unwrap();

    // WHEN: The server goes away and the client sends
    server.stop().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let result = connection.send_message("anyone there?").await;

    // THEN: An I/O failure and a Disconnected status
    let err = result.unwrap_err();
    assert!(err.is_io_failure(), "Expected I/O failure, got {err}");
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);
}

/// **VALUE**: Verifies `close()` is idempotent and later sends are refused locally.
///
/// **WHY THIS MATTERS**: UI shutdown paths may close more than once.
///
/// **BUG THIS CATCHES**: Would catch a second close panicking, or a closed connection
/// still accepting sends.
#[tokio::test]
async fn given_connected_handle_when_closed_twice_then_disconnected_and_sends_refused() {
    // GIVEN: A connected handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    connection.connect().await.unwrap();

    // WHEN: Closing twice
    connection.close().await;
    connection.close().await;

    // THEN: Disconnected, and a send is refused without I/O
    assert_eq!(connection.status(), ConnectionStatus::Disconnected);
    let err = connection.send_message("late").await.unwrap_err();
    assert!(matches!(err, ConnectionError::NotConnected { .. }));
    assert!(server.records().is_empty());
}

/// **VALUE**: Verifies a probe on a healthy connection succeeds and is not logged.
///
/// **BUG THIS CATCHES**: Would catch a probe that waits for a reply (hangs forever) or a
/// probe that the server logs.
#[tokio::test]
async fn given_healthy_connection_when_probed_then_ok_and_not_logged() {
    // GIVEN: A connected handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    connection.connect().await.unwrap();

    // WHEN: Probing
    let result = tokio::time::timeout(Duration::from_secs(2), connection.probe()).await;

    // THEN: Completes successfully and the connection stays up
    assert!(result.expect("Probe must not block").is_ok());
    assert!(connection.is_connected());

    // AND: A following message still gets exactly its own ack
    assert_eq!(connection.send_message("real").await.unwrap(), ACK_MESSAGE);
    let messages: Vec<String> = server.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["real"]);
}

/// **VALUE**: Verifies probes and sends from many tasks never interleave on the socket.
///
/// **WHY THIS MATTERS**: The UI sends from spawned tasks while the health monitor probes
/// on a timer. If a probe slipped between a send and its read, bytes could merge and
/// replies could be consumed by the wrong caller.
///
/// **BUG THIS CATCHES**: Would catch the connection actor being bypassed, e.g. a shared
/// stream used directly from several tasks.
#[tokio::test]
async fn given_concurrent_sends_and_probes_when_dispatched_then_each_send_gets_its_ack() {
    // GIVEN: A connected handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    connection.connect().await.unwrap();

    // WHEN: Sends race from many tasks against a timer-driven health check
    let prober = connection.clone();
    let health = tokio::spawn(async move {
        for _ in 0..20 {
            prober.probe().await?;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok::<(), ConnectionError>(())
    });
    let mut sends = Vec::new();
    for i in 0..20 {
        let sender = connection.clone();
        sends.push(tokio::spawn(async move {
            sender.send_message(format!("msg-{i}")).await
        }));
    }

    // THEN: Every send got exactly the ack
    for send in sends {
        assert_eq!(send.await.unwrap().unwrap(), ACK_MESSAGE);
    }
    assert!(health.await.unwrap().is_ok());

    // AND: Exactly twenty rows; probe traffic never became a row of its own
    // (a probe may still share a read with the message right behind it)
    let records = server.records();
    assert_eq!(records.len(), 20);
    assert!(records.iter().all(|r| r.message.trim_start().starts_with("msg-")));
}

/// **VALUE**: Verifies a whitespace message is answered and does not stall the queue.
///
/// **WHY THIS MATTERS**: Every socket operation shares one command queue. A send that
/// never gets its ack blocks every later send and every health check behind it.
///
/// **BUG THIS CATCHES**: Would catch the server treating several spaces as the
/// single-space health check and staying silent.
#[tokio::test]
async fn given_whitespace_message_when_sent_then_acked_and_next_send_proceeds() {
    // GIVEN: A connected handle
    let server = start_test_server().await;
    let connection = spawn_handle(&server.endpoint());
    connection.connect().await.unwrap();

    // WHEN: Sending two spaces, then a normal message
    let spaces = tokio::time::timeout(Duration::from_secs(2), connection.send_message("  ")).await;
    let hello = tokio::time::timeout(Duration::from_secs(2), connection.send_message("hello")).await;

    // THEN: Both acknowledged in order
    assert_eq!(spaces.expect("Whitespace send hung").unwrap(), ACK_MESSAGE);
    assert_eq!(hello.expect("Queue stalled").unwrap(), ACK_MESSAGE);
    let messages: Vec<String> = server.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["  ", "hello"]);
}
