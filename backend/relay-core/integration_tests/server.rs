use crate::helpers::{
    connect_raw, is_closed_by_peer, is_silent, send_raw, start_test_server,
};

use relay_core::error::server::ServerError;
use relay_core::server::{LogWriter, start_relay_server};

use common::wire::{ACK_MESSAGE, DEFAULT_BUFFER_SIZE, PROBE};

use std::collections::BTreeSet;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// **VALUE**: Verifies each application message gets exactly one acknowledgment and
/// one log row.
///
/// **WHY THIS MATTERS**: The client pairs every send with one blocking read; a missing
/// ack hangs the client, an extra ack desynchronizes every later reply.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The ack being sent only for the first message
/// - The log append being skipped or duplicated
/// - The remote address column holding something other than the peer address
#[tokio::test]
async fn given_connected_client_when_sending_messages_then_one_ack_and_row_each() {
    // GIVEN: A running server and a raw client
    let server = start_test_server().await;
    let mut stream = connect_raw(&server.endpoint()).await;
    let client_addr = stream.local_addr().unwrap().to_string();

    // WHEN: Sending three messages one after another
    let mut replies = Vec::new();
    for message in ["first", "second", "third"] {
        replies.push(send_raw(&mut stream, message).await);
    }

    // THEN: Three acks
    assert_eq!(replies, vec![ACK_MESSAGE; 3]);

    // AND: Three rows in order, attributed to this client
    let records = server.records();
    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
    assert!(records.iter().all(|r| r.remote_address == client_addr));
}

/// **VALUE**: Verifies the probe is neither logged nor answered.
///
/// **WHY THIS MATTERS**: The client never reads after a probe; an ack would sit in its
/// socket buffer and be mistaken for the reply to the next real message.
///
/// **BUG THIS CATCHES**: Would catch the probe filter being removed from the session loop.
#[tokio::test]
async fn given_connected_client_when_sending_probe_then_no_reply_and_no_row() {
    // GIVEN: A running server and a raw client
    let server = start_test_server().await;
    let mut stream = connect_raw(&server.endpoint()).await;

    // WHEN: Sending the probe
    stream.write_all(PROBE.as_bytes()).await.unwrap();

    // THEN: Nothing comes back
    assert!(
        is_silent(&mut stream, Duration::from_millis(200)).await,
        "Probe must not be acknowledged"
    );

    // AND: The session is still alive for real traffic
    assert_eq!(send_raw(&mut stream, "after probe").await, ACK_MESSAGE);

    // AND: Only the real message was logged
    let messages: Vec<String> = server.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["after probe"]);
}

/// **VALUE**: Verifies concurrent sessions produce exactly one complete row each.
///
/// **WHY THIS MATTERS**: Sessions run in parallel tasks and share one file. Without the
/// store lock, rows from different clients could interleave mid-line.
///
/// **BUG THIS CATCHES**: Would catch:
/// - Removal of the LogWriter lock
/// - Rows written in several `write` calls
/// - Lost rows under contention
#[tokio::test]
async fn given_many_concurrent_clients_when_each_sends_then_every_row_well_formed() {
    // GIVEN: A running server
    let server = start_test_server().await;
    let endpoint = server.endpoint();
    let client_count = 25;

    // WHEN: Many clients send one message each at the same time
    let mut tasks = Vec::new();
    for i in 0..client_count {
        let endpoint = endpoint.clone();
        tasks.push(tokio::spawn(async move {
            let mut stream = connect_raw(&endpoint).await;
            send_raw(&mut stream, &format!("message, number \"{i}\"")).await
        }));
    }

    let mut replies = Vec::new();
    for task in tasks {
        replies.push(task.await.unwrap());
    }

    // THEN: Every client got its ack
    assert!(replies.iter().all(|r| r == ACK_MESSAGE));

    // AND: Exactly one well-formed row per client, in any order
    let logged: BTreeSet<String> = server.records().into_iter().map(|r| r.message).collect();
    let expected: BTreeSet<String> = (0..client_count)
        .map(|i| format!("message, number \"{i}\""))
        .collect();
    assert_eq!(logged, expected);
}

/// **VALUE**: Verifies a graceful client close ends the session.
///
/// **WHY THIS MATTERS**: A zero-byte read is the only signal a peer has left; missing it
/// leaks one task and one socket per disconnected client.
///
/// **BUG THIS CATCHES**: Would catch a loop that spins on `Ok(0)` instead of returning.
#[tokio::test]
async fn given_client_closes_write_half_when_session_reads_eof_then_server_closes() {
    // GIVEN: A connected client
    let server = start_test_server().await;
    let mut stream = connect_raw(&server.endpoint()).await;

    // WHEN: The client shuts down its write half
    stream.shutdown().await.unwrap();

    // THEN: The server closes its side too
    assert!(is_closed_by_peer(&mut stream, Duration::from_secs(2)).await);
    assert!(server.records().is_empty());
}

/// **VALUE**: Verifies a broken log store does not break messaging.
///
/// **WHY THIS MATTERS**: A full disk or deleted log directory must cost log rows, not
/// client connectivity.
///
/// **BUG THIS CATCHES**: Would catch a LogError propagated with `?` out of the session loop.
#[tokio::test]
async fn given_unwritable_log_when_message_received_then_still_acknowledged() {
    // GIVEN: A server whose log path is inside a missing directory
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("missing").join("server_log.csv");
    let handle = start_relay_server("127.0.0.1:0", LogWriter::new(&log_path), DEFAULT_BUFFER_SIZE)
        .await
        .unwrap();
    let mut stream = connect_raw(&handle.local_addr().to_string()).await;

    // WHEN: Sending two messages
    let first = send_raw(&mut stream, "one").await;
    let second = send_raw(&mut stream, "two").await;

    // THEN: Both acknowledged on the same session, nothing persisted
    assert_eq!(first, ACK_MESSAGE);
    assert_eq!(second, ACK_MESSAGE);
    assert!(!log_path.exists());
}

/// **VALUE**: Verifies shutdown closes live sessions and stops accepting.
///
/// **WHY THIS MATTERS**: Ctrl-C on the server must actually disconnect clients so their
/// health monitors notice and report the outage.
///
/// **BUG THIS CATCHES**: Would catch sessions ignoring the shutdown signal, leaving
/// clients attached to a server that no longer accepts.
#[tokio::test]
async fn given_live_session_when_server_shut_down_then_client_sees_close() {
    // GIVEN: A connected client
    let server = start_test_server().await;
    let endpoint = server.endpoint();
    let mut stream = connect_raw(&endpoint).await;
    assert_eq!(send_raw(&mut stream, "hello").await, ACK_MESSAGE);

    // WHEN: Shutting the server down and waiting for the accept loop
    server.stop().await;

    // THEN: The existing session is closed
    assert!(is_closed_by_peer(&mut stream, Duration::from_secs(2)).await);

    // AND: New connections are refused
    assert!(TcpStream::connect(&endpoint).await.is_err());
}

/// **VALUE**: Verifies bind failure is reported as a Bind error.
///
/// **WHY THIS MATTERS**: This is the one fatal server error; the binary must be able to
/// recognize it and exit with a clear message.
///
/// **BUG THIS CATCHES**: Would catch a panic on bind or an error of the wrong kind.
#[tokio::test]
async fn given_port_in_use_when_starting_server_then_returns_bind_error() {
    // GIVEN: A server already bound to a port
    let server = start_test_server().await;

    // WHEN: Starting a second server on the same address
    let result = start_relay_server(
        &server.endpoint(),
        LogWriter::new(&server.log_path),
        DEFAULT_BUFFER_SIZE,
    )
    .await;

    // THEN: Bind error
    assert!(matches!(result, Err(ServerError::Bind { .. })));
}

/// **VALUE**: Verifies only the single-space health check is filtered; a run of spaces
/// is a message like any other.
///
/// **WHY THIS MATTERS**: A raw client may send whitespace. If the server stayed silent,
/// the sender would block forever on its read.
///
/// **BUG THIS CATCHES**: Would catch the health-check filter being widened to "all spaces",
/// which swallows the message and leaves the sender waiting for an ack.
#[tokio::test]
async fn given_connected_client_when_sending_two_spaces_then_acked_and_logged() {
    // GIVEN: A running server and a raw client
    let server = start_test_server().await;
    let mut stream = connect_raw(&server.endpoint()).await;

    // WHEN: Sending two spaces
    let reply = tokio::time::timeout(Duration::from_secs(2), send_raw(&mut stream, "  ")).await;

    // THEN: Acknowledged
    assert_eq!(reply.expect("Two spaces must be acknowledged"), ACK_MESSAGE);

    // AND: Logged verbatim
    let messages: Vec<String> = server.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["  "]);
}

/// **VALUE**: Verifies a connection reset ends only that session.
///
/// **WHY THIS MATTERS**: Clients crash and networks drop. A read error on one session
/// must never stop the listener from serving everyone else.
///
/// **BUG THIS CATCHES**: Would catch a session error propagating into the accept loop,
/// e.g. a `?` on the session result or a panic on `ServerError::Read`.
#[tokio::test]
async fn given_client_reset_when_new_client_connects_then_still_served() {
    // GIVEN: A client whose close will send a reset instead of a FIN
    let server = start_test_server().await;
    let endpoint = server.endpoint();
    let mut doomed = connect_raw(&endpoint).await;
    assert_eq!(send_raw(&mut doomed, "before reset").await, ACK_MESSAGE);
    #[allow(deprecated)]
    doomed.set_linger(Some(Duration::ZERO)).unwrap();

    // WHEN: Dropping it and giving the session time to see the reset
    drop(doomed);
    tokio::time::sleep(Duration::from_millis(100)).await;

    // THEN: A fresh client connects and is acknowledged
    let mut fresh = connect_raw(&endpoint).await;
    let reply = tokio::time::timeout(Duration::from_secs(2), send_raw(&mut fresh, "after reset")).await;
    assert_eq!(reply.expect("Listener stopped serving"), ACK_MESSAGE);

    // AND: Both messages were logged
    let messages: Vec<String> = server.records().into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["before reset", "after reset"]);
}
