use relay::console::run_console;

use relay_core::client::RelayClient;
use relay_core::config::ClientConfig;
use relay_core::server::{LogWriter, RelayServerHandle, start_relay_server};

use common::wire::DEFAULT_BUFFER_SIZE;

use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncWriteExt, BufReader, duplex};

async fn start_server(temp_dir: &TempDir) -> RelayServerHandle {
    start_relay_server(
        "127.0.0.1:0",
        LogWriter::new(temp_dir.path().join("server_log.csv")),
        DEFAULT_BUFFER_SIZE,
    )
    .await
    .expect("Failed to start relay server")
}

/// **VALUE**: Verifies a typed line travels to the server and the ack is printed.
///
/// **WHY THIS MATTERS**: This is what a user of the `relay-client` binary sees.
///
/// **BUG THIS CATCHES**: Would catch input lines not being dispatched, or events not
/// being written to the output.
#[tokio::test]
async fn given_console_when_user_types_message_then_ack_printed() {
    // GIVEN: A server, a client and an interactive input pipe
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(&temp_dir).await;
    let (client, mut events) =
        RelayClient::start(server.local_addr().to_string(), &ClientConfig::default());
    let (mut keyboard, input) = duplex(1024);
    let mut output = Vec::new();

    // WHEN: The user types a message, waits, then quits
    let typing = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        keyboard.write_all(b"hello\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        keyboard.write_all(b"/status\n/quit\n").await.unwrap();
    });
    run_console(&client, &mut events, BufReader::new(input), &mut output)
        .await
        .unwrap();
    typing.await.unwrap();

    // THEN: The feed shows the connection, the send, the ack and the status
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("[Connected] Connected to server."), "{printed}");
    assert!(printed.contains("Sending: hello"), "{printed}");
    assert!(printed.contains("Received: Great success!"), "{printed}");
    assert!(printed.contains("Status: Connected"), "{printed}");

    // AND: The console closed the client on exit
    assert!(!client.status().is_connected());
}

/// **VALUE**: Verifies piped input still prints the outcome of its last send.
///
/// **WHY THIS MATTERS**: `echo hello | relay-client` hits end of input immediately after
/// dispatching; the user must still see whether the message was acknowledged.
///
/// **BUG THIS CATCHES**: Would catch the console closing the client as soon as input
/// ends, dropping outcomes that were still in flight.
#[tokio::test]
async fn given_piped_input_when_input_ends_then_pending_ack_still_printed() {
    // GIVEN: A connected client
    let temp_dir = TempDir::new().unwrap();
    let server = start_server(&temp_dir).await;
    let (client, mut events) =
        RelayClient::start(server.local_addr().to_string(), &ClientConfig::default());
    for _ in 0..100 {
        if client.status().is_connected() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(client.status().is_connected());
    let mut output = Vec::new();

    // WHEN: Input holds one line and then ends
    run_console(&client, &mut events, BufReader::new(&b"hello\n"[..]), &mut output)
        .await
        .unwrap();

    // THEN: The ack was printed before exit
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("Sending: hello"), "{printed}");
    assert!(printed.contains("Received: Great success!"), "{printed}");
}
