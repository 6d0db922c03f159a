//! Test helpers for relay integration tests.
//!
//! - Starting a server on an ephemeral port with a temporary log file
//! - Raw TCP clients for driving sessions byte by byte
//! - Reading back the CSV log

use relay_core::server::{LogRecord, LogWriter, RelayServerHandle, start_relay_server};

use common::wire::DEFAULT_BUFFER_SIZE;

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A running server plus the temp dir that holds its log.
pub struct TestServer {
    pub handle: RelayServerHandle,
    pub log_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestServer {
    pub fn endpoint(&self) -> String {
        self.handle.local_addr().to_string()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        read_log(&self.log_path)
    }

    /// Signal shutdown and wait for the accept loop to exit.
    pub async fn stop(self) {
        self.handle.shutdown();
        self.handle.wait().await;
    }
}

/// Test helper: Start a relay server on `127.0.0.1:0` logging to a temp file.
pub async fn start_test_server() -> TestServer {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = temp_dir.path().join("server_log.csv");

    let handle = start_relay_server(
        "127.0.0.1:0",
        LogWriter::new(&log_path),
        DEFAULT_BUFFER_SIZE,
    )
    .await
    .expect("Failed to start relay server");

    TestServer {
        handle,
        log_path,
        _temp_dir: temp_dir,
    }
}

/// Test helper: Parse every row of a log file. A missing file means no rows.
pub fn read_log(path: &PathBuf) -> Vec<LogRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open log");
    reader
        .deserialize()
        .collect::<Result<Vec<LogRecord>, _>>()
        .expect("Log contains a malformed row")
}

/// Test helper: Open a raw TCP connection to the server.
pub async fn connect_raw(endpoint: &str) -> TcpStream {
    TcpStream::connect(endpoint)
        .await
        .expect("Failed to connect to relay server")
}

/// Test helper: Write `message` and read one reply.
pub async fn send_raw(stream: &mut TcpStream, message: &str) -> String {
    stream
        .write_all(message.as_bytes())
        .await
        .expect("Failed to send message");

    let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
    let len = stream.read(&mut buffer).await.expect("Failed to read reply");
    String::from_utf8_lossy(&buffer[..len]).into_owned()
}

/// Test helper: True if nothing arrives on `stream` within `wait`.
pub async fn is_silent(stream: &mut TcpStream, wait: Duration) -> bool {
    let mut buffer = [0u8; 64];
    tokio::time::timeout(wait, stream.read(&mut buffer))
        .await
        .is_err()
}

/// Test helper: True if the peer closes `stream` within `wait`.
pub async fn is_closed_by_peer(stream: &mut TcpStream, wait: Duration) -> bool {
    let mut buffer = [0u8; 64];
    match tokio::time::timeout(wait, stream.read(&mut buffer)).await {
        Err(_) => false,
        Ok(Ok(0)) => true,
        Ok(Ok(_)) => false,
        Ok(Err(_)) => true,
    }
}

/// Test helper: Poll `check` until it holds or `wait` elapses.
pub async fn eventually<F: Fn() -> bool>(wait: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + wait;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
