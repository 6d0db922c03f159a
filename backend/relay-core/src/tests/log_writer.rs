// Unit tests for the durable log's row encoding and append behavior
// End-to-end logging through a live server is in integration_tests/server.rs

use crate::error::log::LogError;
use crate::server::{LogRecord, LogWriter, TIMESTAMP_FORMAT};

use std::net::SocketAddr;

use chrono::NaiveDateTime;
use tempfile::TempDir;

fn test_addr() -> SocketAddr {
    "127.0.0.1:50123".parse().unwrap()
}

fn test_timestamp() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-03-05 14:07:09", TIMESTAMP_FORMAT).unwrap()
}

fn read_rows(writer: &LogWriter) -> Vec<LogRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(writer.path())
        .unwrap();
    reader
        .deserialize()
        .collect::<Result<Vec<LogRecord>, _>>()
        .unwrap()
}

/// **VALUE**: Verifies the exact on-disk row layout.
///
/// **WHY THIS MATTERS**: Operators read `server_log.csv` with spreadsheets and scripts
/// that expect `timestamp,address,message` with a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// **BUG THIS CATCHES**: Would catch a changed column order, a header row sneaking in,
/// or a timestamp format change (e.g. RFC 3339 with a `T` separator).
#[test]
fn given_plain_message_when_encoded_then_row_is_timestamp_address_message() {
    // GIVEN: A record for a simple message
    let record = LogRecord::new(test_addr(), "hello", test_timestamp());

    // WHEN: Encoding it as a row
    let row = record.to_row().unwrap();

    // THEN: One CRLF-terminated CSV line with three fields
    assert_eq!(
        String::from_utf8(row).unwrap(),
        "2024-03-05 14:07:09,127.0.0.1:50123,hello\r\n"
    );
}

/// **VALUE**: Verifies embedded delimiters are quoted.
///
/// **WHY THIS MATTERS**: Messages are arbitrary user text. An unquoted comma or newline
/// would split one record into extra columns or extra rows.
///
/// **BUG THIS CATCHES**: Would catch rows being built with `format!` instead of a CSV
/// encoder.
#[test]
fn given_message_with_delimiters_when_encoded_then_field_is_quoted() {
    // GIVEN: A message containing a comma, a quote and a newline
    let record = LogRecord::new(test_addr(), "a,b \"c\"\nd", test_timestamp());

    // WHEN: Encoding it
    let row = String::from_utf8(record.to_row().unwrap()).unwrap();

    // THEN: The message field is quoted with doubled inner quotes
    assert!(
        row.ends_with(",\"a,b \"\"c\"\"\nd\"\r\n"),
        "Unexpected row: {row:?}"
    );
}

/// **VALUE**: Verifies timestamps are stored at second precision.
///
/// **WHY THIS MATTERS**: The persisted format has no fractional seconds; a record
/// holding sub-second precision would not equal the row read back from disk.
///
/// **BUG THIS CATCHES**: Would catch removal of the `trunc_subsecs(0)` in `LogRecord::new`.
#[test]
fn given_subsecond_timestamp_when_record_created_then_truncated_to_seconds() {
    // GIVEN: A timestamp with milliseconds
    let precise =
        NaiveDateTime::parse_from_str("2024-03-05 14:07:09.987", "%Y-%m-%d %H:%M:%S%.3f")
            .unwrap();

    // WHEN: Creating a record
    let record = LogRecord::new(test_addr(), "hello", precise);

    // THEN: Sub-second part is dropped
    assert_eq!(record.timestamp, test_timestamp());
}

/// **VALUE**: Verifies a message survives the write/read cycle byte-for-byte.
///
/// **WHY THIS MATTERS**: The log is the only durable record of what clients sent.
///
/// **BUG THIS CATCHES**: Would catch lossy quoting, trimming, or encoding changes.
#[tokio::test]
async fn given_tricky_message_when_appended_then_reads_back_identically() {
    // GIVEN: A writer over a fresh file
    let temp_dir = TempDir::new().unwrap();
    let writer = LogWriter::new(temp_dir.path().join("server_log.csv"));
    let message = "line one\nline \"two\", with commas, and ünïcödé";

    // WHEN: Appending the message
    let written = writer
        .append(test_addr(), message, test_timestamp())
        .await
        .unwrap();

    // THEN: The single row parses back to the same record
    let rows = read_rows(&writer);
    assert_eq!(rows, vec![written]);
    assert_eq!(rows[0].message, message);
}

/// **VALUE**: Verifies the probe never reaches the store, even if a caller forgets to
/// filter it.
///
/// **WHY THIS MATTERS**: Health checks fire every two seconds per client; logging them
/// would bury real traffic.
///
/// **BUG THIS CATCHES**: Would catch removal of the probe guard in `LogWriter::append`.
#[tokio::test]
async fn given_probe_when_appended_then_rejected_and_nothing_written() {
    // GIVEN: A writer over a fresh file
    let temp_dir = TempDir::new().unwrap();
    let writer = LogWriter::new(temp_dir.path().join("server_log.csv"));

    // WHEN: Appending the probe
    let result = writer.append_now(test_addr(), " ").await;

    // THEN: Rejected with a Probe error and no file was created
    assert!(matches!(result, Err(LogError::Probe { .. })));
    assert!(!writer.path().exists(), "Probe must not create the log file");
}

/// **VALUE**: Verifies existing history is kept when a new writer opens the same file.
///
/// **WHY THIS MATTERS**: A server restart creates a new `LogWriter`; opening in
/// truncate mode would silently destroy every earlier record.
///
/// **BUG THIS CATCHES**: Would catch `.append(true)` being replaced with `.write(true)`.
#[tokio::test]
async fn given_existing_log_when_new_writer_appends_then_history_preserved() {
    // GIVEN: A log file with one record written by a previous writer
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("server_log.csv");
    LogWriter::new(&path)
        .append(test_addr(), "before restart", test_timestamp())
        .await
        .unwrap();

    // WHEN: A new writer appends to the same path
    let writer = LogWriter::new(&path);
    writer
        .append(test_addr(), "after restart", test_timestamp())
        .await
        .unwrap();

    // THEN: Both records are present, oldest first
    let messages: Vec<String> = read_rows(&writer).into_iter().map(|r| r.message).collect();
    assert_eq!(messages, vec!["before restart", "after restart"]);
}

/// **VALUE**: Verifies an unusable store fails the call with an Open error.
///
/// **WHY THIS MATTERS**: Sessions must be able to report and survive a missing log
/// directory instead of panicking.
///
/// **BUG THIS CATCHES**: Would catch an `unwrap()` on the open call.
#[tokio::test]
async fn given_missing_directory_when_appended_then_returns_open_error() {
    // GIVEN: A path inside a directory that does not exist
    let temp_dir = TempDir::new().unwrap();
    let writer = LogWriter::new(temp_dir.path().join("missing").join("server_log.csv"));

    // WHEN: Appending
    let result = writer.append_now(test_addr(), "hello").await;

    // THEN: Open error that names the path
    let err = result.unwrap_err();
    assert!(matches!(err, LogError::Open { .. }));
    assert!(err.to_string().contains("server_log.csv"));
}
