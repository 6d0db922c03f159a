//! Durable, append-only record of every application message the server receives.
//!
//! Rows are CSV without a header: `timestamp,remote_address,message`. The
//! timestamp is local wall-clock time at second precision. Embedded commas,
//! quotes and newlines in the message are quoted per RFC 4180, so the message
//! field always reads back byte-for-byte.

use crate::error::log::LogError;

use common::ErrorLocation;
use common::wire::is_probe;

use std::net::SocketAddr;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// `strftime` format of the timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(with = "timestamp_column")]
    pub timestamp: NaiveDateTime,
    pub remote_address: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(remote_address: SocketAddr, message: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            remote_address: remote_address.to_string(),
            message: message.to_string(),
        }
    }

    /// Encode as a single CSV row, terminator included.
    pub(crate) fn to_row(&self) -> Result<Vec<u8>, LogError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer.serialize(self)?;

        writer.into_inner().map_err(|e| LogError::Encode {
            message: format!("Failed to flush CSV row: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

mod timestamp_column {
    use super::TIMESTAMP_FORMAT;

    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}

/// Appends [`LogRecord`]s to a CSV file.
///
/// Cheap to clone; all clones share one store-wide lock, held for exactly one
/// open-write-flush cycle. The file is reopened in append mode on every call,
/// so earlier history is never truncated and a store that is temporarily
/// unavailable fails only the calls made while it is.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// The row is encoded in memory before the lock is taken and written with a
    /// single `write_all`, so concurrent callers never interleave partial rows.
    ///
    /// # Errors
    ///
    /// - [`LogError::Probe`] if `message` is the liveness probe (nothing is written)
    /// - [`LogError::Encode`] if the row cannot be encoded
    /// - [`LogError::Open`] / [`LogError::Write`] if the file cannot be opened or written
    pub async fn append(
        &self,
        remote_address: SocketAddr,
        message: &str,
        timestamp: NaiveDateTime,
    ) -> Result<LogRecord, LogError> {
        if is_probe(message) {
            return Err(LogError::Probe {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let record = LogRecord::new(remote_address, message, timestamp);
        let row = record.to_row()?;

        let _guard = self.write_lock.lock().await;
        trace!("Log store lock acquired for {}", remote_address);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())
            .await
            .map_err(|e| LogError::Open {
                location: ErrorLocation::from(Location::caller()),
                path: self.path.to_path_buf(),
                source: e,
            })?;

        file.write_all(&row).await.map_err(|e| LogError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: self.path.to_path_buf(),
            source: e,
        })?;

        file.flush().await.map_err(|e| LogError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: self.path.to_path_buf(),
            source: e,
        })?;

        debug!(
            "Logged {} bytes from {} to {}",
            row.len(),
            remote_address,
            self.path.display()
        );
        Ok(record)
    }

    /// [`append`](Self::append) stamped with the current local time.
    pub async fn append_now(
        &self,
        remote_address: SocketAddr,
        message: &str,
    ) -> Result<LogRecord, LogError> {
        self.append(remote_address, message, Local::now().naive_local())
            .await
    }
}
