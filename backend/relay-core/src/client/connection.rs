//! Outbound connection ownership and status tracking.

use crate::error::connection::ConnectionError;

use common::ErrorLocation;
use common::wire::PROBE_BYTES;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::io::ErrorKind;
use std::panic::Location;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

/// Status of the client connection.
///
/// `Connected` holds exactly when a stream is open and the last operation on
/// it succeeded. `Connecting` is visible only while a connect attempt runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl Display for ConnectionStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
        };
        formatter.write_str(label)
    }
}

/// Owner of the single outbound connection.
///
/// Any I/O failure drops the stream and flips the status to `Disconnected`;
/// errors are returned as values and never escape as panics. Status changes
/// are published on a watch channel (see [`subscribe`](Self::subscribe)).
pub struct ConnectionManager {
    endpoint: String,
    buffer_size: usize,
    stream: Option<TcpStream>,
    status_tx: watch::Sender<ConnectionStatus>,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>, buffer_size: usize) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            endpoint: endpoint.into(),
            buffer_size,
            stream: None,
            status_tx,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Open a fresh connection to the endpoint, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Connect`] if the endpoint is unreachable.
    /// The status is `Disconnected` afterwards.
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.stream = None;
        self.set_status(ConnectionStatus::Connecting);

        match TcpStream::connect(&self.endpoint).await {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!("Failed to set TCP_NODELAY: {}", e);
                }
                self.stream = Some(stream);
                self.set_status(ConnectionStatus::Connected);
                info!("Connected to {}", self.endpoint);
                Ok(())
            }
            Err(e) => {
                self.set_status(ConnectionStatus::Disconnected);
                warn!("Connection error: {}", e);
                Err(ConnectionError::Connect {
                    message: format!("Failed to connect to {}: {e}", self.endpoint),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Send `message` and wait for the server's reply.
    ///
    /// Blocks until one read returns; there is no timeout.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::NotConnected`] - no open stream; nothing was sent
    /// - [`ConnectionError::Send`] / [`ConnectionError::Read`] - socket failure
    /// - [`ConnectionError::Closed`] - the server closed instead of replying
    pub async fn send_message(&mut self, message: &str) -> Result<String, ConnectionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectionError::not_connected());
        };

        let result = exchange(stream, message.as_bytes(), self.buffer_size).await;
        if let Err(ref e) = result {
            self.fail(e);
        }
        result
    }

    /// Write the liveness probe and check the peer has not already hung up.
    ///
    /// The server never answers the probe, so any readable EOF or reset right
    /// after writing it means the connection is gone.
    ///
    /// # Errors
    ///
    /// Same as [`send_message`](Self::send_message).
    pub async fn probe(&mut self) -> Result<(), ConnectionError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ConnectionError::not_connected());
        };

        let result = write_probe(stream).await;
        if let Err(ref e) = result {
            self.fail(e);
        }
        result
    }

    /// Close the connection. Safe to call any number of times.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Error shutting down stream: {}", e);
            }
            info!("Connection to {} closed", self.endpoint);
        }
        self.set_status(ConnectionStatus::Disconnected);
    }

    fn fail(&mut self, error: &ConnectionError) {
        warn!("Connection to {} failed: {}", self.endpoint, error);
        self.stream = None;
        self.set_status(ConnectionStatus::Disconnected);
    }

    fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status_tx.send_replace(status);
        if previous != status {
            debug!("Connection status {} -> {}", previous, status);
        }
    }
}

async fn exchange(
    stream: &mut TcpStream,
    payload: &[u8],
    buffer_size: usize,
) -> Result<String, ConnectionError> {
    stream
        .write_all(payload)
        .await
        .map_err(|e| ConnectionError::Send {
            message: format!("Error sending message: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let mut buffer = vec![0u8; buffer_size];
    let len = stream
        .read(&mut buffer)
        .await
        .map_err(|e| ConnectionError::Read {
            message: format!("Error reading response: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    if len == 0 {
        return Err(ConnectionError::Closed {
            message: "Server closed the connection".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(String::from_utf8_lossy(&buffer[..len]).into_owned())
}

async fn write_probe(stream: &mut TcpStream) -> Result<(), ConnectionError> {
    stream
        .write_all(PROBE_BYTES)
        .await
        .map_err(|e| ConnectionError::Send {
            message: format!("Error sending probe: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let mut scratch = [0u8; 64];
    match stream.try_read(&mut scratch) {
        Ok(0) => Err(ConnectionError::Closed {
            message: "Server closed the connection".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
        Ok(len) => {
            debug!("Discarded {} unsolicited bytes after probe", len);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
        Err(e) => Err(ConnectionError::Read {
            message: format!("Error checking connection: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
