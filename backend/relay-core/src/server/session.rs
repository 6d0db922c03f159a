//! Per-connection receive loop.

use crate::error::server::ServerError;
use crate::server::log_writer::LogWriter;
use crate::server::{ShutdownSignal, shutdown_requested};

use common::ErrorLocation;
use common::wire::{ACK_MESSAGE, is_probe};

use std::net::SocketAddr;
use std::panic::Location;

use log::{error, info, trace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use uuid::Uuid;

/// One accepted connection and everything needed to serve it.
///
/// The session owns its stream. [`Session::run`] consumes the session, so the
/// stream is dropped (and the socket closed) on every exit path.
pub struct Session {
    id: Uuid,
    stream: TcpStream,
    remote_address: SocketAddr,
    log_writer: LogWriter,
    buffer_size: usize,
}

impl Session {
    pub fn new(
        stream: TcpStream,
        remote_address: SocketAddr,
        log_writer: LogWriter,
        buffer_size: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            stream,
            remote_address,
            log_writer,
            buffer_size,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn remote_address(&self) -> SocketAddr {
        self.remote_address
    }

    /// Serve the connection until the peer closes, a read or write fails, or
    /// shutdown is signalled.
    ///
    /// Each read is treated as one message:
    /// - the liveness probe is dropped without a reply
    /// - anything else is appended to the log and answered with [`ACK_MESSAGE`]
    ///
    /// A failed log append is reported and the message is still acknowledged:
    /// the ack confirms receipt, not durability.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Read`] - reading from the peer failed
    /// - [`ServerError::Send`] - writing the acknowledgment failed
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> Result<(), ServerError> {
        info!("Session {} started for {}", self.id, self.remote_address);

        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let read = tokio::select! {
                result = self.stream.read(&mut buffer) => result,
                _ = shutdown_requested(&mut shutdown) => {
                    info!("Session {} closing for shutdown", self.id);
                    return Ok(());
                }
            };

            let len = match read {
                Ok(0) => {
                    info!("Client {} disconnected", self.remote_address);
                    return Ok(());
                }
                Ok(len) => len,
                Err(e) => {
                    return Err(ServerError::Read {
                        message: format!("Error reading from {}: {e}", self.remote_address),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            let message = String::from_utf8_lossy(&buffer[..len]);

            if is_probe(&message) {
                trace!("Probe from {}", self.remote_address);
                continue;
            }

            info!("Received from {}: {}", self.remote_address, message);

            if let Err(e) = self
                .log_writer
                .append_now(self.remote_address, &message)
                .await
            {
                error!("Failed to log message from {}: {}", self.remote_address, e);
            }

            self.stream
                .write_all(ACK_MESSAGE.as_bytes())
                .await
                .map_err(|e| ServerError::Send {
                    message: format!("Failed to acknowledge {}: {e}", self.remote_address),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }
    }
}
