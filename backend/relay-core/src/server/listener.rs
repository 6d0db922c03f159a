//! TCP listener and accept loop.

use crate::error::server::ServerError;
use crate::server::handle::RelayServerHandle;
use crate::server::log_writer::LogWriter;
use crate::server::session::Session;
use crate::server::{ShutdownSignal, shutdown_requested};

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::spawn as TokioSpawn;
use tokio::sync::watch;
use tokio::time::sleep as TokioSleep;

/// Pause after a failed `accept` so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Starts the relay server on `bind_address`.
///
/// Binds a TCP listener and spawns the accept loop in the background. Each
/// accepted connection is served by its own [`Session`] task and accepting
/// resumes immediately; a failing session or a failed `accept` never stops
/// the loop.
///
/// # Arguments
///
/// * `bind_address` - `host:port` to listen on (port 0 picks a free port)
/// * `log_writer` - durable log shared by every session
/// * `buffer_size` - bytes per read, i.e. the largest message a session sees whole
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be bound. This is the
/// only failure that prevents the server from running.
pub async fn start_relay_server(
    bind_address: &str,
    log_writer: LogWriter,
    buffer_size: usize,
) -> Result<RelayServerHandle, ServerError> {
    let bind_error = |e: std::io::Error| ServerError::Bind {
        message: format!("Failed to bind {bind_address}: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: e,
    };

    let listener = TcpListener::bind(bind_address).await.map_err(bind_error)?;
    let local_addr = listener.local_addr().map_err(bind_error)?;

    info!("Relay server listening on {}", local_addr);
    info!("Logging messages to {}", log_writer.path().display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let accept_task = TokioSpawn(accept_loop(listener, log_writer, buffer_size, shutdown_rx));

    Ok(RelayServerHandle::new(local_addr, shutdown_tx, accept_task))
}

async fn accept_loop(
    listener: TcpListener,
    log_writer: LogWriter,
    buffer_size: usize,
    mut shutdown: ShutdownSignal,
) {
    loop {
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => {
                info!("Relay server stopped accepting connections");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("Connected by {}", addr);
                    let session = Session::new(stream, addr, log_writer.clone(), buffer_size);
                    TokioSpawn(serve_session(session, shutdown.clone()));
                }
                Err(e) => {
                    let err = ServerError::Accept {
                        message: format!("Failed to accept connection: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    };
                    error!("{}", err);
                    TokioSleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }
    }
}

async fn serve_session(session: Session, shutdown: ShutdownSignal) {
    let id = session.id();
    let remote_address = session.remote_address();

    if let Err(e) = session.run(shutdown).await {
        warn!("Session {} for {} ended with error: {}", id, remote_address, e);
    }

    info!("Connection closed for {}", remote_address);
}
