//! Server half of the relay.
//!
//! - [`start_relay_server`] binds the listener and spawns the accept loop
//! - [`Session`] runs one receive loop per accepted connection
//! - [`LogWriter`] appends one CSV row per received message
//!
//! # Concurrency
//!
//! Every accepted connection gets its own Tokio task with no upper bound on
//! the number of live sessions. The log file is the only resource the
//! sessions share, and [`LogWriter`] serializes access to it.
//!
//! # Limits
//!
//! Reads have no timeout: a peer that stops sending without closing keeps its
//! session parked until the OS reports an error or the server shuts down.

mod handle;
mod listener;
mod log_writer;
mod session;

pub use handle::RelayServerHandle;
pub use listener::start_relay_server;
pub use log_writer::{LogRecord, LogWriter, TIMESTAMP_FORMAT};
pub use session::Session;

use tokio::sync::watch;

/// Receiving side of the server-wide shutdown signal.
pub type ShutdownSignal = watch::Receiver<bool>;

/// Resolves once shutdown has been requested or the server handle is gone.
pub(crate) async fn shutdown_requested(shutdown: &mut ShutdownSignal) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
