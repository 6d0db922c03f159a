//! Handle to a running relay server.

use std::net::SocketAddr;

use log::{error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle returned by [`start_relay_server`](crate::server::start_relay_server).
///
/// # Lifecycle
///
/// The accept loop and every session observe the same shutdown signal.
/// [`shutdown`](Self::shutdown) raises it; dropping the handle has the same
/// effect, so keep the handle alive for as long as the server should run.
pub struct RelayServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl RelayServerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown_tx: watch::Sender<bool>,
        accept_task: JoinHandle<()>,
    ) -> Self {
        Self {
            local_addr,
            shutdown_tx,
            accept_task,
        }
    }

    /// Address the listener is bound to (resolves port 0 to the real port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and close every live session.
    pub fn shutdown(&self) {
        info!("Shutdown requested for relay server on {}", self.local_addr);
        self.shutdown_tx.send_replace(true);
    }

    /// Wait for the accept loop to finish.
    pub async fn wait(self) {
        let local_addr = self.local_addr;
        let _shutdown_tx = self.shutdown_tx;

        if let Err(e) = self.accept_task.await {
            error!("Accept loop for {} ended abnormally: {}", local_addr, e);
        }
    }
}
