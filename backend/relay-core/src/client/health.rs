//! Periodic liveness check and reconnection.

use crate::client::connection::ConnectionStatus;
use crate::client::events::ClientEvent;
use crate::client::handle::ConnectionHandle;

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

/// Probes a live connection and reconnects a dead one on a fixed interval.
///
/// Only transitions are reported: a lost connection produces one
/// [`ClientEvent::ConnectionLost`], after which the monitor retries `connect`
/// quietly each tick until it yields one [`ClientEvent::Reconnected`].
pub struct HealthMonitor {
    connection: ConnectionHandle,
    interval: Duration,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl HealthMonitor {
    pub fn new(
        connection: ConnectionHandle,
        interval: Duration,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            connection,
            interval,
            events,
        }
    }

    /// Run one check. Returns the event emitted, if any.
    pub async fn tick(&self) -> Option<ClientEvent> {
        let event = match self.connection.status() {
            ConnectionStatus::Connected => match self.connection.probe().await {
                Ok(()) => None,
                // A refusal means another path already dropped the connection
                // and reported it.
                Err(e) if !e.is_io_failure() => {
                    debug!("Probe skipped: {}", e);
                    None
                }
                Err(e) => {
                    warn!("Connection lost: {}", e);
                    Some(ClientEvent::ConnectionLost)
                }
            },
            ConnectionStatus::Disconnected => match self.connection.connect().await {
                Ok(()) => {
                    info!("Reconnected to server");
                    Some(ClientEvent::Reconnected)
                }
                Err(e) => {
                    debug!("Reconnect attempt failed: {}", e);
                    None
                }
            },
            ConnectionStatus::Connecting => None,
        };

        if let Some(ref event) = event {
            let _ = self.events.send(event.clone());
        }

        event
    }

    /// Tick every interval until the event receiver is dropped.
    ///
    /// The first check happens one full interval after start.
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        info!("Health monitor running every {:?}", self.interval);

        while !self.events.is_closed() {
            ticker.tick().await;
            self.tick().await;
        }

        info!("Health monitor stopped: event receiver dropped");
    }
}
