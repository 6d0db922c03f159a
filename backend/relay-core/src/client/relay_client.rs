//! Client facade for a UI layer.

use crate::client::connection::{ConnectionManager, ConnectionStatus};
use crate::client::events::ClientEvent;
use crate::client::handle::ConnectionHandle;
use crate::client::health::HealthMonitor;
use crate::config::ClientConfig;

use common::wire::TEST_MESSAGE;

use log::{info, warn};
use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Everything a UI needs: start, send, observe.
///
/// [`send`](Self::send) and [`send_test`](Self::send_test) are synchronous and
/// return immediately; outcomes arrive later as [`ClientEvent`]s on the
/// receiver returned by [`start`](Self::start).
pub struct RelayClient {
    connection: ConnectionHandle,
    events: mpsc::UnboundedSender<ClientEvent>,
    runtime: RuntimeHandle,
    health_task: JoinHandle<()>,
}

impl RelayClient {
    /// Spawn the connection actor, an initial connect attempt and the health
    /// monitor.
    ///
    /// Must be called from inside a Tokio runtime. The returned client may then
    /// be used from any thread.
    pub fn start(
        endpoint: impl Into<String>,
        config: &ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let runtime = RuntimeHandle::current();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let connection = ConnectionHandle::spawn(ConnectionManager::new(
            endpoint,
            config.buffer_size,
        ));

        runtime.spawn(initial_connect(connection.clone(), events_tx.clone()));

        let monitor = HealthMonitor::new(
            connection.clone(),
            config.health_check_interval(),
            events_tx.clone(),
        );
        let health_task = runtime.spawn(monitor.run());

        let client = Self {
            connection,
            events: events_tx,
            runtime,
            health_task,
        };

        (client, events_rx)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Send user input. Surrounding whitespace is trimmed; blank input is
    /// ignored and `false` returned.
    pub fn send(&self, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() {
            return false;
        }

        self.emit(ClientEvent::Sending {
            message: message.to_string(),
        });
        self.dispatch(message.to_string());
        true
    }

    /// Send the fixed test message.
    pub fn send_test(&self) {
        self.emit(ClientEvent::SendingTest {
            message: TEST_MESSAGE.to_string(),
        });
        self.dispatch(TEST_MESSAGE.to_string());
    }

    /// Stop health checking and close the connection.
    pub async fn close(&self) {
        self.health_task.abort();
        self.connection.close().await;
        info!("Relay client closed");
    }

    fn dispatch(&self, message: String) {
        let connection = self.connection.clone();
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let outcome = match connection.send_message(message).await {
                Ok(response) => vec![ClientEvent::Received { response }],
                Err(e) if e.is_io_failure() => {
                    warn!("Error sending message: {}", e);
                    vec![ClientEvent::NoResponse, ClientEvent::ConnectionLost]
                }
                Err(_) => vec![ClientEvent::NotConnected],
            };

            for event in outcome {
                let _ = events.send(event);
            }
        });
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}

async fn initial_connect(
    connection: ConnectionHandle,
    events: mpsc::UnboundedSender<ClientEvent>,
) {
    let event = match connection.connect().await {
        Ok(()) => ClientEvent::Connected,
        Err(e) => {
            warn!("Initial connect failed: {}", e);
            ClientEvent::ConnectFailed
        }
    };
    let _ = events.send(event);
}

impl Drop for RelayClient {
    fn drop(&mut self) {
        self.health_task.abort();
    }
}
