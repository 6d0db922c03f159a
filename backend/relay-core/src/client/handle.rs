//! Connection actor.
//!
//! The [`ConnectionManager`] lives inside a dedicated task and is only ever
//! touched by that task. Callers hold a cloneable [`ConnectionHandle`] that
//! turns each operation into a command on an mpsc queue and awaits the reply
//! on a oneshot channel. Commands run strictly in arrival order, which is
//! what keeps a health probe from landing between a send and its reply.

use crate::client::connection::{ConnectionManager, ConnectionStatus};
use crate::error::connection::ConnectionError;

use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};

const COMMAND_QUEUE_CAPACITY: usize = 100;

type Reply<T> = oneshot::Sender<Result<T, ConnectionError>>;

/// Operations executed by the connection actor.
#[derive(Debug)]
enum ConnectionCommand {
    Connect(Reply<()>),
    Send { message: String, reply: Reply<String> },
    Probe(Reply<()>),
    Close(Reply<()>),
}

/// Cloneable handle to the connection actor.
///
/// All clones drive the same connection. The actor stops, closing the
/// connection, once every handle has been dropped.
#[derive(Clone)]
pub struct ConnectionHandle {
    command_tx: mpsc::Sender<ConnectionCommand>,
    status_rx: watch::Receiver<ConnectionStatus>,
}

impl ConnectionHandle {
    /// Move `manager` into a new actor task. Must be called inside a Tokio runtime.
    pub fn spawn(manager: ConnectionManager) -> Self {
        let status_rx = manager.subscribe();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);

        tokio::spawn(connection_actor(command_rx, manager));

        Self {
            command_tx,
            status_rx,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Watch channel carrying every status change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_rx.clone()
    }

    /// See [`ConnectionManager::connect`].
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        self.request(ConnectionCommand::Connect).await
    }

    /// See [`ConnectionManager::send_message`].
    pub async fn send_message(&self, message: impl Into<String>) -> Result<String, ConnectionError> {
        let message = message.into();
        self.request(|reply| ConnectionCommand::Send { message, reply })
            .await
    }

    /// See [`ConnectionManager::probe`].
    pub async fn probe(&self) -> Result<(), ConnectionError> {
        self.request(ConnectionCommand::Probe).await
    }

    /// Close the connection. Idempotent; a stopped actor counts as closed.
    pub async fn close(&self) {
        if let Err(e) = self.request(ConnectionCommand::Close).await {
            debug!("Close skipped: {}", e);
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> ConnectionCommand,
    ) -> Result<T, ConnectionError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        if self.command_tx.send(command(reply_tx)).await.is_err() {
            return Err(ConnectionError::actor_stopped());
        }

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::actor_stopped()),
        }
    }
}

/// Owns the manager and executes commands one at a time until every
/// [`ConnectionHandle`] is gone.
async fn connection_actor(
    mut command_rx: mpsc::Receiver<ConnectionCommand>,
    mut manager: ConnectionManager,
) {
    info!("Connection actor started for {}", manager.endpoint());

    while let Some(command) = command_rx.recv().await {
        match command {
            ConnectionCommand::Connect(reply) => {
                let _ = reply.send(manager.connect().await);
            }
            ConnectionCommand::Send { message, reply } => {
                let _ = reply.send(manager.send_message(&message).await);
            }
            ConnectionCommand::Probe(reply) => {
                let _ = reply.send(manager.probe().await);
            }
            ConnectionCommand::Close(reply) => {
                manager.close().await;
                let _ = reply.send(Ok(()));
            }
        }
    }

    manager.close().await;
    info!("Connection actor for {} stopped", manager.endpoint());
}
