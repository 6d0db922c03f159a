use crate::client::connection::ConnectionStatus;

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Notification for the UI layer.
///
/// `Display` renders the line a console feed shows; [`status`](Self::status)
/// gives the status indicator change the event implies, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Initial connect succeeded.
    Connected,
    /// Initial connect failed; the health monitor keeps retrying.
    ConnectFailed,
    /// The health monitor re-established a lost connection.
    Reconnected,
    /// A probe or a send hit a dead connection.
    ConnectionLost,
    Sending { message: String },
    SendingTest { message: String },
    Received { response: String },
    /// A send failed on the wire; no reply will arrive for it.
    NoResponse,
    /// A send was refused locally because no connection is open.
    NotConnected,
}

impl ClientEvent {
    pub fn status(&self) -> Option<ConnectionStatus> {
        match self {
            ClientEvent::Connected | ClientEvent::Reconnected => Some(ConnectionStatus::Connected),
            ClientEvent::ConnectFailed | ClientEvent::ConnectionLost => {
                Some(ConnectionStatus::Disconnected)
            }
            _ => None,
        }
    }

    /// True for the event that settles a send: every dispatched send ends in
    /// exactly one of these.
    pub fn is_send_outcome(&self) -> bool {
        matches!(
            self,
            ClientEvent::Received { .. } | ClientEvent::NoResponse | ClientEvent::NotConnected
        )
    }
}

impl Display for ClientEvent {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            ClientEvent::Connected => write!(formatter, "Connected to server."),
            ClientEvent::ConnectFailed => write!(formatter, "Failed to connect to server."),
            ClientEvent::Reconnected => write!(formatter, "Reconnected to server."),
            ClientEvent::ConnectionLost => write!(formatter, "Connection lost. Server is off."),
            ClientEvent::Sending { message } => write!(formatter, "Sending: {message}"),
            ClientEvent::SendingTest { message } => {
                write!(formatter, "Sending test message: {message}")
            }
            ClientEvent::Received { response } => write!(formatter, "Received: {response}"),
            ClientEvent::NoResponse => write!(formatter, "No response or error occurred."),
            ClientEvent::NotConnected => write!(formatter, "Not connected to server."),
        }
    }
}
