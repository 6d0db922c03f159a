//! Client half of the relay.
//!
//! # Architecture
//!
//! - [`ConnectionManager`] owns the single outbound `TcpStream` and its status
//! - [`ConnectionHandle`] runs the manager as an actor: every connect, send,
//!   probe and close is a command on one in-order queue, so a health probe and
//!   a user send can never interleave bytes on the socket
//! - [`HealthMonitor`] probes or reconnects on a fixed interval
//! - [`RelayClient`] is the surface a UI drives: fire-and-forget sends and a
//!   single-consumer stream of [`ClientEvent`]s
//!
//! All UI-visible changes travel through the event channel, so the consumer
//! can apply them on whatever thread owns its widgets.

mod connection;
mod events;
mod handle;
mod health;
mod relay_client;

pub use connection::{ConnectionManager, ConnectionStatus};
pub use events::ClientEvent;
pub use handle::ConnectionHandle;
pub use health::HealthMonitor;
pub use relay_client::RelayClient;
