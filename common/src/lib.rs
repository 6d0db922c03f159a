//! Types shared by both halves of the relay.
//!
//! The server and the client agree on nothing but the bytes on the wire, so
//! the wire constants live here next to the error location type that every
//! error enum in the workspace carries.
//!
//! ## Architecture
//!
//! - **common** (this crate): wire constants and error plumbing
//! - **relay-core**: server sessions, durable log, client connection lifecycle
//! - **relay**: logger and the two binaries wiring everything together

pub mod error_location;
pub mod wire;

pub use error_location::ErrorLocation;
