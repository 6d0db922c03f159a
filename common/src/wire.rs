//! Wire protocol constants.
//!
//! The protocol is unframed UTF-8 over TCP: one `write` is one message and one
//! read of up to [`DEFAULT_BUFFER_SIZE`] bytes is one message. Payloads larger
//! than the reader's buffer arrive split across reads; nothing reassembles them.

use const_format::concatcp;

/// Reply sent by the server for every non-probe message.
pub const ACK_MESSAGE: &str = "Great success!";

/// Liveness probe sent by the client health monitor. Never logged, never acked.
pub const PROBE: &str = " ";

/// Raw bytes of [`PROBE`].
pub const PROBE_BYTES: &[u8] = PROBE.as_bytes();

/// Message sent by the client's "test" operation.
pub const TEST_MESSAGE: &str = "Test";

/// Size of a single receive call on either side.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENDPOINT: &str = concatcp!(DEFAULT_HOST, ":", DEFAULT_PORT);

/// Returns true when `payload` is exactly one probe. Every other non-empty
/// payload, including a run of spaces, is a message and gets logged and acked.
pub fn is_probe(payload: &str) -> bool {
    payload == PROBE
}
