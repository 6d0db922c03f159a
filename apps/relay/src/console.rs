//! Line-oriented terminal front end for [`RelayClient`].
//!
//! Every line typed is sent as a message, except for three commands:
//! `/test` sends the test message, `/status` prints the connection status and
//! `/quit` exits. Every [`ClientEvent`] is printed as it arrives; events that
//! move the status indicator are prefixed with the new status.

use crate::error::RelayAppError;

use relay_core::client::{ClientEvent, RelayClient};

use std::time::Duration;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

const QUIT_COMMAND: &str = "/quit";
const TEST_COMMAND: &str = "/test";
const STATUS_COMMAND: &str = "/status";

/// How long to wait for each outstanding send outcome once input has ended.
const PENDING_OUTCOME_TIMEOUT: Duration = Duration::from_secs(5);

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Send(String),
    Test,
    Status,
    Quit,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            QUIT_COMMAND => ConsoleCommand::Quit,
            TEST_COMMAND => ConsoleCommand::Test,
            STATUS_COMMAND => ConsoleCommand::Status,
            _ => ConsoleCommand::Send(line.to_string()),
        }
    }
}

/// Console line for `event`.
pub fn render_event(event: &ClientEvent) -> String {
    match event.status() {
        Some(status) => format!("[{status}] {event}"),
        None => event.to_string(),
    }
}

/// Drive `client` from `input` and print its events to `output` until `/quit`
/// or end of input. Outcomes of sends still in flight are waited for and
/// printed, then the client is closed.
///
/// # Errors
///
/// Returns [`RelayAppError::Io`] if reading input or writing output fails.
pub async fn run_console<R, W>(
    client: &RelayClient,
    events: &mut UnboundedReceiver<ClientEvent>,
    input: R,
    mut output: W,
) -> Result<(), RelayAppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut pending: usize = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Console input closed");
                    break;
                };

                match ConsoleCommand::parse(&line) {
                    ConsoleCommand::Quit => break,
                    ConsoleCommand::Test => {
                        client.send_test();
                        pending += 1;
                    }
                    ConsoleCommand::Status => {
                        write_line(&mut output, &format!("Status: {}", client.status())).await?;
                    }
                    ConsoleCommand::Send(message) => {
                        if client.send(&message) {
                            pending += 1;
                        }
                    }
                }
            }
            Some(event) = events.recv() => {
                pending = pending.saturating_sub(usize::from(event.is_send_outcome()));
                write_line(&mut output, &render_event(&event)).await?;
            }
        }
    }

    while pending > 0 {
        match tokio::time::timeout(PENDING_OUTCOME_TIMEOUT, events.recv()).await {
            Ok(Some(event)) => {
                pending = pending.saturating_sub(usize::from(event.is_send_outcome()));
                write_line(&mut output, &render_event(&event)).await?;
            }
            Ok(None) => break,
            Err(_) => {
                warn!("Gave up waiting for {} send outcome(s)", pending);
                break;
            }
        }
    }

    while let Ok(event) = events.try_recv() {
        write_line(&mut output, &render_event(&event)).await?;
    }

    client.close().await;
    output.flush().await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<(), RelayAppError> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
