use relay::error::RelayAppError;
use relay::logger::{LogOutput, SERVER_LOG_FILE_NAME, initialize as LoggerInitialize};
use relay::paths;

use relay_core::config::RelayConfig;
use relay_core::server::{LogWriter, start_relay_server};

use std::fs::create_dir_all;
use std::process::ExitCode;

use log::{error, info};
use tokio::signal::ctrl_c;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), RelayAppError> {
    let _ = dotenvy::dotenv();

    let log_dir = paths::log_dir();
    create_dir_all(&log_dir)?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir, SERVER_LOG_FILE_NAME, LogOutput::StdoutAndFile)?;

    info!("Starting server...");
    info!("Log directory: {}", log_dir.display());

    let config_dir = paths::config_dir(std::env::args().nth(1));
    let mut config = RelayConfig::load(&config_dir)?;
    config.apply_env_overrides()?;

    let log_writer = LogWriter::new(&config.server.log_file);
    let handle = start_relay_server(
        &config.endpoint.address(),
        log_writer,
        config.server.buffer_size,
    )
    .await?;

    info!("Server listening on {}", handle.local_addr());

    ctrl_c().await?;

    handle.shutdown();
    handle.wait().await;

    info!("Server stopped");
    Ok(())
}
