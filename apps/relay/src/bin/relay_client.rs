use relay::console::run_console;
use relay::error::RelayAppError;
use relay::logger::{CLIENT_LOG_FILE_NAME, LogOutput, initialize as LoggerInitialize};
use relay::paths;

use relay_core::client::RelayClient;
use relay_core::config::RelayConfig;

use std::fs::create_dir_all;
use std::process::ExitCode;

use log::{error, info};
use tokio::io::{BufReader, stdin, stdout};

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
    LoggerInitialize(&log_dir, CLIENT_LOG_FILE_NAME, LogOutput::FileOnly)?;

    let config_dir = paths::config_dir(std::env::args().nth(1));
    let mut config = RelayConfig::load(&config_dir)?;
    config.apply_env_overrides()?;

    let endpoint = config.endpoint.address();
    info!("Relay client starting against {}", endpoint);

    let (client, mut events) = RelayClient::start(endpoint, &config.client);

    run_console(&client, &mut events, BufReader::new(stdin()), stdout()).await?;

    info!("Relay client exiting");
    Ok(())
}
