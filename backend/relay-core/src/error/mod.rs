pub mod config;
pub mod connection;
pub mod log;
pub mod server;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Server(#[from] server::ServerError),

    #[error(transparent)]
    Log(#[from] log::LogError),

    #[error(transparent)]
    Connection(#[from] connection::ConnectionError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
