//! Where the binaries look for config and put their logs.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "relay";
const LOG_DIR_NAME: &str = "logs";

/// Config directory: the explicit argument if given, else the platform config
/// dir (`~/.config/relay` on Linux), else the working directory.
pub fn config_dir(explicit: Option<String>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Log directory: the platform local data dir (`~/.local/share/relay/logs` on
/// Linux), else `./logs`.
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR_NAME))
}
