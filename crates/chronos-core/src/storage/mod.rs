mod config;
pub mod database;

pub use config::{AlertsConfig, Config, DisplayConfig, NotifierConfig};
pub use database::{Database, KvTransaction};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `CHRONOS_DATA_DIR` wins when set. Otherwise `~/.config/chronos[-dev]/`,
/// with `CHRONOS_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("CHRONOS_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CHRONOS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("chronos-dev")
            } else {
                base_dir.join("chronos")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
