mod config;
pub mod trip_db;

pub use config::{Config, NotificationsConfig, SyncConfig};
pub use trip_db::TripDb;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/schengen[-dev]/` based on SCHENGEN_ENV.
///
/// Set SCHENGEN_ENV=dev to use a development data directory, or
/// SCHENGEN_DATA_DIR to point at an explicit directory (tests do).
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = if let Ok(explicit) = std::env::var("SCHENGEN_DATA_DIR") {
        PathBuf::from(explicit)
    } else {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config");
        let env = std::env::var("SCHENGEN_ENV").unwrap_or_else(|_| "production".to_string());
        if env == "dev" {
            base_dir.join("schengen-dev")
        } else {
            base_dir.join("schengen")
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}
