mod config;
pub mod database;
pub mod legacy;
pub mod migrations;

pub use config::{Config, DashboardConfig, InventoryConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::inventory::InventoryState;

/// Where a [`crate::Bakery`] flushes its state after each mutation.
pub trait StateSink: Send + Sync {
    /// Write the full state. Must be all-or-nothing.
    ///
    /// # Errors
    /// Returns an error if the state could not be stored; the caller then
    /// rolls its in-memory copy back.
    fn persist(&self, state: &InventoryState) -> Result<()>;
}

/// Returns the data directory, creating it if needed.
///
/// `BAKERY_DATA_DIR` wins when set. Otherwise `~/.config/bakery[-dev]/`
/// based on `BAKERY_ENV` (set `BAKERY_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("BAKERY_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BAKERY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("bakery-dev")
            } else {
                base_dir.join("bakery")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
