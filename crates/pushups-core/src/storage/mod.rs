mod config;
pub mod database;
pub mod migrations;
pub mod store;

pub use config::{Config, GoalConfig, HistoryConfig, ReminderConfig, StorageConfig, TelegramConfig};
pub use database::Database;
pub use store::RecordStore;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `PUSHUPS_HOME` wins when set. Otherwise `~/.config/pushups[-dev]/`,
/// chosen by `PUSHUPS_ENV` (set `PUSHUPS_ENV=dev` for a development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("PUSHUPS_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("PUSHUPS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pushups-dev")
            } else {
                base_dir.join("pushups")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
