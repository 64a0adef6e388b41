pub mod add;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod progress;
pub mod remind;
pub mod run;

use std::sync::Arc;

use pushups_core::{Config, Database};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the record store named by `config`, or the default one.
pub fn open_database(config: &Config) -> Result<Arc<Database>, Box<dyn std::error::Error>> {
    let db = match config.database_path() {
        Some(path) => Database::open_at(path)?,
        None => Database::open()?,
    };
    Ok(Arc::new(db))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
