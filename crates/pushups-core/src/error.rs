//! Core error types for pushups-core.
//!
//! Every fallible library operation returns [`CoreError`] or one of the
//! narrower enums below. Validation failures are user-facing and never
//! touch storage; database and notify failures are logged by the caller and
//! never take the process down.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pushups-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Outbound message delivery errors
    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),
}

impl CoreError {
    /// Storage failures may succeed if the caller tries again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Database(DatabaseError::QueryFailed(_) | DatabaseError::Locked)
        )
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `add` was sent without an argument
    #[error("Missing amount")]
    MissingAmount,

    /// Argument is not an integer
    #[error("Invalid amount '{0}': not an integer")]
    InvalidAmount(String),

    /// Zero or negative amount
    #[error("Amount must be greater than 0, got {0}")]
    NonPositiveAmount(i64),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors delivering a message to a user.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport-level failure (connect, timeout, bad body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging API answered with `ok: false`
    #[error("API error{}: {description}", code.map(|c| format!(" {c}")).unwrap_or_default())]
    Api {
        code: Option<i64>,
        description: String,
    },

    /// No bot token available
    #[error("Bot token not configured")]
    NotConfigured,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }

    #[test]
    fn storage_errors_are_retryable_validation_is_not() {
        let db: CoreError = DatabaseError::QueryFailed("disk I/O".into()).into();
        assert!(db.is_retryable());

        let v: CoreError = ValidationError::NonPositiveAmount(0).into();
        assert!(!v.is_retryable());
    }

    #[test]
    fn api_error_message_includes_code() {
        let err = NotifyError::Api {
            code: Some(403),
            description: "Forbidden: bot was blocked by the user".into(),
        };
        assert_eq!(
            err.to_string(),
            "API error 403: Forbidden: bot was blocked by the user"
        );
    }
}
