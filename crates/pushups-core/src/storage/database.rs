//! SQLite-backed record store.
//!
//! One row per `(user_id, date)` in the `pushups` table. All access goes
//! through a single connection behind a mutex, and every increment is one
//! `INSERT ... ON CONFLICT DO UPDATE ... RETURNING` statement, so same-key
//! increments can never interleave.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::data_dir;
use super::migrations;
use super::store::RecordStore;
use crate::error::DatabaseError;
use crate::record::{DailyRecord, UserId, DAY_FORMAT};

const DB_FILE_NAME: &str = "pushups.db";

/// SQLite database holding daily totals.
pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the database at `~/.config/pushups/pushups.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join(DB_FILE_NAME))
    }

    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self {
            conn: Mutex::new(conn),
            path: Some(path),
        };
        db.migrate()?;
        debug!(path = ?db.path, "database opened");
        Ok(db)
    }

    /// Open an in-memory database (for tests and dry runs).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
            path: None,
        };
        db.migrate()?;
        Ok(db)
    }

    /// Location on disk, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn())
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written:
        // each statement is atomic on its own.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DAY_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl RecordStore for Database {
    fn upsert_add(&self, user: UserId, day: NaiveDate, delta: u32) -> Result<u32, DatabaseError> {
        let total = self.conn().query_row(
            "INSERT INTO pushups (user_id, date, count)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, date) DO UPDATE SET count = count + excluded.count
             RETURNING count",
            params![user.0, format_day(day), delta],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(total)
    }

    fn get(&self, user: UserId, day: NaiveDate) -> Result<Option<u32>, DatabaseError> {
        let count = self
            .conn()
            .query_row(
                "SELECT count FROM pushups WHERE user_id = ?1 AND date = ?2",
                params![user.0, format_day(day)],
                |row| row.get::<_, u32>(0),
            )
            .optional()?;
        Ok(count)
    }

    fn recent(&self, user: UserId, limit: usize) -> Result<Vec<DailyRecord>, DatabaseError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT date, count FROM pushups
             WHERE user_id = ?1
             ORDER BY date DESC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![user.0, limit], |row| {
            Ok(DailyRecord::new(user, parse_day(row, 0)?, row.get(1)?))
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn records_for_day(&self, day: NaiveDate) -> Result<Vec<DailyRecord>, DatabaseError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, count FROM pushups
             WHERE date = ?1
             ORDER BY user_id",
        )?;
        let rows = stmt.query_map(params![format_day(day)], |row| {
            Ok(DailyRecord::new(UserId(row.get(0)?), day, row.get(1)?))
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
