//! The record store seam.

use chrono::NaiveDate;

use crate::error::DatabaseError;
use crate::record::{DailyRecord, UserId};

/// Durable mapping `(user, day) -> count`.
///
/// Implementations own per-key atomicity: two concurrent
/// [`upsert_add`](RecordStore::upsert_add) calls on the same key must both
/// be reflected in the final total. Callers never read-modify-write.
pub trait RecordStore: Send + Sync {
    /// Add `delta` to the record for `(user, day)`, creating it at `delta`
    /// if absent. Returns the new total.
    ///
    /// All-or-nothing: on error the stored total is unchanged.
    fn upsert_add(&self, user: UserId, day: NaiveDate, delta: u32) -> Result<u32, DatabaseError>;

    /// The total for `(user, day)`, or `None` if nothing was recorded.
    fn get(&self, user: UserId, day: NaiveDate) -> Result<Option<u32>, DatabaseError>;

    /// Up to `limit` records for `user`, most recent day first.
    fn recent(&self, user: UserId, limit: usize) -> Result<Vec<DailyRecord>, DatabaseError>;

    /// Every record dated `day`.
    fn records_for_day(&self, day: NaiveDate) -> Result<Vec<DailyRecord>, DatabaseError>;
}
