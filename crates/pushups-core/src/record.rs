//! Daily record model.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default daily target count.
pub const DEFAULT_DAILY_GOAL: u32 = 100;

/// Date format used for storage and display (`YYYY-MM-DD`).
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Opaque user identifier (the Telegram chat id of a private chat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// Accumulated count for one user on one calendar day.
///
/// At most one record exists per `(user, day)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub user: UserId,
    pub day: NaiveDate,
    pub count: u32,
}

impl DailyRecord {
    pub fn new(user: UserId, day: NaiveDate, count: u32) -> Self {
        Self { user, day, count }
    }

    /// Whether `count` reached `goal`.
    pub fn goal_met(&self, goal: u32) -> bool {
        self.count >= goal
    }

    /// How many are still missing to reach `goal` (0 once met).
    pub fn remaining(&self, goal: u32) -> u32 {
        goal.saturating_sub(self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let r = DailyRecord::new(UserId(1), day(), 130);
        assert!(r.goal_met(100));
        assert_eq!(r.remaining(100), 0);
    }

    #[test]
    fn remaining_below_goal() {
        let r = DailyRecord::new(UserId(1), day(), 40);
        assert!(!r.goal_met(100));
        assert_eq!(r.remaining(100), 60);
    }

    #[test]
    fn user_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
