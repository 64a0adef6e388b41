//! Progress against the daily goal.
//!
//! [`ProgressBar`] is the 10-segment visual used by every reply. Its fill is
//! `floor(count / goal * 10)`, clamped so overshooting the goal still shows
//! exactly ten filled segments.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::Result;
use crate::record::{DailyRecord, UserId};
use crate::storage::RecordStore;

pub const BAR_SEGMENTS: u32 = 10;
const FILLED: char = '■';
const EMPTY: char = '□';

/// Discretized count/goal ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressBar {
    count: u32,
    goal: u32,
}

impl ProgressBar {
    pub fn new(count: u32, goal: u32) -> Self {
        Self { count, goal }
    }

    /// Filled segments, never more than [`BAR_SEGMENTS`].
    pub fn filled(&self) -> u32 {
        if self.goal == 0 {
            return BAR_SEGMENTS;
        }
        let filled = u64::from(self.count) * u64::from(BAR_SEGMENTS) / u64::from(self.goal);
        filled.min(u64::from(BAR_SEGMENTS)) as u32
    }

    /// Unclamped count/goal ratio.
    pub fn ratio(&self) -> f64 {
        if self.goal == 0 {
            return 1.0;
        }
        f64::from(self.count) / f64::from(self.goal)
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.goal
    }
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.filled();
        for i in 0..BAR_SEGMENTS {
            write!(f, "{}", if i < filled { FILLED } else { EMPTY })?;
        }
        Ok(())
    }
}

/// One day's total measured against the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayProgress {
    pub day: NaiveDate,
    pub count: u32,
    pub goal: u32,
}

impl DayProgress {
    fn from_record(record: &DailyRecord, goal: u32) -> Self {
        Self {
            day: record.day,
            count: record.count,
            goal,
        }
    }

    pub fn bar(&self) -> ProgressBar {
        ProgressBar::new(self.count, self.goal)
    }

    pub fn goal_met(&self) -> bool {
        self.count >= self.goal
    }

    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.count)
    }
}

/// Recent active days, most recent first.
///
/// Days without a record are absent, not zero. Iterating does not consume
/// the history, so it can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct History {
    days: Vec<DayProgress>,
}

impl History {
    pub fn iter(&self) -> std::slice::Iter<'_, DayProgress> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn latest(&self) -> Option<&DayProgress> {
        self.days.first()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a DayProgress;
    type IntoIter = std::slice::Iter<'a, DayProgress>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// Read-only queries over the record store.
#[derive(Clone)]
pub struct ProgressReporter {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    goal: u32,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, goal: u32) -> Self {
        Self { store, clock, goal }
    }

    /// Today's progress, or `None` when nothing was logged today yet.
    pub fn today_progress(&self, user: UserId) -> Result<Option<DayProgress>> {
        let day = self.clock.today();
        let count = self.store.get(user, day)?;
        Ok(count.map(|count| DayProgress {
            day,
            count,
            goal: self.goal,
        }))
    }

    /// Up to `window_days` most recent active days, newest first.
    pub fn recent_history(&self, user: UserId, window_days: usize) -> Result<History> {
        if window_days == 0 {
            return Ok(History::default());
        }
        let mut records = self.store.recent(user, window_days)?;
        records.sort_by(|a, b| b.day.cmp(&a.day));
        records.dedup_by_key(|r| r.day);
        records.truncate(window_days);
        Ok(History {
            days: records
                .iter()
                .map(|r| DayProgress::from_record(r, self.goal))
                .collect(),
        })
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }
}
