//! Wall-clock abstraction.
//!
//! "Today" and the reminder trigger instant are both resolved in the host's
//! local timezone. Everything time-dependent takes a [`Clock`] so tests can
//! move time without sleeping.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

use crate::reminder::{time_until, time_until_in};

pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Real time left until the local wall-clock time `target`.
    fn until(&self, target: NaiveDateTime) -> std::time::Duration {
        time_until(self.now(), target)
    }
}

/// The host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn until(&self, target: NaiveDateTime) -> std::time::Duration {
        time_until_in(&Local::now(), target)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, to: NaiveDateTime) {
        *self.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

/// Wall clock driven by tokio's monotonic clock from a fixed origin.
///
/// Follows `tokio::time::pause` and `advance`, so a scheduler using it can
/// be run across several days of simulated time without real waiting.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin_wall: NaiveDateTime,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(wall: NaiveDateTime) -> Self {
        Self {
            origin_wall: wall,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = Duration::from_std(self.origin.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.origin_wall + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_across_midnight() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.today(), start.date());

        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn clones_share_time() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        let other = clock.clone();
        clock.advance(Duration::minutes(5));
        assert_eq!(other.now(), start + Duration::minutes(5));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let clock = TokioClock::starting_at(start);
        tokio::time::advance(std::time::Duration::from_secs(2 * 3600)).await;
        assert_eq!(clock.now(), start + Duration::hours(2));
    }
}
