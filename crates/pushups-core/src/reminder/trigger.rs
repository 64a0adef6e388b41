//! Trigger-instant arithmetic.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone};

/// The earliest instant strictly after `now` whose time of day is `at`.
///
/// Before `at` this is today at `at`; at or after `at` it is tomorrow.
/// The result is always in the future relative to `now`, so feeding the
/// previous trigger back in yields the next day's trigger.
pub fn next_trigger_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Naive wall-clock gap from `now` to `until`; zero if `until` has passed.
pub fn time_until(now: NaiveDateTime, until: NaiveDateTime) -> std::time::Duration {
    (until - now).to_std().unwrap_or(std::time::Duration::ZERO)
}

/// Real elapsed time from `now` until the local wall-clock time `until` in
/// the same zone; zero if it has passed.
///
/// Differs from [`time_until`] across DST changes: the evening after a
/// spring-forward night is 23 real hours away, not 24. An ambiguous `until`
/// resolves to its earlier instant. An `until` inside a skipped hour
/// resolves to the same reading one hour later.
pub fn time_until_in<Tz: TimeZone>(
    now: &DateTime<Tz>,
    until: NaiveDateTime,
) -> std::time::Duration {
    let tz = now.timezone();
    let target = tz
        .from_local_datetime(&until)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(until + Duration::hours(1))).earliest());
    match target {
        Some(target) => (target - now.clone())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO),
        None => time_until(now.naive_local(), until),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, LocalResult, NaiveDate};

    /// US Eastern time around the 2024-03-10 spring-forward change
    /// (02:00 EST -> 03:00 EDT, 07:00 UTC).
    #[derive(Debug, Clone, Copy)]
    struct Eastern2024;

    impl Eastern2024 {
        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }
        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }
        fn switch_utc() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap()
        }
    }

    impl TimeZone for Eastern2024 {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            Eastern2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch_utc() - Duration::hours(5);
            if *local < gap_start {
                LocalResult::Single(Self::est())
            } else if *local < gap_start + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::edt())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_utc() {
                Self::est()
            } else {
                Self::edt()
            }
        }
    }

    fn eastern(month: u32, day: u32, h: u32, m: u32) -> DateTime<Eastern2024> {
        Eastern2024
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, month, day)
                    .unwrap()
                    .and_hms_opt(h, m, 0)
                    .unwrap(),
            )
            .single()
            .unwrap()
    }

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn eight_pm() -> NaiveTime {
        NaiveTime::from_hms_opt(20, 0, 0).unwrap()
    }

    #[test]
    fn before_trigger_fires_today() {
        assert_eq!(next_trigger_after(at(1, 9, 15, 0), eight_pm()), at(1, 20, 0, 0));
        assert_eq!(next_trigger_after(at(1, 19, 59, 59), eight_pm()), at(1, 20, 0, 0));
    }

    #[test]
    fn at_or_after_trigger_fires_tomorrow() {
        assert_eq!(next_trigger_after(at(1, 20, 0, 0), eight_pm()), at(2, 20, 0, 0));
        assert_eq!(next_trigger_after(at(1, 23, 59, 0), eight_pm()), at(2, 20, 0, 0));
    }

    #[test]
    fn crosses_month_boundary() {
        assert_eq!(
            next_trigger_after(at(31, 21, 0, 0), eight_pm()),
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn chained_triggers_advance_one_day_each() {
        let mut t = next_trigger_after(at(1, 8, 0, 0), eight_pm());
        for day in 1..=10 {
            assert_eq!(t, at(day, 20, 0, 0));
            let next = next_trigger_after(t, eight_pm());
            assert!(next > t);
            t = next;
        }
    }

    #[test]
    fn time_until_never_negative() {
        assert_eq!(
            time_until(at(1, 20, 0, 1), at(1, 20, 0, 0)),
            std::time::Duration::ZERO
        );
        assert_eq!(
            time_until(at(1, 19, 0, 0), at(1, 20, 0, 0)),
            std::time::Duration::from_secs(3600)
        );
    }

    #[test]
    fn spring_forward_evening_is_23_real_hours_away() {
        let now = eastern(3, 9, 20, 0);
        let next = next_trigger_after(now.naive_local(), eight_pm());
        assert_eq!(next, eastern(3, 10, 20, 0).naive_local());

        assert_eq!(
            time_until_in(&now, next),
            std::time::Duration::from_secs(23 * 3600)
        );
        assert_eq!(
            time_until(now.naive_local(), next),
            std::time::Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn ordinary_day_is_24_real_hours() {
        let now = eastern(3, 8, 20, 0);
        let next = next_trigger_after(now.naive_local(), eight_pm());
        assert_eq!(
            time_until_in(&now, next),
            std::time::Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn skipped_hour_resolves_one_hour_later() {
        let now = eastern(3, 10, 1, 0);
        let in_gap = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        // 01:00 EST to 03:30 EDT.
        assert_eq!(
            time_until_in(&now, in_gap),
            std::time::Duration::from_secs(90 * 60)
        );
    }

    #[test]
    fn real_time_until_never_negative() {
        let now = eastern(3, 9, 20, 5);
        assert_eq!(
            time_until_in(&now, eastern(3, 9, 20, 0).naive_local()),
            std::time::Duration::ZERO
        );
    }
}
