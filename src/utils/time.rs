//! Time helpers
//!
//! Sales are stored with UTC epoch-millisecond timestamps; reports filter at
//! calendar-day granularity in UTC.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Millisecond bounds of an inclusive calendar-day range `[from, to]`.
///
/// Returns `(start, end)` where `start` is 00:00:00.000 UTC on `from` and
/// `end` is 00:00:00.000 UTC on the day after `to` (half-open on the right,
/// so every instant of `to` is included).
pub fn day_range_millis(from: NaiveDate, to: NaiveDate) -> (i64, i64) {
    let start = from.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    // The day after `to` overflows at the calendar's maximum date; clamp to
    // the last representable instant so the range still covers `to`.
    let end = to
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .checked_add_signed(TimeDelta::days(1))
        .unwrap_or(NaiveDateTime::MAX);
    (
        start.and_utc().timestamp_millis(),
        end.and_utc().timestamp_millis(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_range_covers_whole_last_day() {
        let from = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let (start, end) = day_range_millis(from, to);

        // 2025-11-30 23:59:59.999 falls inside the range
        let late = NaiveDate::from_ymd_opt(2025, 11, 30)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert!(late >= start && late < end);

        // 2025-12-01 00:00:00.000 does not
        let next = NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert!(next >= end);
    }

    #[test]
    fn range_ending_on_the_maximum_date_is_clamped_not_panicking() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let (start, end) = day_range_millis(from, NaiveDate::MAX);
        assert!(end > start);

        // The whole last day is still inside the range
        let late = NaiveDate::MAX
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert!(late >= start && late < end);
    }

    #[test]
    fn single_day_range_is_one_day_wide() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let (start, end) = day_range_millis(day, day);
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
    }
}
