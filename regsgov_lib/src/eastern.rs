//! Conversion from the API's UTC response timestamps to the US Eastern
//! wall-clock time its `lastModifiedDate` filters expect.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};

/// Converts a UTC instant to Eastern wall-clock time, truncated to whole seconds.
pub fn to_eastern(at: DateTime<Utc>) -> NaiveDateTime {
    let offset_hours = if is_daylight_time(at) { 4 } else { 5 };
    let local = at.naive_utc() - Duration::hours(offset_hours);
    local.with_nanosecond(0).unwrap_or(local)
}

/// Whether US Eastern daylight saving time is in effect at `at`.
pub fn is_daylight_time(at: DateTime<Utc>) -> bool {
    match dst_window(at.year()) {
        Some((start, end)) => {
            let naive = at.naive_utc();
            naive >= start && naive < end
        }
        None => false,
    }
}

/// DST start and end for a year, as UTC instants.
///
/// Since 2007: second Sunday of March to first Sunday of November.
/// 1987-2006: first Sunday of April to last Sunday of October.
/// Transitions happen at 02:00 local time (07:00 UTC in, 06:00 UTC out).
fn dst_window(year: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let (start, end) = if year >= 2007 {
        (
            NaiveDate::from_weekday_of_month_opt(year, 3, Weekday::Sun, 2)?,
            NaiveDate::from_weekday_of_month_opt(year, 11, Weekday::Sun, 1)?,
        )
    } else {
        (
            NaiveDate::from_weekday_of_month_opt(year, 4, Weekday::Sun, 1)?,
            last_sunday(year, 10)?,
        )
    };
    Some((start.and_hms_opt(7, 0, 0)?, end.and_hms_opt(6, 0, 0)?))
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, 4))
}
