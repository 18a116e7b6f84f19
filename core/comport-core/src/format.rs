//! Human-readable time labels for history rows.
//!
//! Labels depend on the whole visible record set: "Just now" is only used
//! when at most one record changed within the last 30 seconds. When several
//! did, every one of them gets an exact seconds label instead so the rows
//! can still be told apart.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::types::HistoryRecord;

/// Records younger than this compete for the "Just now" label.
pub const JUST_NOW_WINDOW_SECS: i64 = 30;

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * 60;

const TIME_OF_DAY_FORMAT: &str = "%H:%M";
const SHORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Age in whole seconds, with future timestamps clamped to zero.
fn age_secs(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> i64 {
    now.signed_duration_since(timestamp).num_seconds().max(0)
}

/// Whether "Just now" may be used for any record in this set.
///
/// Startup records and timestamps in the future never count.
pub fn just_now_allowed<'a, I>(records: I, now: DateTime<Utc>) -> bool
where
    I: IntoIterator<Item = &'a HistoryRecord>,
{
    let recent = records
        .into_iter()
        .filter_map(HistoryRecord::relevant_timestamp)
        .filter(|t| {
            let age = now.signed_duration_since(*t).num_seconds();
            (0..JUST_NOW_WINDOW_SECS).contains(&age)
        })
        .count();
    recent <= 1
}

/// Formats one timestamp in the local timezone.
pub fn format_time_label(
    now: DateTime<Utc>,
    timestamp: Option<DateTime<Utc>>,
    just_now_allowed: bool,
) -> String {
    format_time_label_in(now, timestamp, just_now_allowed, &Local)
}

/// Formats one timestamp, resolving calendar days in `tz`.
///
/// `None` is the startup sentinel.
pub fn format_time_label_in<Tz>(
    now: DateTime<Utc>,
    timestamp: Option<DateTime<Utc>>,
    just_now_allowed: bool,
    tz: &Tz,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(timestamp) = timestamp else {
        return "Startup".to_string();
    };
    let timestamp = timestamp.min(now);
    let age = age_secs(now, timestamp);

    if just_now_allowed && age < JUST_NOW_WINDOW_SECS {
        return "Just now".to_string();
    }
    if !just_now_allowed && age < MINUTE_SECS {
        return format!("{}s", age);
    }
    if age < MINUTE_SECS {
        return "1 minute ago".to_string();
    }
    if age < HOUR_SECS {
        let minutes = age / MINUTE_SECS;
        return format!(
            "{} minute{} ago",
            minutes,
            if minutes == 1 { "" } else { "s" }
        );
    }

    let local_now = now.with_timezone(tz);
    let local_ts = timestamp.with_timezone(tz);
    let today = local_now.date_naive();
    let day = local_ts.date_naive();

    if day == today {
        return local_ts.format(TIME_OF_DAY_FORMAT).to_string();
    }
    if today.pred_opt() == Some(day) {
        return "Yesterday".to_string();
    }
    local_ts.format(SHORT_DATE_FORMAT).to_string()
}

/// Labels for a full record set, in the same order, using the local timezone.
pub fn format_labels<'a, I>(records: I, now: DateTime<Utc>) -> Vec<String>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
    I::IntoIter: Clone,
{
    format_labels_in(records, now, &Local)
}

pub fn format_labels_in<'a, I, Tz>(records: I, now: DateTime<Utc>, tz: &Tz) -> Vec<String>
where
    I: IntoIterator<Item = &'a HistoryRecord>,
    I::IntoIter: Clone,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let records = records.into_iter();
    let allowed = just_now_allowed(records.clone(), now);
    records
        .map(|r| format_time_label_in(now, r.relevant_timestamp(), allowed, tz))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid")
            .with_timezone(&Utc)
    }

    fn label(now: DateTime<Utc>, age_secs: i64, allowed: bool) -> String {
        format_time_label_in(now, Some(now - Duration::seconds(age_secs)), allowed, &Utc)
    }

    fn connected_record(device: &str, at: Option<DateTime<Utc>>) -> HistoryRecord {
        HistoryRecord {
            device_id: device.to_string(),
            display_name: "USB Serial Device".to_string(),
            hardware_id: None,
            connected: true,
            connected_at: at,
            disconnected_at: None,
        }
    }

    #[test]
    fn test_startup_sentinel() {
        let now = ts("2026-03-01T12:00:00Z");
        assert_eq!(format_time_label_in(now, None, true, &Utc), "Startup");
        assert_eq!(format_time_label_in(now, None, false, &Utc), "Startup");
    }

    #[test]
    fn test_just_now_when_allowed() {
        let now = ts("2026-03-01T12:00:00Z");
        assert_eq!(label(now, 0, true), "Just now");
        assert_eq!(label(now, 29, true), "Just now");
    }

    #[test]
    fn test_exact_seconds_when_not_allowed() {
        let now = ts("2026-03-01T12:00:00Z");
        assert_eq!(label(now, 0, false), "0s");
        assert_eq!(label(now, 12, false), "12s");
        assert_eq!(label(now, 59, false), "59s");
    }

    #[test]
    fn test_one_minute_ago_between_30_and_60_seconds() {
        let now = ts("2026-03-01T12:00:00Z");
        assert_eq!(label(now, 30, true), "1 minute ago");
        assert_eq!(label(now, 59, true), "1 minute ago");
    }

    #[test]
    fn test_minutes_singular_and_plural() {
        let now = ts("2026-03-01T12:00:00Z");
        assert_eq!(label(now, 60, true), "1 minute ago");
        assert_eq!(label(now, 119, false), "1 minute ago");
        assert_eq!(label(now, 120, true), "2 minutes ago");
        assert_eq!(label(now, 3599, true), "59 minutes ago");
    }

    #[test]
    fn test_same_day_shows_time_of_day() {
        let now = ts("2026-03-01T12:00:00Z");
        let at = ts("2026-03-01T09:05:00Z");
        assert_eq!(format_time_label_in(now, Some(at), true, &Utc), "09:05");
    }

    #[test]
    fn test_previous_day_is_yesterday() {
        let now = ts("2026-03-01T00:30:00Z");
        let at = ts("2026-02-28T22:00:00Z");
        assert_eq!(format_time_label_in(now, Some(at), true, &Utc), "Yesterday");
    }

    #[test]
    fn test_yesterday_across_year_boundary() {
        let now = ts("2026-01-01T08:00:00Z");
        let at = ts("2025-12-31T06:00:00Z");
        assert_eq!(format_time_label_in(now, Some(at), true, &Utc), "Yesterday");
    }

    #[test]
    fn test_older_shows_short_date() {
        let now = ts("2026-03-01T12:00:00Z");
        let at = ts("2026-02-20T12:00:00Z");
        assert_eq!(
            format_time_label_in(now, Some(at), true, &Utc),
            "2026-02-20"
        );
    }

    #[test]
    fn test_calendar_day_uses_given_timezone() {
        // 23:30 UTC on Feb 28 is already Mar 1 at UTC+2, same day as `now`
        let now = ts("2026-03-01T10:00:00Z");
        let at = ts("2026-02-28T23:30:00Z");
        let plus_two = FixedOffset::east_opt(2 * 3600).expect("offset");
        assert_eq!(format_time_label_in(now, Some(at), true, &plus_two), "01:30");
        assert_eq!(format_time_label_in(now, Some(at), true, &Utc), "Yesterday");
    }

    #[test]
    fn test_future_timestamp_clamps_to_now() {
        let now = ts("2026-03-01T12:00:00Z");
        let future = now + Duration::seconds(90);
        assert_eq!(format_time_label_in(now, Some(future), true, &Utc), "Just now");
        assert_eq!(format_time_label_in(now, Some(future), false, &Utc), "0s");
    }

    #[test]
    fn test_just_now_allowed_counts_recent_records() {
        let now = ts("2026-03-01T12:00:00Z");
        let lone = vec![
            connected_record("COM1:", Some(now - Duration::seconds(3))),
            connected_record("COM2:", None),
            connected_record("COM3:", Some(now - Duration::seconds(300))),
        ];
        assert!(just_now_allowed(&lone, now));

        let pair = vec![
            connected_record("COM1:", Some(now - Duration::seconds(3))),
            connected_record("COM2:", Some(now - Duration::seconds(4))),
        ];
        assert!(!just_now_allowed(&pair, now));
    }

    #[test]
    fn test_format_labels_suppresses_just_now_for_pairs() {
        let now = ts("2026-03-01T12:00:00Z");
        let records = vec![
            connected_record("COM1:", Some(now)),
            connected_record("COM2:", Some(now - Duration::seconds(1))),
            connected_record("COM3:", None),
        ];
        assert_eq!(
            format_labels_in(&records, now, &Utc),
            vec!["0s", "1s", "Startup"]
        );
    }
}
