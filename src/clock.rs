//! Clock presets: default and relative due times.
//!
//! Every function takes `now` explicitly together with the timezone that
//! defines "today", so results are reproducible in tests.

use crate::task::Timestamp;
use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};

/// Hour used for the default due time of new tasks.
pub const DEFAULT_DUE_HOUR: u32 = 18;

/// Minute-granularity relative presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePreset {
    /// +30 minutes.
    Minutes30,
    /// +1 hour.
    Hour1,
    /// +2 hours.
    Hours2,
    /// +4 hours.
    Hours4,
}

impl RelativePreset {
    /// Offset in minutes.
    #[must_use]
    pub fn minutes(self) -> i64 {
        match self {
            Self::Minutes30 => 30,
            Self::Hour1 => 60,
            Self::Hours2 => 120,
            Self::Hours4 => 240,
        }
    }

    /// Apply the preset to `now`.
    #[must_use]
    pub fn apply(self, now: Timestamp) -> Timestamp {
        relative(now, self.minutes())
    }
}

/// Convert a timestamp into the given timezone.
///
/// Out-of-range timestamps collapse to the epoch.
pub fn local_datetime<Tz: TimeZone>(ts: Timestamp, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Resolve a wall-clock time in `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; nonexistent
/// times (DST spring-forward) are shifted one hour forward.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(value) | LocalResult::Ambiguous(value, _) => Some(value),
        LocalResult::None => match tz.from_local_datetime(&(naive + chrono::Duration::hours(1))) {
            LocalResult::Single(value) | LocalResult::Ambiguous(value, _) => Some(value),
            LocalResult::None => None,
        },
    }
}

/// Timestamp of `date` at `hour:minute` local time.
pub fn at_local_time<Tz: TimeZone>(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    tz: &Tz,
) -> Option<Timestamp> {
    let time = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0)?;
    resolve_local(tz, date.and_time(time)).map(|dt| dt.timestamp())
}

/// Start of the local day containing `now`.
pub fn start_of_day<Tz: TimeZone>(now: Timestamp, tz: &Tz) -> Timestamp {
    let date = local_datetime(now, tz).date_naive();
    at_local_time(date, 0, 0, tz).unwrap_or(now)
}

/// Start of the local day after the one containing `now`.
pub fn start_of_next_day<Tz: TimeZone>(now: Timestamp, tz: &Tz) -> Timestamp {
    let date = local_datetime(now, tz).date_naive();
    date.checked_add_days(Days::new(1))
        .and_then(|next| at_local_time(next, 0, 0, tz))
        .unwrap_or_else(|| now.saturating_add(86_400))
}

/// Seed due time for a new task: 18:00 today, or 18:00 tomorrow once
/// today's 18:00 has been reached.
pub fn default_due_at<Tz: TimeZone>(now: Timestamp, tz: &Tz) -> Timestamp {
    let today = local_datetime(now, tz).date_naive();
    match at_local_time(today, DEFAULT_DUE_HOUR, 0, tz) {
        Some(target) if now < target => target,
        _ => tomorrow_at(now, DEFAULT_DUE_HOUR, 0, tz),
    }
}

/// `now` truncated to the minute, plus `minutes`.
#[must_use]
pub fn relative(now: Timestamp, minutes: i64) -> Timestamp {
    now.saturating_sub(now.rem_euclid(60))
        .saturating_add(minutes.saturating_mul(60))
}

/// Tomorrow at `hour:minute` local time.
pub fn tomorrow_at<Tz: TimeZone>(now: Timestamp, hour: u32, minute: u32, tz: &Tz) -> Timestamp {
    let today = local_datetime(now, tz).date_naive();
    today
        .checked_add_days(Days::new(1))
        .and_then(|date| at_local_time(date, hour, minute, tz))
        .unwrap_or_else(|| now.saturating_add(86_400))
}

/// The coming Sunday at 18:00, rolling to the following week once this
/// Sunday's 18:00 has passed.
pub fn next_sunday_1800<Tz: TimeZone>(now: Timestamp, tz: &Tz) -> Timestamp {
    let today = local_datetime(now, tz).date_naive();
    let days_ahead = (7 - today.weekday().num_days_from_sunday()) % 7;
    let this_sunday = today.checked_add_days(Days::new(u64::from(days_ahead)));
    match this_sunday.and_then(|date| at_local_time(date, DEFAULT_DUE_HOUR, 0, tz)) {
        Some(target) if target > now => target,
        _ => this_sunday
            .and_then(|date| date.checked_add_days(Days::new(7)))
            .and_then(|date| at_local_time(date, DEFAULT_DUE_HOUR, 0, tz))
            .unwrap_or_else(|| now.saturating_add(7 * 86_400)),
    }
}

/// Returns `true` for Monday through Friday.
#[must_use]
pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Next workday at `hour:minute`.
///
/// Today qualifies only if it is Monday to Friday and `hour:minute` is still
/// ahead of `now`.
pub fn next_workday<Tz: TimeZone>(now: Timestamp, hour: u32, minute: u32, tz: &Tz) -> Timestamp {
    let today = local_datetime(now, tz).date_naive();
    if is_workday(today) {
        if let Some(target) = at_local_time(today, hour, minute, tz) {
            if target > now {
                return target;
            }
        }
    }

    let mut date = today;
    // At most three steps (Friday -> Monday).
    for _ in 0..7 {
        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
        if is_workday(date) {
            if let Some(target) = at_local_time(date, hour, minute, tz) {
                return target;
            }
        }
    }
    now.saturating_add(86_400)
}
