use std::time::Duration;

use chrono::{Datelike, FixedOffset, NaiveTime, Weekday};
use once_cell::sync::OnceCell;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::model::Timestamp;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

static TIMEZONE: OnceCell<FixedOffset> = OnceCell::new();

/// Installs the process-wide timezone used for every day and week identity
/// decision. The first caller wins; later calls are ignored. Falls back to
/// UTC when never installed.
pub fn set_timezone(tz: FixedOffset) {
    TIMEZONE.set(tz).ok();
}

pub fn timezone() -> FixedOffset {
    *TIMEZONE.get_or_init(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
}

/// Whether two instants fall on the same calendar day of the configured
/// timezone.
pub fn same_calendar_day(a: Timestamp, b: Timestamp) -> bool {
    same_calendar_day_in(timezone(), a, b)
}

/// Whether two instants fall in the same ISO 8601 week of the configured
/// timezone. Weeks start on Monday; week numbering follows ISO rules, so
/// the pair (ISO year, week number) is the window identity.
pub fn same_iso_week(a: Timestamp, b: Timestamp) -> bool {
    same_iso_week_in(timezone(), a, b)
}

fn same_calendar_day_in(tz: FixedOffset, a: Timestamp, b: Timestamp) -> bool {
    a.with_timezone(&tz).date_naive() == b.with_timezone(&tz).date_naive()
}

fn same_iso_week_in(tz: FixedOffset, a: Timestamp, b: Timestamp) -> bool {
    a.with_timezone(&tz).iso_week() == b.with_timezone(&tz).iso_week()
}

/// A timer that first fires at the next wall-clock occurrence of `at` and
/// then once per day. Firings that the host sleeps through are skipped,
/// not replayed.
pub fn daily_timer(at: NaiveTime, now: Timestamp) -> Interval {
    timer(duration_until_daily(timezone(), at, now), DAY)
}

/// A timer that first fires at the next occurrence of `at` on the weekday
/// `on` and then once per week.
pub fn weekly_timer(on: Weekday, at: NaiveTime, now: Timestamp) -> Interval {
    timer(duration_until_weekly(timezone(), on, at, now), WEEK)
}

fn timer(start_in: Duration, period: Duration) -> Interval {
    let start = Instant::now() + start_in;

    let mut timer = interval_at(start, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    timer
}

/// Time until the next occurrence of `at` (wall clock of `tz`) strictly
/// after `now`.
fn duration_until_daily(tz: FixedOffset, at: NaiveTime, now: Timestamp) -> Duration {
    let local = now.with_timezone(&tz).naive_local();

    let mut next = local.date().and_time(at);
    if next <= local {
        next += chrono::Duration::days(1);
    }

    (next - local)
        .to_std()
        .expect("next occurrence is strictly in the future")
}

/// Time until the next occurrence of `at` on the weekday `on` strictly
/// after `now`.
fn duration_until_weekly(tz: FixedOffset, on: Weekday, at: NaiveTime, now: Timestamp) -> Duration {
    let local = now.with_timezone(&tz).naive_local();

    let days_ahead =
        (on.num_days_from_monday() + 7 - local.weekday().num_days_from_monday()) % 7;
    let mut next = (local.date() + chrono::Duration::days(days_ahead as i64)).and_time(at);
    if next <= local {
        next += chrono::Duration::days(7);
    }

    (next - local)
        .to_std()
        .expect("next occurrence is strictly in the future")
}
