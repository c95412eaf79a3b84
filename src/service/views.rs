use tracing::instrument;

use crate::database::{counters, Database, Result};
use crate::model::{Timestamp, ViewCounters};
use crate::window;

/// Applies a single view to a counter record.
///
/// The windowed counters roll over lazily: a view is the first of a fresh
/// window when the record has never rolled over, or when its last rollover
/// happened on a different calendar day (resp. ISO week) than `now`. The
/// rollover timestamps advance only on a genuine crossing, so within a
/// window every view lands in the same tally.
pub fn apply_view(current: ViewCounters, now: Timestamp) -> ViewCounters {
    let is_new_day = current
        .last_daily_reset_at
        .map_or(true, |last| !window::same_calendar_day(last, now));
    let is_new_week = current
        .last_weekly_reset_at
        .map_or(true, |last| !window::same_iso_week(last, now));

    ViewCounters {
        item_id: current.item_id,
        total_views: current.total_views + 1,
        daily_views: if is_new_day { 1 } else { current.daily_views + 1 },
        weekly_views: if is_new_week { 1 } else { current.weekly_views + 1 },
        last_daily_reset_at: if is_new_day {
            Some(now)
        } else {
            current.last_daily_reset_at
        },
        last_weekly_reset_at: if is_new_week {
            Some(now)
        } else {
            current.last_weekly_reset_at
        },
    }
}

/// Records one view event for `item_id`.
///
/// Read-then-write with no compare-and-swap: two concurrent calls for the
/// same item can read the same base record and the last writer wins. A
/// failed read or write drops this increment and nothing more; the display
/// flow that triggered the view is never blocked and never retried.
#[instrument(skip(db))]
pub async fn record_view(item_id: &str, now: Timestamp, db: &Database) {
    if let Err(err) = try_record_view(item_id, now, db).await {
        tracing::error!(item_id, error = %err, "could not record view, increment dropped");
    }
}

async fn try_record_view(item_id: &str, now: Timestamp, db: &Database) -> Result<ViewCounters> {
    // A missing record counts as a fresh one so that items which predate
    // the counter subsystem still start accumulating on first view.
    let current = counters::get(item_id, db)
        .await?
        .unwrap_or_else(|| ViewCounters::fresh(item_id));

    counters::put(apply_view(current, now), db).await
}
