use snafu::{OptionExt, ResultExt};
use tracing::instrument;

use super::{
    Database, DatabaseDeserializeSnafu, DatabaseQuerySnafu, EmptyQuerySnafu, Result,
};
use crate::model::{OrderBy, ResetKind, ViewCounters};

pub const TABLE: &str = "counters";

#[instrument(skip(db))]
pub async fn get(item_id: &str, db: &Database) -> Result<Option<ViewCounters>> {
    db.select((TABLE, item_id))
        .await
        .context(DatabaseQuerySnafu)
}

#[instrument(skip(db))]
pub async fn create(record: ViewCounters, db: &Database) -> Result<ViewCounters> {
    db.create((TABLE, record.item_id.as_str()))
        .content(&record)
        .await
        .context(DatabaseQuerySnafu)?
        .context(EmptyQuerySnafu)
}

/// Writes the full record back under its item id. This is a plain
/// overwrite, not a compare-and-swap: the record the caller read may have
/// changed in the meantime, and the last writer wins. Creates the record
/// when it does not exist yet.
#[instrument(skip(db, record), fields(item_id = %record.item_id))]
pub async fn put(record: ViewCounters, db: &Database) -> Result<ViewCounters> {
    db.update((TABLE, record.item_id.as_str()))
        .content(&record)
        .await
        .context(DatabaseQuerySnafu)?
        .context(EmptyQuerySnafu)
}

#[instrument(skip(db))]
pub async fn delete(item_id: &str, db: &Database) -> Result<Option<ViewCounters>> {
    db.delete((TABLE, item_id))
        .await
        .context(DatabaseQuerySnafu)
}

/// Zeroes the windowed counter for `kind` on every record in one batched
/// statement. The statement names only that one field: in particular the
/// `last_daily_reset_at`/`last_weekly_reset_at` timestamps are owned by
/// the lazy view path and must survive a scheduled reset untouched.
#[instrument(skip(db))]
pub async fn reset_all(kind: ResetKind, db: &Database) -> Result<()> {
    let statement = match kind {
        ResetKind::Daily => "UPDATE counters SET daily_views = 0",
        ResetKind::Weekly => "UPDATE counters SET weekly_views = 0",
    };

    db.query(statement)
        .await
        .context(DatabaseQuerySnafu)?
        .check()
        .context(DatabaseQuerySnafu)?;

    Ok(())
}

#[instrument(skip(db))]
pub async fn top(order: OrderBy, limit: usize, db: &Database) -> Result<Vec<ViewCounters>> {
    let statement = match order {
        OrderBy::TotalViews => "SELECT * FROM counters ORDER BY total_views DESC LIMIT $limit",
        OrderBy::DailyViews => "SELECT * FROM counters ORDER BY daily_views DESC LIMIT $limit",
        OrderBy::WeeklyViews => "SELECT * FROM counters ORDER BY weekly_views DESC LIMIT $limit",
    };

    let mut response = db
        .query(statement)
        .bind(("limit", limit))
        .await
        .context(DatabaseQuerySnafu)?;

    response.take(0).context(DatabaseDeserializeSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    use crate::model::Timestamp;

    fn day(d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
    }

    fn seeded(item_id: &str, total: u64, daily: u64, weekly: u64) -> ViewCounters {
        ViewCounters {
            item_id: item_id.to_string(),
            total_views: total,
            daily_views: daily,
            weekly_views: weekly,
            last_daily_reset_at: Some(day(1)),
            last_weekly_reset_at: Some(day(1)),
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let db = Database::memory().await;

        let created = create(ViewCounters::fresh("comic-1"), &db).await.unwrap();
        assert_eq!(created, ViewCounters::fresh("comic-1"));

        let fetched = get("comic-1", &db).await.unwrap();
        assert_eq!(fetched, Some(created));

        assert_eq!(get("comic-2", &db).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites_the_whole_record() {
        let db = Database::memory().await;
        create(ViewCounters::fresh("comic-1"), &db).await.unwrap();

        let updated = put(seeded("comic-1", 10, 2, 7), &db).await.unwrap();
        assert_eq!(updated.total_views, 10);

        let fetched = get("comic-1", &db).await.unwrap().unwrap();
        assert_eq!(fetched, seeded("comic-1", 10, 2, 7));
    }

    #[tokio::test]
    async fn put_creates_a_missing_record() {
        let db = Database::memory().await;

        put(seeded("comic-1", 1, 1, 1), &db).await.unwrap();

        let fetched = get("comic-1", &db).await.unwrap().unwrap();
        assert_eq!(fetched.total_views, 1);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let db = Database::memory().await;
        create(ViewCounters::fresh("comic-1"), &db).await.unwrap();

        assert!(delete("comic-1", &db).await.unwrap().is_some());
        assert_eq!(get("comic-1", &db).await.unwrap(), None);
        assert!(delete("comic-1", &db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reset_all_touches_only_its_own_column() {
        let db = Database::memory().await;
        create(seeded("comic-1", 10, 3, 8), &db).await.unwrap();
        create(seeded("comic-2", 20, 5, 9), &db).await.unwrap();

        reset_all(ResetKind::Daily, &db).await.unwrap();

        for item in ["comic-1", "comic-2"] {
            let record = get(item, &db).await.unwrap().unwrap();
            assert_eq!(record.daily_views, 0);
            assert_ne!(record.weekly_views, 0, "weekly counter must survive a daily reset");
            assert_eq!(record.last_daily_reset_at, Some(day(1)), "rollover timestamps belong to the view path");
            assert_eq!(record.last_weekly_reset_at, Some(day(1)));
        }
    }

    #[tokio::test]
    async fn top_orders_descending_and_limits() {
        let db = Database::memory().await;
        create(seeded("low", 1, 30, 2), &db).await.unwrap();
        create(seeded("high", 100, 10, 1), &db).await.unwrap();
        create(seeded("mid", 50, 20, 3), &db).await.unwrap();

        let by_total = top(OrderBy::TotalViews, 10, &db).await.unwrap();
        let ids: Vec<&str> = by_total.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, ["high", "mid", "low"]);

        let by_daily = top(OrderBy::DailyViews, 2, &db).await.unwrap();
        let ids: Vec<&str> = by_daily.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, ["low", "mid"]);

        let by_weekly = top(OrderBy::WeeklyViews, 10, &db).await.unwrap();
        let ids: Vec<&str> = by_weekly.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, ["mid", "low", "high"]);
    }
}
