use tracing::instrument;

use crate::database::{counters, Database, Result};
use crate::model::OrderBy;

/// Upper bound on a single ranked read; the consumer is a "most popular"
/// page, not an export.
const MAX_LIMIT: usize = 100;

/// Item ids ranked by the requested counter, most viewed first.
#[instrument(skip(db))]
pub async fn top_items(order: OrderBy, limit: usize, db: &Database) -> Result<Vec<String>> {
    let limit = limit.clamp(1, MAX_LIMIT);
    let records = counters::top(order, limit, db).await?;

    Ok(records.into_iter().map(|record| record.item_id).collect())
}
