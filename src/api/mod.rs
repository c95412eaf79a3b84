use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::database::counters;
use crate::model::{now, OrderBy, ViewCounters};
use crate::service::{popular, views};

pub use error::*;
pub use state::App;

mod error;
mod state;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn router(app: App) -> Router {
    Router::new()
        .route(
            "/items/:id",
            put(create_item).get(item_counters).delete(delete_item),
        )
        .route("/items/:id/views", post(record_view))
        .route("/popular", get(popular_items))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

/// The view trigger. Counter bookkeeping must never block or fail the
/// display flow that called us, so this always answers 204; a dropped
/// increment is logged inside the handler and nowhere else.
#[instrument(skip(app))]
async fn record_view(State(app): State<App>, Path(item_id): Path<String>) -> StatusCode {
    views::record_view(&item_id, now(), &app).await;

    StatusCode::NO_CONTENT
}

#[instrument(skip(app))]
async fn create_item(
    State(app): State<App>,
    Path(item_id): Path<String>,
) -> Result<(StatusCode, Json<ViewCounters>)> {
    if counters::get(&item_id, &app).await?.is_some() {
        return ItemExistsSnafu { item_id }.fail();
    }

    let record = counters::create(ViewCounters::fresh(&item_id), &app).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(app))]
async fn item_counters(
    State(app): State<App>,
    Path(item_id): Path<String>,
) -> Result<Json<ViewCounters>> {
    match counters::get(&item_id, &app).await? {
        Some(record) => Ok(Json(record)),
        None => UnknownItemSnafu { item_id }.fail(),
    }
}

#[instrument(skip(app))]
async fn delete_item(State(app): State<App>, Path(item_id): Path<String>) -> Result<StatusCode> {
    match counters::delete(&item_id, &app).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => UnknownItemSnafu { item_id }.fail(),
    }
}

#[derive(Debug, Deserialize)]
struct PopularQuery {
    #[serde(default)]
    by: OrderBy,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

#[instrument(skip(app))]
async fn popular_items(
    State(app): State<App>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<Vec<String>>> {
    let items = popular::top_items(query.by, query.limit, &app).await?;

    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum_test::TestServer;

    use crate::database::Database;

    fn server_with(database: Database) -> TestServer {
        TestServer::new(router(App::new(database))).expect("build the test server")
    }

    #[tokio::test]
    async fn record_lifecycle() {
        let server = server_with(Database::memory().await);

        let created = server.put("/items/comic-1").await;
        created.assert_status(StatusCode::CREATED);
        created.assert_json(&ViewCounters::fresh("comic-1"));

        server
            .put("/items/comic-1")
            .await
            .assert_status(StatusCode::CONFLICT);

        server
            .get("/items/comic-1")
            .await
            .assert_status(StatusCode::OK);

        server
            .delete("/items/comic-1")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/items/comic-1")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        server
            .delete("/items/comic-1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn view_trigger_always_answers_no_content() {
        let database = Database::memory().await;
        let server = server_with(database.clone());

        // Even for an item nobody created first.
        server
            .post("/items/comic-1/views")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let record = counters::get("comic-1", &database).await.unwrap().unwrap();
        assert_eq!(record.total_views, 1);
        assert_eq!(record.daily_views, 1);
        assert_eq!(record.weekly_views, 1);
    }

    #[tokio::test]
    async fn popular_returns_ranked_item_ids() {
        let database = Database::memory().await;

        for (item_id, total) in [("a", 3u64), ("b", 9), ("c", 6)] {
            let mut record = ViewCounters::fresh(item_id);
            record.total_views = total;
            counters::create(record, &database).await.unwrap();
        }

        let server = server_with(database);

        let response = server
            .get("/popular")
            .add_query_param("by", "total_views")
            .add_query_param("limit", 2)
            .await;

        response.assert_status(StatusCode::OK);
        response.assert_json(&serde_json::json!(["b", "c"]));
    }
}
