use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snafu::Snafu;

use crate::database::DatabaseError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    /// no counter record exists for item `{item_id}`
    UnknownItem { item_id: String },

    /// a counter record already exists for item `{item_id}`
    ItemExists { item_id: String },

    #[snafu(transparent)]
    Database { source: DatabaseError },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownItem { .. } => StatusCode::NOT_FOUND,
            ApiError::ItemExists { .. } => StatusCode::CONFLICT,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, self.to_string()).into_response()
    }
}
