pub mod artists;
pub mod shows;
pub mod venues;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ListingError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(venues::routes())
        .merge(artists::routes())
        .merge(shows::routes())
}

/// Форма поиска по имени
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

// Момент, относительно которого show делятся на прошедшие и предстоящие
pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let status = match &self {
            ListingError::NotFound { .. } => StatusCode::NOT_FOUND,
            ListingError::Validation(_) => StatusCode::BAD_REQUEST,
            ListingError::ForeignKey { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ListingError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let message = match &self {
            // Детали ошибки БД остаются в логах
            ListingError::StoreUnavailable(_) => "Connection to database failed.".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
