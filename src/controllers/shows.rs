use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::ListingError;
use crate::middleware::HtmlForm;
use crate::models::ShowForm;
use crate::store::ListingStore;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows))
        .route("/shows/create", post(create_show))
        .route("/shows/{id}", get(get_show))
        .route("/shows/{id}/edit", post(update_show))
        .route("/shows/{id}/delete", post(delete_show).delete(delete_show))
}

// GET /api/shows - все show с площадкой и артистом
async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ListingError> {
    let shows = state.store().list_shows().await?;
    Ok(Json(json!({ "success": true, "shows": shows, "count": shows.len() })))
}

// POST /api/shows/create
async fn create_show(
    State(state): State<Arc<AppState>>,
    HtmlForm(form): HtmlForm<ShowForm>,
) -> Result<impl IntoResponse, ListingError> {
    let show = state.store().create_show(form.into_new_show()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Show was successfully listed!",
            "show": show
        })),
    ))
}

async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let show = state.store().get_show(id).await?;
    Ok(Json(show))
}

async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    HtmlForm(form): HtmlForm<ShowForm>,
) -> Result<impl IntoResponse, ListingError> {
    let show = state.store().update_show(id, form.into_patch()?).await?;
    Ok(Json(json!({ "success": true, "show": show })))
}

async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    state.store().delete_show(id).await?;
    Ok(Json(json!({ "success": true })))
}
