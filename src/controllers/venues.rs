use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::{now, SearchForm};
use crate::error::ListingError;
use crate::middleware::HtmlForm;
use crate::models::{NewVenue, VenuePatch};
use crate::store::ListingStore;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues))
        .route("/venues/areas", get(venue_areas))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", post(create_venue))
        .route("/venues/{id}", get(show_venue))
        .route("/venues/{id}/edit", get(edit_venue).post(update_venue))
        .route("/venues/{id}/delete", post(delete_venue).delete(delete_venue))
}

// GET /api/venues
async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ListingError> {
    let areas = state.listings.venue_groups(now()).await?;
    Ok(Json(json!({ "success": true, "areas": areas })))
}

// GET /api/venues/areas
async fn venue_areas(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ListingError> {
    let areas = state.store().venue_areas().await?;
    Ok(Json(json!({ "success": true, "areas": areas })))
}

// POST /api/venues/search
async fn search_venues(
    State(state): State<Arc<AppState>>,
    HtmlForm(form): HtmlForm<SearchForm>,
) -> Result<impl IntoResponse, ListingError> {
    let results = state.listings.search_venues(&form.search_term, now()).await?;
    Ok(Json(json!({
        "success": true,
        "search_term": form.search_term,
        "results": results
    })))
}

// GET /api/venues/{id}
async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let venue = state.listings.venue_detail(id, now()).await?;
    Ok(Json(venue))
}

// POST /api/venues/create
async fn create_venue(
    State(state): State<Arc<AppState>>,
    HtmlForm(form): HtmlForm<NewVenue>,
) -> Result<impl IntoResponse, ListingError> {
    let venue = state.store().create_venue(form).await?;
    let message = format!("Venue {} was successfully listed!", venue.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": message, "venue": venue })),
    ))
}

// GET /api/venues/{id}/edit - данные для заполнения формы
async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let venue = state.store().get_venue(id).await?;
    Ok(Json(venue))
}

// POST /api/venues/{id}/edit
async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    HtmlForm(patch): HtmlForm<VenuePatch>,
) -> Result<impl IntoResponse, ListingError> {
    let venue = state.store().update_venue(id, patch).await?;
    Ok(Json(json!({ "success": true, "venue": venue })))
}

// POST|DELETE /api/venues/{id}/delete
async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let removed_shows = state.store().delete_venue(id).await?;
    Ok(Json(json!({ "success": true, "deleted_shows": removed_shows })))
}
