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
use crate::models::{ArtistPatch, NewArtist};
use crate::store::ListingStore;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/artists", get(list_artists))
        .route("/artists/areas", get(artist_areas))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", post(create_artist))
        .route("/artists/{id}", get(show_artist))
        .route("/artists/{id}/edit", get(edit_artist).post(update_artist))
        .route("/artists/{id}/delete", post(delete_artist).delete(delete_artist))
}

async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ListingError> {
    let artists = state.listings.artists(now()).await?;
    Ok(Json(json!({ "success": true, "artists": artists })))
}

async fn artist_areas(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ListingError> {
    let areas = state.store().artist_areas().await?;
    Ok(Json(json!({ "success": true, "areas": areas })))
}

async fn search_artists(
    State(state): State<Arc<AppState>>,
    HtmlForm(form): HtmlForm<SearchForm>,
) -> Result<impl IntoResponse, ListingError> {
    let results = state.listings.search_artists(&form.search_term, now()).await?;
    Ok(Json(json!({
        "success": true,
        "search_term": form.search_term,
        "results": results
    })))
}

async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let artist = state.listings.artist_detail(id, now()).await?;
    Ok(Json(artist))
}

async fn create_artist(
    State(state): State<Arc<AppState>>,
    HtmlForm(form): HtmlForm<NewArtist>,
) -> Result<impl IntoResponse, ListingError> {
    let artist = state.store().create_artist(form).await?;
    let message = format!("Artist {} was successfully listed!", artist.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": message, "artist": artist })),
    ))
}

async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let artist = state.store().get_artist(id).await?;
    Ok(Json(artist))
}

async fn update_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    HtmlForm(patch): HtmlForm<ArtistPatch>,
) -> Result<impl IntoResponse, ListingError> {
    let artist = state.store().update_artist(id, patch).await?;
    Ok(Json(json!({ "success": true, "artist": artist })))
}

async fn delete_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ListingError> {
    let removed_shows = state.store().delete_artist(id).await?;
    Ok(Json(json!({ "success": true, "deleted_shows": removed_shows })))
}
