pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::{Config, StoreBackend};
use services::listing::ListingService;
use store::{ListingStore, MemoryStore, PgStore};

// Shared state для всего приложения; создаётся при старте процесса
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub listings: ListingService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn ListingStore> = match config.store.backend {
            StoreBackend::Postgres => {
                let url = config
                    .database
                    .url
                    .as_deref()
                    .context("DATABASE_URL must be set for the postgres store")?;
                let store = PgStore::connect(url, &config.database)
                    .await
                    .context("Failed to connect to database")?;
                store.migrate().await.context("Failed to run migrations")?;
                Arc::new(store)
            }
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn ListingStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            listings: ListingService::new(store),
        })
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        self.listings.store()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Venue Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
