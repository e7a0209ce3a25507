pub mod cache;
pub mod config;
pub mod controllers;
pub mod models;
pub mod remote_client;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub client: remote_client::RemoteClient,
    pub cache: cache::CacheService,
    pub sessions: services::registry::SessionRegistry,
    #[cfg(feature = "gallery")]
    pub gallery: services::gallery::GalleryService,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, remote_client::ClientError> {
        let client = remote_client::RemoteClient::new(&config.sources, &config.http)?;
        let cache = cache::CacheService::new(config.http.catalog_cache_ttl_seconds);

        Ok(Arc::new(Self {
            #[cfg(feature = "gallery")]
            gallery: services::gallery::GalleryService::new(client.clone(), cache.clone(), config.sources.clone()),
            client,
            cache,
            sessions: services::registry::SessionRegistry::new(),
            config,
        }))
    }
}

/// Полный роутер приложения.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Seat Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        .with_state(state)
        // страница бронирования открывается с другого origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
