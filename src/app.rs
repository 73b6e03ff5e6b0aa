//! Application state and HTTP router construction.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::db::Database;
use crate::services::{AuthConfig, AuthService, PostService};

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
}

impl AppState {
    /// Wire services over an already-migrated database
    pub fn new(config: Config, db: Database) -> Self {
        let auth = AuthService::new(AuthConfig::from(&config));
        Self {
            config: Arc::new(config),
            posts: Arc::new(PostService::new(db.clone())),
            auth: Arc::new(auth),
            db,
        }
    }
}

/// Build the full Axum router: health endpoints, /api, and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .nest("/api", api::posts::router(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
