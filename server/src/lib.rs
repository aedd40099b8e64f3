pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod validation;

use std::sync::Arc;

use axum::{extract::FromRef, http::HeaderValue, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenService;
use config::Config;
use db::Database;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(TokenService::new(&config.secret_key, config.jwt_expiry_hours)),
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router: `/health` plus every resource under `/api`
pub fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", handlers::api_routes())
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
