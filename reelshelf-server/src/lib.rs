//! HTTP surface of the reelshelf book and movie tracker.
#![allow(missing_docs)]

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{Router, http::HeaderValue, routing::get};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the complete application router.
pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config()
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    let cors_layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(reelshelf_model::api::routes::HEALTH, get(handlers::health::health))
        .merge(routes::create_api_router(state.clone()))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
