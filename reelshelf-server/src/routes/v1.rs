use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    handlers::{auth, lists, profile, share},
    middleware::auth_middleware,
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoints
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Public share images
        .route("/share/{id}", get(share::share_image))
        .merge(create_protected_routes(state))
}

/// Routes that require a bearer token
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/books", get(lists::list_books).post(lists::add_book))
        .route("/movies", get(lists::list_movies).post(lists::add_movie))
        .route("/profile", delete(profile::delete_account))
        .route("/profile/stats", get(profile::stats))
        .route("/profile/share", post(profile::generate_share))
        .route("/profile/export", post(profile::export))
        .route("/profile/import", post(profile::import))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
