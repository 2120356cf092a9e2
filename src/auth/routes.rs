//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/login` - Local credential login
/// - `POST /api/auth/register` - Local account registration
/// - `GET /api/auth/google` - Redirect to the Google consent screen
/// - `GET|POST /api/auth/google/callback` - Google OAuth callback
/// - `GET /api/auth/facebook` - Redirect to the Facebook dialog
/// - `GET|POST /api/auth/facebook/callback` - Facebook OAuth callback
/// - `GET /api/auth/users` - List identities
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/google", get(handlers::google_login))
        .route(
            "/api/auth/google/callback",
            get(handlers::google_callback_get).post(handlers::google_callback_post),
        )
        .route("/api/auth/facebook", get(handlers::facebook_login))
        .route(
            "/api/auth/facebook/callback",
            get(handlers::facebook_callback_get).post(handlers::facebook_callback_post),
        )
        .route("/api/auth/users", get(handlers::list_users))
}
