//! API route configuration.

use crate::api::handlers::{
    health_handler, links_handler, login_handler, register_handler, shorten_handler,
    stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes reachable without a session.
///
/// # Endpoints
///
/// - `GET  /health`    - Component health checks
/// - `POST /register`  - Create an account, returns a session token
/// - `POST /login`     - Exchange credentials for a session token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
}

/// Routes that require a Bearer session token and pass the rate limiter.
///
/// # Endpoints
///
/// - `POST /shorten`       - Create a short link
/// - `GET  /stats/{code}`  - Click count and creation time of a link
/// - `GET  /links`         - Links owned by the caller
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/stats/{code}", get(stats_handler))
        .route("/links", get(links_handler))
}
