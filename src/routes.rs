//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{code}`  - Short link redirect (public, not rate limited)
//! - `/api/*`          - REST API, see [`crate::api::routes`]
//! - `GET  /`          - Single page frontend
//! - `/assets/*`       - Frontend assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-client token bucket on protected API routes,
//!   applied before authentication
//! - **Authentication** - Bearer session token on protected API routes
//! - **Path normalization** - Trailing slash handling

use std::path::Path;

use crate::api;
use crate::api::handlers::redirect_handler;
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Constructs the application router with all routes and middleware.
///
/// `static_dir` holds `index.html` and the frontend assets.
pub fn app_router(state: AppState, static_dir: impl AsRef<Path>) -> NormalizePath<Router> {
    let static_dir = static_dir.as_ref();

    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::layer,
        ));

    let api_router = api::routes::public_routes().merge(protected);

    let router = Router::new()
        .route("/r/{code}", get(redirect_handler))
        .nest("/api", api_router)
        .nest_service("/assets", ServeDir::new(static_dir))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
