//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /r/{code}`
///
/// # Request Flow
///
/// 1. Cache lookup (key `url:{code}`)
/// 2. On a miss, store lookup; the cache write is queued
/// 3. Click increment is queued
/// 4. `302 Found` to the target
///
/// A failing cache is an error, not a fallback to the store.
///
/// # Errors
///
/// Returns 404 Not Found if the code doesn't exist.
/// Returns 500 Internal Server Error on cache or store failures.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.link_service.resolve_short_link(&code).await?;

    // axum's `Redirect` has no 302 constructor
    Ok((StatusCode::FOUND, [(header::LOCATION, target)]))
}
