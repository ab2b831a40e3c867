//! Handlers for link statistics and the caller's link list.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::api::dto::stats::{LinkSummary, StatsResponse};
use crate::api::middleware::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the click count and creation time of a short link.
///
/// # Endpoint
///
/// `GET /api/stats/{code}`
///
/// # Response
///
/// ```json
/// { "code": "abc123", "clicks": 42, "createdAt": "2025-01-01T12:00:00Z" }
/// ```
///
/// Counts are updated by background workers and may lag behind redirects.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let link = state.link_service.get_stats(&code).await?;

    Ok(Json(link.into()))
}

/// Lists the links created by the authenticated user, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn links_handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Vec<LinkSummary>>, AppError> {
    let links = state.link_service.list_links(user_id).await?;

    Ok(Json(links.into_iter().map(LinkSummary::from).collect()))
}
