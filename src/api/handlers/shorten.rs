//! Handler for link shortening endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::api::middleware::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::target_url::validate_target_url;

/// Creates a short link owned by the authenticated user.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "code": "aZ3-_q" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL is not an
/// absolute http/https URL.
/// Returns 500 Internal Server Error if the link could not be stored.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    validate_target_url(&payload.url)?;

    let code = state
        .link_service
        .create_short_link(payload.url, Some(user_id))
        .await?;

    info!(user_id, code = %code, "short link created");

    Ok((StatusCode::CREATED, Json(ShortenResponse { code })))
}
