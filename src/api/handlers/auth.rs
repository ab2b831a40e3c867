//! Handlers for account registration and login.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and signs the caller in.
///
/// # Endpoint
///
/// `POST /api/register`
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "email": "alice@example.com", "password": "correct horse" }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "token": "<jwt>" }`
///
/// # Errors
///
/// Returns 400 Bad Request on invalid input.
/// Returns 409 Conflict if the username or email is already registered.
pub async fn register_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let token = state
        .auth_service
        .register(payload.username, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Exchanges a username or email and password for a session token.
///
/// # Endpoint
///
/// `POST /api/login`
///
/// # Request Body
///
/// ```json
/// { "identifier": "alice", "password": "correct horse" }
/// ```
///
/// # Errors
///
/// Returns 401 Unauthorized with `Invalid credentials` for an unknown
/// account or a wrong password.
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let token = state
        .auth_service
        .login(&payload.identifier, payload.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}
