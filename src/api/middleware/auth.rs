//! Session authentication for protected API routes.

use axum::{
    RequestExt,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;
use tracing::debug;

use crate::{error::AppError, state::AppState};

/// Id of the caller, available to handlers behind [`layer`] as
/// `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// Verifies the session token in `Authorization: Bearer <token>` and records
/// the caller's id on the request.
///
/// Tokens are stateless; no store lookup happens here.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` when the header
/// is absent or not a Bearer credential, or when the token is malformed,
/// signed with another secret, or expired.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let AuthBearer(token) = req.extract_parts::<AuthBearer>().await.map_err(|_| {
        debug!("request without a bearer credential");
        AppError::unauthorized(
            "Unauthorized",
            json!({ "reason": "Authorization header is missing or not a Bearer token" }),
        )
    })?;

    let user_id = st.auth_service.verify_token(&token)?;
    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}
