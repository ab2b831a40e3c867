//! Per-client rate limiting middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use tower_governor::key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Admits or rejects a request using the shared
/// [`crate::application::services::RateLimiter`].
///
/// # Key Extraction
///
/// The client key is the peer IP address. With `BEHIND_PROXY=true` it is
/// taken from `X-Forwarded-For`, `X-Real-IP` or `Forwarded` first.
///
/// # Errors
///
/// Returns `400 Bad Request` if no client address can be determined.
/// Returns `429 Too Many Requests` when the client's bucket is empty.
///
/// # Example
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req, st.behind_proxy)?;

    if !st.rate_limiter.allow(&key) {
        debug!(client = %key, "rate limit exceeded");
        metrics::counter!("linkgate_rate_limited_total").increment(1);
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}

/// Derives the rate limiting key for a request.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if no address is available.
pub fn client_key<T>(req: &axum::http::Request<T>, behind_proxy: bool) -> Result<String, AppError> {
    let ip = if behind_proxy {
        SmartIpKeyExtractor.extract(req)
    } else {
        PeerIpKeyExtractor.extract(req)
    };

    ip.map(|ip| ip.to_string())
        .map_err(|_| AppError::bad_request("invalid IP", json!({})))
}
