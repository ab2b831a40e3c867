//! DTOs for the link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL (must be absolute `http`/`https`).
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

/// Code assigned to the new link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub code: String,
}
