//! Validation of URLs submitted for shortening.

use crate::error::AppError;
use serde_json::json;
use url::Url;

/// Longest accepted target URL.
pub const MAX_TARGET_LENGTH: usize = 2048;

/// Checks that `target` is an absolute `http`/`https` URL with a host.
///
/// The target is stored as submitted; no normalization is applied.
///
/// # Errors
///
/// Returns [`AppError::Validation`] describing the first failed rule.
pub fn validate_target_url(target: &str) -> Result<(), AppError> {
    if target.len() > MAX_TARGET_LENGTH {
        return Err(AppError::bad_request(
            "URL is too long",
            json!({ "max_length": MAX_TARGET_LENGTH, "provided_length": target.len() }),
        ));
    }

    // the URL parser silently strips these, but they cannot go in a Location header
    if target.chars().any(char::is_control) {
        return Err(AppError::bad_request(
            "URL contains control characters",
            json!({}),
        ));
    }

    let parsed = Url::parse(target).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only http and https URLs can be shortened",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::bad_request("URL must have a host", json!({})));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_target_url("https://example.com").is_ok());
        assert!(validate_target_url("http://example.com/path?q=1#frag").is_ok());
        assert!(validate_target_url("https://sub.example.co.uk:8443/a/b").is_ok());
    }

    #[test]
    fn test_rejects_control_characters() {
        assert!(validate_target_url("https://exa\nmple.com").is_err());
        assert!(validate_target_url("https://example.com/\tpath").is_err());
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            validate_target_url("ftp://example.com/file"),
            Err(AppError::Validation { .. })
        ));
        assert!(validate_target_url("javascript:alert(1)").is_err());
        assert!(validate_target_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validate_target_url("").is_err());
        assert!(validate_target_url("not a url").is_err());
        assert!(validate_target_url("example.com").is_err());
    }

    #[test]
    fn test_rejects_too_long() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_TARGET_LENGTH));
        assert!(validate_target_url(&long).is_err());
    }
}
