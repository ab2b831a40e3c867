//! Account registration, login and session tokens.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::NewUser;
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id, as a string per RFC 7519.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Service for accounts and HS256 session tokens.
///
/// Passwords are stored as Argon2id hashes. Hashing runs on the blocking
/// pool so it does not stall request workers.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_secret: &str,
        token_ttl: chrono::Duration,
    ) -> Self {
        Self {
            users,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for `iat`/`exp`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates an account and returns a session token for it.
    ///
    /// Input is expected to be validated by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<String, AppError> {
        let password_hash = hash_blocking(password).await?;

        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(describe_conflict)?;

        info!(user_id = user.id, username = %user.username, "user registered");
        self.issue_token(user.id)
    }

    /// Checks credentials and returns a session token.
    ///
    /// `identifier` is a username or an email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown identifier or a wrong
    /// password. Both produce the same message.
    pub async fn login(&self, identifier: &str, password: String) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_identifier(identifier).await? else {
            debug!("login for unknown identifier");
            return Err(invalid_credentials());
        };

        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| internal("Password check failed", e))?
            .map_err(|e| internal("Password check failed", e))?;

        if !matches {
            debug!(user_id = user.id, "login with wrong password");
            return Err(invalid_credentials());
        }

        self.issue_token(user.id)
    }

    /// Signs a session token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails.
    pub fn issue_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = self.clock.now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| internal("Failed to sign token", e))
    }

    /// Verifies a session token and returns the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is malformed, signed
    /// with another key, or expired.
    pub fn verify_token(&self, token: &str) -> Result<i64, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked against `self.clock` below
        validation.validate_exp = false;

        let data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                debug!("rejected token: {}", e);
                invalid_token("Invalid or expired token")
            })?;

        if data.claims.exp <= self.clock.now().timestamp() {
            debug!(sub = %data.claims.sub, "rejected expired token");
            return Err(invalid_token("Invalid or expired token"));
        }

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| invalid_token("Invalid token subject"))
    }
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| internal("Password hashing failed", e))?
        .map_err(|e| internal("Password hashing failed", e))
}

fn internal(message: &str, cause: impl std::fmt::Display) -> AppError {
    AppError::internal(message, json!({ "reason": cause.to_string() }))
}

fn invalid_token(reason: &str) -> AppError {
    AppError::unauthorized("Unauthorized", json!({ "reason": reason }))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid credentials", json!({}))
}

/// Turns a unique violation on `users` into a field-specific message.
fn describe_conflict(error: AppError) -> AppError {
    let constraint = match &error {
        AppError::Conflict { details, .. } => details
            .get("constraint")
            .and_then(|c| c.as_str())
            .map(str::to_owned),
        _ => None,
    };

    match constraint.as_deref() {
        Some("users_username_key") => {
            AppError::conflict("Username already taken", json!({ "field": "username" }))
        }
        Some("users_email_key") => {
            AppError::conflict("Email already registered", json!({ "field": "email" }))
        }
        _ => error,
    }
}
