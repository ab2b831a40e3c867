//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the authoritative link records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with `click_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code is already taken
    /// (unique constraint `links_code_key`).
    ///
    /// Returns [`AppError::Storage`] on any other database error.
    async fn insert_link(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Looks up the target URL for a code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(target))` if found
    /// - `Ok(None)` if no link has this code
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn get_link_target(&self, code: &str) -> Result<Option<String>, AppError>;

    /// Adds one to the click counter of a link.
    ///
    /// Incrementing an unknown code is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Finds the full link record by code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Lists links created by `owner_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError>;

    /// Round-trips to the store. Used by the health endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the store is unreachable.
    async fn ping(&self) -> Result<(), AppError>;
}
