//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] with the violated constraint in the
    /// details if the username or email is already registered.
    ///
    /// Returns [`AppError::Storage`] on any other database error.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds an account whose username or email equals `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError>;

    /// Lists all accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}
