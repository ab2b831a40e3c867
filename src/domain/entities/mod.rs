//! Core domain entities.
//!
//! Entities are plain data structures. Each persisted entity has a separate
//! `New*` struct carrying only the fields supplied at creation time.
//!
//! - [`Link`] / [`NewLink`] - A short code mapped to its target URL
//! - [`User`] / [`NewUser`] - A registered account

pub mod link;
pub mod user;

pub use link::{Link, NewLink};
pub use user::{NewUser, User};
