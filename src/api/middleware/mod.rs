//! Request middleware.
//!
//! - [`rate_limit`] - per-client admission, applied first on protected routes
//! - [`auth`] - Bearer session verification
//! - [`tracing`] - request spans

pub mod auth;
pub mod rate_limit;
pub mod tracing;
