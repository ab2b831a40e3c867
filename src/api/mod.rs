//! HTTP surface of the service.
//!
//! Handlers stay thin: they validate input, call an application service and
//! map the result. Errors are rendered by [`crate::error::AppError`].

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
