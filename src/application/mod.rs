//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! the cache and the background task queue. Services consume repository traits
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and stats
//! - [`services::auth_service::AuthService`] - Accounts and session tokens
//! - [`services::rate_limiter::RateLimiter`] - Per-client admission control

pub mod services;
