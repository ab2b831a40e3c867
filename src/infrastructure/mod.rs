//! Backends behind the domain traits.
//!
//! [`persistence`] holds the PostgreSQL repositories (the durable store).
//! [`cache`] holds the Redis cache and the in-memory fallback used when no
//! Redis is configured.

pub mod cache;
pub mod persistence;
