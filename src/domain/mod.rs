//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces and the background task machinery,
//! independent of HTTP and storage details.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`clock`] - Injectable time source
//! - [`background_task`] - Deferred work items and the bounded queue
//! - [`task_worker`] - Fixed pool of workers executing queued tasks
//!
//! # Redirect Flow
//!
//! 1. The redirect handler asks [`crate::application::services::LinkService`] to resolve a code
//! 2. On success a [`background_task::BackgroundTask::IncrementClicks`] is submitted
//! 3. On a cache miss a [`background_task::BackgroundTask::CacheWrite`] is submitted as well
//! 4. [`task_worker::spawn_workers`] executes them against the store and cache

pub mod background_task;
pub mod clock;
pub mod entities;
pub mod repositories;
pub mod task_worker;
