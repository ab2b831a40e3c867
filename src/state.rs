//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, RateLimiter};
use crate::domain::background_task::TaskQueue;
use crate::infrastructure::cache::CacheService;

/// Cloned into every request; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub cache: Arc<dyn CacheService>,
    pub tasks: TaskQueue,
    /// Take the client address from forwarding headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        auth_service: Arc<AuthService>,
        rate_limiter: Arc<RateLimiter>,
        cache: Arc<dyn CacheService>,
        tasks: TaskQueue,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service,
            auth_service,
            rate_limiter,
            cache,
            tasks,
            behind_proxy,
        }
    }
}
