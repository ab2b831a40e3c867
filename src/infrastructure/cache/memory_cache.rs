//! In-process cache with per-entry expiry.

use super::service::{CacheResult, CacheService};
use crate::domain::clock::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A cache kept in a sharded map inside the process.
///
/// Used when Redis is not configured and in tests. Expiry is evaluated lazily
/// against the injected [`Clock`]; expired entries are removed on read or by
/// [`MemoryCache::purge_expired`].
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

struct Entry {
    target: String,
    expires_at: DateTime<Utc>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        debug!("Using in-memory cache");
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, code: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(code) {
            if entry.expires_at > now {
                debug!("Cache HIT: {}", code);
                return Ok(Some(entry.target.clone()));
            }
        }

        self.entries.remove_if(code, |_, entry| entry.expires_at <= now);
        debug!("Cache MISS: {}", code);
        Ok(None)
    }

    async fn set(&self, code: &str, target: &str, ttl: Duration) -> CacheResult<()> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.insert(
            code.to_string(),
            Entry {
                target: target.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
