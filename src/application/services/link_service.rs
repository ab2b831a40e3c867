//! Link creation and resolution service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::background_task::{BackgroundTask, TaskQueue};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{OsRandom, RandomSource, generate_code, is_valid_code};

/// Generate-then-insert attempts before giving up on a fresh code.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Service for creating and resolving short links.
///
/// The store is authoritative. The cache is read first on resolution, and
/// every cache write and click increment goes through the [`TaskQueue`] so
/// the request path never waits on bookkeeping.
pub struct LinkService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    tasks: TaskQueue,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    code_length: usize,
}

impl LinkService {
    /// Creates a new link service using the OS random source and system clock.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        tasks: TaskQueue,
        code_length: usize,
    ) -> Self {
        Self {
            links,
            cache,
            tasks,
            random: Arc::new(OsRandom),
            clock: Arc::new(SystemClock),
            code_length,
        }
    }

    /// Replaces the random source used for code generation.
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Replaces the clock used for `created_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Creates a short link and returns its code.
    ///
    /// `target` must already be validated. The link exists in the store when
    /// this returns; the cache entry is written later by a background worker.
    ///
    /// # Code Generation
    ///
    /// Random codes may collide. A collision is detected by the store's
    /// unique constraint and a new code is drawn, up to
    /// [`MAX_CODE_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the insert fails or every attempt
    /// collided. The cache is not touched in either case.
    pub async fn create_short_link(
        &self,
        target: String,
        owner: Option<i64>,
    ) -> Result<String, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(self.code_length, self.random.as_ref());

            let new_link = NewLink {
                code: code.clone(),
                target: target.clone(),
                owner_id: owner,
                created_at: self.clock.now(),
            };

            match self.links.insert_link(new_link).await {
                Ok(link) => {
                    self.tasks
                        .submit(BackgroundTask::cache_write(link.code, link.target));
                    return Ok(code);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, code = %code, "short code collision, retrying");
                    metrics::counter!("linkgate_code_collisions_total").increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::storage(format!(
            "no free short code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Resolves a code to its target.
    ///
    /// # Request Flow
    ///
    /// 1. Cache lookup; a hit is authoritative
    /// 2. On a miss, store lookup and a queued cache backfill
    /// 3. A queued click increment, only for codes that resolved
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    ///
    /// Returns [`AppError::Cache`] if the cache fails with anything other than
    /// a miss. The store is not consulted in that case.
    ///
    /// Returns [`AppError::Storage`] if the store lookup fails.
    pub async fn resolve_short_link(&self, code: &str) -> Result<String, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        let target = match self.cache.get(code).await? {
            Some(target) => target,
            None => {
                let target = self
                    .links
                    .get_link_target(code)
                    .await?
                    .ok_or_else(|| not_found(code))?;

                debug!("Backfilling cache for {}", code);
                self.tasks
                    .submit(BackgroundTask::cache_write(code, target.clone()));
                target
            }
        };

        self.tasks.submit(BackgroundTask::increment_clicks(code));

        Ok(target)
    }

    /// Returns the stored link for `code`, including its click count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn get_stats(&self, code: &str) -> Result<Link, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        self.links
            .find_by_code(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    /// Lists the links created by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on database errors.
    pub async fn list_links(&self, owner: i64) -> Result<Vec<Link>, AppError> {
        self.links.list_by_owner(owner).await
    }

    /// Checks that the store answers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if it does not.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.links.ping().await
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::repositories::MockLinkRepository;
    use crate::domain::task_worker::TaskExecutor;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService};
    use crate::utils::code_generator::SeededRandom;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const TTL: Duration = Duration::from_secs(86_400);

    fn stored_link(new_link: NewLink) -> Link {
        Link::new(
            1,
            new_link.code,
            new_link.target,
            new_link.owner_id,
            new_link.created_at,
            0,
        )
    }

    fn drain(rx: &mut mpsc::Receiver<BackgroundTask>) -> Vec<BackgroundTask> {
        let mut tasks = Vec::new();
        while let Ok(task) = rx.try_recv() {
            tasks.push(task);
        }
        tasks
    }

    fn service(
        links: MockLinkRepository,
        cache: Arc<dyn CacheService>,
    ) -> (LinkService, mpsc::Receiver<BackgroundTask>) {
        let (tasks, rx) = TaskQueue::channel(64);
        let service = LinkService::new(Arc::new(links), cache, tasks, 6)
            .with_random(Arc::new(SeededRandom::new(42)));
        (service, rx)
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let now = Utc::now();
        let mut links = MockLinkRepository::new();
        links
            .expect_insert_link()
            .withf(move |l| {
                l.target == "https://example.com"
                    && l.owner_id == Some(7)
                    && l.code.len() == 6
                    && l.created_at == now
            })
            .times(1)
            .returning(|l| Ok(stored_link(l)));

        let (service, mut rx) = service(links, Arc::new(MemoryCache::new()));
        let service = service.with_clock(Arc::new(ManualClock::new(now)));

        let code = service
            .create_short_link("https://example.com".to_string(), Some(7))
            .await
            .unwrap();

        assert_eq!(code.len(), 6);
        assert_eq!(
            drain(&mut rx),
            vec![BackgroundTask::cache_write(code, "https://example.com")]
        );
    }

    #[tokio::test]
    async fn test_create_short_link_retries_on_collision() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut links = MockLinkRepository::new();
        links.expect_insert_link().times(3).returning(move |l| {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::conflict(
                    "Duplicate value",
                    json!({ "constraint": "links_code_key" }),
                ))
            } else {
                Ok(stored_link(l))
            }
        });

        let (service, mut rx) = service(links, Arc::new(MemoryCache::new()));

        let code = service
            .create_short_link("https://example.com".to_string(), None)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(code.len(), 6);
    }

    #[tokio::test]
    async fn test_create_short_link_gives_up_after_max_attempts() {
        let mut links = MockLinkRepository::new();
        links
            .expect_insert_link()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Duplicate value", json!({}))));

        let (service, mut rx) = service(links, Arc::new(MemoryCache::new()));

        let result = service
            .create_short_link("https://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_create_short_link_storage_error_leaves_cache_alone() {
        let mut links = MockLinkRepository::new();
        links
            .expect_insert_link()
            .times(1)
            .returning(|_| Err(AppError::storage("connection refused")));

        let mut cache = MockCacheService::new();
        cache.expect_set().times(0);

        let (service, mut rx) = service(links, Arc::new(cache));

        let result = service
            .create_short_link("https://example.com".to_string(), None)
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_cache_hit_skips_store() {
        let mut links = MockLinkRepository::new();
        links.expect_get_link_target().times(0);

        let cache = Arc::new(MemoryCache::new());
        cache.set("abc123", "https://cached.example", TTL).await.unwrap();

        let (service, mut rx) = service(links, cache);

        let target = service.resolve_short_link("abc123").await.unwrap();

        assert_eq!(target, "https://cached.example");
        assert_eq!(
            drain(&mut rx),
            vec![BackgroundTask::increment_clicks("abc123")]
        );
    }

    #[tokio::test]
    async fn test_resolve_store_only_code_backfills_cache() {
        let mut links = MockLinkRepository::new();
        links
            .expect_get_link_target()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let cache = Arc::new(MemoryCache::new());
        let (service, mut rx) = service(links, cache.clone());

        let target = service.resolve_short_link("abc123").await.unwrap();
        assert_eq!(target, "https://example.com");
        assert_eq!(cache.get("abc123").await.unwrap(), None);

        let mut worker_links = MockLinkRepository::new();
        worker_links
            .expect_increment_clicks()
            .times(1)
            .returning(|_| Ok(()));
        let executor = TaskExecutor::new(Arc::new(worker_links), cache.clone(), TTL);

        let tasks = drain(&mut rx);
        assert_eq!(tasks.len(), 2);
        for task in &tasks {
            executor.execute(task).await.unwrap();
        }

        assert_eq!(
            cache.get("abc123").await.unwrap(),
            Some("https://example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found_without_click() {
        let mut links = MockLinkRepository::new();
        links
            .expect_get_link_target()
            .times(1)
            .returning(|_| Ok(None));
        links.expect_increment_clicks().times(0);

        let (service, mut rx) = service(links, Arc::new(MemoryCache::new()));

        let result = service.resolve_short_link("nope42").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_cache_failure_never_queries_store() {
        let mut links = MockLinkRepository::new();
        links.expect_get_link_target().times(0);

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Err(CacheError::ConnectionError("refused".to_string())));

        let (service, mut rx) = service(links, Arc::new(cache));

        let result = service.resolve_short_link("abc123").await;

        assert!(matches!(result, Err(AppError::Cache(_))));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_touches_nothing() {
        let mut links = MockLinkRepository::new();
        links.expect_get_link_target().times(0);
        let mut cache = MockCacheService::new();
        cache.expect_get().times(0);

        let (service, _rx) = service(links, Arc::new(cache));

        let result = service.resolve_short_link("bad code!").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_queue_is_full() {
        let mut links = MockLinkRepository::new();
        links
            .expect_get_link_target()
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let (tasks, _rx) = TaskQueue::channel(1);
        tasks.submit(BackgroundTask::increment_clicks("filler"));
        let service = LinkService::new(Arc::new(links), Arc::new(MemoryCache::new()), tasks, 6);

        let target = service.resolve_short_link("abc123").await.unwrap();
        assert_eq!(target, "https://example.com");
    }

    #[tokio::test]
    async fn test_get_stats() {
        let created = Utc::now();
        let mut links = MockLinkRepository::new();
        links
            .expect_find_by_code()
            .withf(|code| code == "abc123")
            .returning(move |code| {
                Ok(Some(Link::new(
                    1,
                    code.to_string(),
                    "https://example.com".to_string(),
                    None,
                    created,
                    42,
                )))
            });
        links
            .expect_find_by_code()
            .withf(|code| code == "missing")
            .returning(|_| Ok(None));

        let (service, _rx) = service(links, Arc::new(MemoryCache::new()));

        let link = service.get_stats("abc123").await.unwrap();
        assert_eq!(link.click_count, 42);
        assert_eq!(link.created_at, created);

        assert!(matches!(
            service.get_stats("missing").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_links_delegates_to_repository() {
        let mut links = MockLinkRepository::new();
        links
            .expect_list_by_owner()
            .withf(|owner| *owner == 7)
            .times(1)
            .returning(|_| Ok(vec![]));

        let (service, _rx) = service(links, Arc::new(MemoryCache::new()));

        assert!(service.list_links(7).await.unwrap().is_empty());
    }
}
