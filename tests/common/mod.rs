#![allow(dead_code)]

use async_trait::async_trait;
use axum::ServiceExt;
use axum::extract::Request;
use axum_test::TestServer;
use chrono::Utc;
use linkgate::application::services::{AuthService, LinkService, RateLimiter};
use linkgate::domain::background_task::TaskQueue;
use linkgate::domain::entities::{Link, NewLink, NewUser, User};
use linkgate::domain::repositories::{LinkRepository, UserRepository};
use linkgate::domain::task_worker::{TaskExecutor, spawn_workers};
use linkgate::error::AppError;
use linkgate::infrastructure::cache::{CacheService, MemoryCache};
use linkgate::routes::app_router;
use linkgate::state::AppState;
use serde_json::json;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const JWT_SECRET: &str = "integration_test_secret_0123456789";

/// Link store backed by a vector, enforcing code uniqueness like the real table.
#[derive(Default)]
pub struct InMemoryLinks {
    links: Mutex<Vec<Link>>,
    offline: AtomicBool,
}

impl InMemoryLinks {
    pub fn seed(&self, code: &str, target: &str, owner_id: Option<i64>) {
        let mut links = self.links.lock().unwrap();
        let id = links.len() as i64 + 1;
        links.push(Link::new(
            id,
            code.to_string(),
            target.to_string(),
            owner_id,
            Utc::now(),
            0,
        ));
    }

    pub fn clicks(&self, code: &str) -> Option<i64> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .map(|l| l.click_count)
    }

    pub fn count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// Makes every call fail with a storage error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AppError::storage("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn insert_link(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.check_online()?;
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.code == new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_code_key" }),
            ));
        }
        let link = Link::new(
            links.len() as i64 + 1,
            new_link.code,
            new_link.target,
            new_link.owner_id,
            new_link.created_at,
            0,
        );
        links.push(link.clone());
        Ok(link)
    }

    async fn get_link_target(&self, code: &str) -> Result<Option<String>, AppError> {
        self.check_online()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .map(|l| l.target.clone()))
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        self.check_online()?;
        if let Some(link) = self.links.lock().unwrap().iter_mut().find(|l| l.code == code) {
            link.click_count += 1;
        }
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.check_online()?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.code == code)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        self.check_online()?;
        let mut owned: Vec<Link> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.owner_id == Some(owner_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check_online()
    }
}

/// User store with the same unique constraints as the `users` table.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_username_key" }),
            ));
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_email_key" }),
            ));
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

/// A running router over in-memory collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<InMemoryLinks>,
    pub cache: Arc<MemoryCache>,
    pub auth: Arc<AuthService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_rate_limit(1000, 1000)
    }

    pub fn with_rate_limit(burst: u32, per_second: u32) -> Self {
        let links = Arc::new(InMemoryLinks::default());
        let users = Arc::new(InMemoryUsers::default());
        let cache = Arc::new(MemoryCache::new());
        let cache_dyn: Arc<dyn CacheService> = cache.clone();

        let (tasks, rx) = TaskQueue::channel(1000);
        let executor = Arc::new(TaskExecutor::new(
            links.clone(),
            cache_dyn.clone(),
            Duration::from_secs(3600),
        ));
        spawn_workers(rx, executor, 2);

        let link_service = Arc::new(LinkService::new(
            links.clone(),
            cache_dyn.clone(),
            tasks.clone(),
            6,
        ));
        let auth = Arc::new(AuthService::new(
            users,
            JWT_SECRET,
            chrono::Duration::hours(1),
        ));
        let rate_limiter = Arc::new(RateLimiter::new(
            NonZeroU32::new(burst).unwrap(),
            NonZeroU32::new(per_second).unwrap(),
        ));

        let state = AppState::new(
            link_service,
            auth.clone(),
            rate_limiter,
            cache_dyn,
            tasks,
            false,
        );

        let app = ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(
            app_router(state, "public"),
        );

        let server = TestServer::builder()
            .http_transport()
            .build(app)
            .unwrap();

        Self {
            server,
            links,
            cache,
            auth,
        }
    }

    /// Session token for user `user_id`, without going through registration.
    pub fn token_for(&self, user_id: i64) -> String {
        self.auth.issue_token(user_id).unwrap()
    }
}

/// Polls `check` until it holds or one second passes.
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
