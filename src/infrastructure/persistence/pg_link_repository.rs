//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for link storage and click accounting.
///
/// Code uniqueness is enforced by the `links_code_key` constraint; a clash
/// surfaces as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target: String,
    owner_id: Option<i64>,
    created_at: DateTime<Utc>,
    click_count: i64,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.code, r.target, r.owner_id, r.created_at, r.click_count)
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_link(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, target, owner_id, created_at, click_count)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id, code, target, owner_id, created_at, click_count
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target)
        .bind(new_link.owner_id)
        .bind(new_link.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn get_link_target(&self, code: &str) -> Result<Option<String>, AppError> {
        let target = sqlx::query_scalar::<_, String>("SELECT target FROM links WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(target)
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, owner_id, created_at, click_count
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, owner_id, created_at, click_count
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
