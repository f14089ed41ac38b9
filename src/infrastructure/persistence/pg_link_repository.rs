//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::RepositoryError;
use crate::utils::db_error::is_unique_violation_on_code;

const LINK_COLUMNS: &str = "id, code, url, created_at, expires_at, hit_count, deleted_at";

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    url: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    hit_count: i64,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            code: row.code,
            url: row.url,
            created_at: row.created_at,
            expires_at: row.expires_at,
            hit_count: row.hit_count,
            deleted_at: row.deleted_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness of active codes is enforced by the partial index
/// `links_code_active_key`; all timestamps use the database clock.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, RepositoryError> {
        let query = format!(
            "INSERT INTO links (code, url, expires_at) VALUES ($1, $2, $3) RETURNING {LINK_COLUMNS}"
        );

        sqlx::query_as::<_, LinkRow>(&query)
            .bind(&new_link.code)
            .bind(&new_link.url)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map(Link::from)
            .map_err(|e| {
                if is_unique_violation_on_code(&e) {
                    RepositoryError::UniqueViolation {
                        code: new_link.code.clone(),
                    }
                } else {
                    RepositoryError::Database(e)
                }
            })
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Link>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE code = $1
            ORDER BY (deleted_at IS NULL) DESC, deleted_at DESC, id DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Link>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE url = $1 AND deleted_at IS NULL
            ORDER BY (expires_at IS NULL OR expires_at > NOW()) DESC, created_at DESC, id DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&query)
            .bind(url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn increment_hit(&self, code: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE links
            SET hit_count = hit_count + 1
            WHERE code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn increment_hit_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE links
            SET hit_count = hit_count + 1
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn soft_delete(&self, code: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = NOW()
            WHERE code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_deleted(&self, older_than: Duration) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM links
            WHERE deleted_at IS NOT NULL
              AND deleted_at < NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(older_than.num_milliseconds() as f64 / 1000.0)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
