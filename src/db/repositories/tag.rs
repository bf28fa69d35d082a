//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL
//!
//! Popularity is the number of posts carrying a tag. Ties are broken by
//! title so every listing is deterministic.

use crate::config::DatabaseDriver;
use crate::db::repositories::in_placeholders;
use crate::db::DynDatabasePool;
use crate::models::{Tag, TagWithCount};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, title: &str) -> Result<Tag>;

    /// Get tag by its exact title
    async fn get_by_title(&self, title: &str) -> Result<Option<Tag>>;

    /// Most used tags first, at most `limit` of them
    async fn popular(&self, limit: usize) -> Result<Vec<TagWithCount>>;

    /// Tags of every given post in one query.
    ///
    /// Each post's tags are ordered by popularity. Posts without tags are
    /// absent from the map.
    async fn popular_for_posts(&self, post_ids: &[i64])
        -> Result<HashMap<i64, Vec<TagWithCount>>>;

    /// Associate tag with post (no-op if already associated)
    async fn add_to_post(&self, tag_id: i64, post_id: i64) -> Result<()>;
}

/// SQLx-based tag repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, title: &str) -> Result<Tag> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tag_sqlite(self.pool.sqlite()?, title).await,
            DatabaseDriver::Mysql => create_tag_mysql(self.pool.mysql()?, title).await,
        }
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<Tag>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_tag_by_title_sqlite(self.pool.sqlite()?, title).await,
            DatabaseDriver::Mysql => get_tag_by_title_mysql(self.pool.mysql()?, title).await,
        }
    }

    async fn popular(&self, limit: usize) -> Result<Vec<TagWithCount>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => popular_tags_sqlite(self.pool.sqlite()?, limit).await,
            DatabaseDriver::Mysql => popular_tags_mysql(self.pool.mysql()?, limit).await,
        }
    }

    async fn popular_for_posts(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<TagWithCount>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                popular_tags_for_posts_sqlite(self.pool.sqlite()?, post_ids).await
            }
            DatabaseDriver::Mysql => {
                popular_tags_for_posts_mysql(self.pool.mysql()?, post_ids).await
            }
        }
    }

    async fn add_to_post(&self, tag_id: i64, post_id: i64) -> Result<()> {
        let result = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(tag_id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .map(|_| ())
            }
            DatabaseDriver::Mysql => {
                sqlx::query("INSERT IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(tag_id)
                    .execute(self.pool.mysql()?)
                    .await
                    .map(|_| ())
            }
        };
        result.context("Failed to add tag to post")
    }
}

const INSERT_TAG: &str = "INSERT INTO tags (title) VALUES (?)";

const SELECT_BY_TITLE: &str = "SELECT id, title FROM tags WHERE title = ?";

const SELECT_POPULAR: &str = r#"
    SELECT t.id, t.title, COUNT(pt.post_id) AS posts_count
    FROM tags t
    LEFT JOIN post_tags pt ON pt.tag_id = t.id
    GROUP BY t.id, t.title
    ORDER BY posts_count DESC, t.title ASC
    LIMIT ?
"#;

/// Tags of a set of posts with global popularity; `{ids}` is the IN list.
fn select_popular_for_posts(count: usize) -> String {
    format!(
        r#"
        SELECT pt.post_id, t.id, t.title, counts.posts_count
        FROM post_tags pt
        JOIN tags t ON t.id = pt.tag_id
        JOIN (
            SELECT tag_id, COUNT(*) AS posts_count
            FROM post_tags
            GROUP BY tag_id
        ) counts ON counts.tag_id = t.id
        WHERE pt.post_id IN ({ids})
        ORDER BY counts.posts_count DESC, t.title ASC
        "#,
        ids = in_placeholders(count)
    )
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, title: &str) -> Result<Tag> {
    let result = sqlx::query(INSERT_TAG)
        .bind(title)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create tag '{}'", title))?;

    Ok(Tag {
        id: result.last_insert_rowid(),
        title: title.to_string(),
    })
}

async fn get_tag_by_title_sqlite(pool: &SqlitePool, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(SELECT_BY_TITLE)
        .bind(title)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by title")?;

    Ok(row.as_ref().map(row_to_tag_sqlite))
}

async fn popular_tags_sqlite(pool: &SqlitePool, limit: usize) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(SELECT_POPULAR)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .context("Failed to get popular tags")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_sqlite(row), row.get("posts_count")))
        .collect())
}

async fn popular_tags_for_posts_sqlite(
    pool: &SqlitePool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagWithCount>>> {
    let sql = select_popular_for_posts(post_ids.len());
    let mut query = sqlx::query(&sql);
    for id in post_ids {
        query = query.bind(*id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get tags of posts")?;

    let mut tags_by_post: HashMap<i64, Vec<TagWithCount>> = HashMap::new();
    for row in &rows {
        tags_by_post
            .entry(row.get("post_id"))
            .or_default()
            .push(TagWithCount::new(row_to_tag_sqlite(row), row.get("posts_count")));
    }

    Ok(tags_by_post)
}

fn row_to_tag_sqlite(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tag_mysql(pool: &MySqlPool, title: &str) -> Result<Tag> {
    let result = sqlx::query(INSERT_TAG)
        .bind(title)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create tag '{}'", title))?;

    Ok(Tag {
        id: result.last_insert_id() as i64,
        title: title.to_string(),
    })
}

async fn get_tag_by_title_mysql(pool: &MySqlPool, title: &str) -> Result<Option<Tag>> {
    let row = sqlx::query(SELECT_BY_TITLE)
        .bind(title)
        .fetch_optional(pool)
        .await
        .context("Failed to get tag by title")?;

    Ok(row.as_ref().map(row_to_tag_mysql))
}

async fn popular_tags_mysql(pool: &MySqlPool, limit: usize) -> Result<Vec<TagWithCount>> {
    let rows = sqlx::query(SELECT_POPULAR)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .context("Failed to get popular tags")?;

    Ok(rows
        .iter()
        .map(|row| TagWithCount::new(row_to_tag_mysql(row), row.get("posts_count")))
        .collect())
}

async fn popular_tags_for_posts_mysql(
    pool: &MySqlPool,
    post_ids: &[i64],
) -> Result<HashMap<i64, Vec<TagWithCount>>> {
    let sql = select_popular_for_posts(post_ids.len());
    let mut query = sqlx::query(&sql);
    for id in post_ids {
        query = query.bind(*id);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .context("Failed to get tags of posts")?;

    let mut tags_by_post: HashMap<i64, Vec<TagWithCount>> = HashMap::new();
    for row in &rows {
        tags_by_post
            .entry(row.get("post_id"))
            .or_default()
            .push(TagWithCount::new(row_to_tag_mysql(row), row.get("posts_count")));
    }

    Ok(tags_by_post)
}

fn row_to_tag_mysql(row: &sqlx::mysql::MySqlRow) -> Tag {
    Tag {
        id: row.get("id"),
        title: row.get("title"),
    }
}
