//! Comment repository
//!
//! Database operations for comments: creating them, listing a post's
//! comments with their authors, and counting comments for a batch of posts.

use crate::config::DatabaseDriver;
use crate::db::repositories::in_placeholders;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor, CreateCommentInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Comments of a post with author usernames, oldest first
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Number of comments per post, for a whole list of posts in one query.
    ///
    /// Posts without comments are absent from the map.
    async fn count_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_comment_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_comment_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_comments_sqlite(self.pool.sqlite()?, post_id).await,
            DatabaseDriver::Mysql => list_comments_mysql(self.pool.mysql()?, post_id).await,
        }
    }

    async fn count_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT post_id, COUNT(*) AS comments_count FROM comments \
             WHERE post_id IN ({}) GROUP BY post_id",
            in_placeholders(post_ids.len())
        );

        let counts = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let mut query = sqlx::query_as::<_, (i64, i64)>(&sql);
                for id in post_ids {
                    query = query.bind(*id);
                }
                query.fetch_all(self.pool.sqlite()?).await
            }
            DatabaseDriver::Mysql => {
                let mut query = sqlx::query_as::<_, (i64, i64)>(&sql);
                for id in post_ids {
                    query = query.bind(*id);
                }
                query.fetch_all(self.pool.mysql()?).await
            }
        };

        Ok(counts
            .context("Failed to count comments")?
            .into_iter()
            .collect())
    }
}

const INSERT_COMMENT: &str =
    "INSERT INTO comments (post_id, author_id, text, published_at) VALUES (?, ?, ?, ?)";

fn comment_from_input(id: i64, input: &CreateCommentInput) -> Comment {
    Comment {
        id,
        post_id: input.post_id,
        author_id: input.author_id,
        text: input.text.clone(),
        published_at: input.published_at,
    }
}

const SELECT_FOR_POST: &str = r#"
    SELECT c.id, c.post_id, c.author_id, c.text, c.published_at, u.username AS author
    FROM comments c
    JOIN users u ON u.id = c.author_id
    WHERE c.post_id = ?
    ORDER BY c.published_at ASC, c.id ASC
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_comment_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let result = sqlx::query(INSERT_COMMENT)
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(input.published_at)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(comment_from_input(result.last_insert_rowid(), input))
}

async fn list_comments_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_FOR_POST)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_id: row.get("author_id"),
                text: row.get("text"),
                published_at: row.get("published_at"),
            },
            author: row.get("author"),
        })
        .collect())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_comment_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let result = sqlx::query(INSERT_COMMENT)
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(input.published_at)
        .execute(pool)
        .await
        .context("Failed to create comment")?;

    Ok(comment_from_input(result.last_insert_id() as i64, input))
}

async fn list_comments_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(SELECT_FOR_POST)
        .bind(post_id)
        .fetch_all(pool)
        .await
        .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: Comment {
                id: row.get("id"),
                post_id: row.get("post_id"),
                author_id: row.get("author_id"),
                text: row.get("text"),
                published_at: row.get("published_at"),
            },
            author: row.get("author"),
        })
        .collect())
}
