//! Post repository
//!
//! Database operations for posts.
//!
//! Every read returns `PostWithMeta` with the author username and like count
//! loaded by the same query (authors are joined, likes are aggregated).
//! Tags and comment counts are not loaded here; callers batch them for the
//! whole list through `TagRepository::popular_for_posts` and
//! `CommentRepository::count_for_posts`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreatePostInput, Post, PostWithMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Record that a user likes a post (no-op if already liked)
    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<()>;

    /// Most liked posts first, ties broken by ascending ID
    async fn popular(&self, limit: usize) -> Result<Vec<PostWithMeta>>;

    /// The `limit` most recently published posts, oldest of them first
    async fn fresh(&self, limit: usize) -> Result<Vec<PostWithMeta>>;

    /// Posts carrying the tag, newest first
    async fn by_tag(&self, tag_id: i64, limit: usize) -> Result<Vec<PostWithMeta>>;

    /// Get post by its exact slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<PostWithMeta>>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn add_like(&self, post_id: i64, user_id: i64) -> Result<()> {
        let result = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query("INSERT OR IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(self.pool.sqlite()?)
                    .await
                    .map(|_| ())
            }
            DatabaseDriver::Mysql => {
                sqlx::query("INSERT IGNORE INTO post_likes (post_id, user_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(user_id)
                    .execute(self.pool.mysql()?)
                    .await
                    .map(|_| ())
            }
        };
        result.context("Failed to like post")
    }

    async fn popular(&self, limit: usize) -> Result<Vec<PostWithMeta>> {
        let posts = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_posts_sqlite(self.pool.sqlite()?, SELECT_POPULAR, None, limit).await
            }
            DatabaseDriver::Mysql => {
                list_posts_mysql(self.pool.mysql()?, SELECT_POPULAR, None, limit).await
            }
        };
        posts.context("Failed to get popular posts")
    }

    async fn fresh(&self, limit: usize) -> Result<Vec<PostWithMeta>> {
        let mut posts = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_posts_sqlite(self.pool.sqlite()?, SELECT_NEWEST, None, limit).await
            }
            DatabaseDriver::Mysql => {
                list_posts_mysql(self.pool.mysql()?, SELECT_NEWEST, None, limit).await
            }
        }
        .context("Failed to get fresh posts")?;

        // Newest-first from the database; the page shows them in publication order.
        posts.reverse();
        Ok(posts)
    }

    async fn by_tag(&self, tag_id: i64, limit: usize) -> Result<Vec<PostWithMeta>> {
        let posts = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_posts_sqlite(self.pool.sqlite()?, SELECT_BY_TAG, Some(tag_id), limit).await
            }
            DatabaseDriver::Mysql => {
                list_posts_mysql(self.pool.mysql()?, SELECT_BY_TAG, Some(tag_id), limit).await
            }
        };
        posts.context("Failed to get posts by tag")
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_slug_sqlite(self.pool.sqlite()?, slug).await,
            DatabaseDriver::Mysql => get_post_by_slug_mysql(self.pool.mysql()?, slug).await,
        }
    }
}

/// Post columns, author username and like count, followed by the given
/// join, filter and ordering clauses.
macro_rules! select_posts {
    ($join:literal, $filter:literal, $tail:literal) => {
        concat!(
            "SELECT p.id, p.title, p.text, p.image, p.published_at, p.slug, p.author_id, ",
            "u.username AS author, COUNT(pl.user_id) AS likes_count ",
            "FROM posts p ",
            "JOIN users u ON u.id = p.author_id ",
            "LEFT JOIN post_likes pl ON pl.post_id = p.id ",
            $join,
            " ",
            $filter,
            " GROUP BY p.id, p.title, p.text, p.image, p.published_at, p.slug, p.author_id, u.username ",
            $tail
        )
    };
}

const SELECT_POPULAR: &str = select_posts!("", "", "ORDER BY likes_count DESC, p.id ASC LIMIT ?");

const SELECT_NEWEST: &str = select_posts!("", "", "ORDER BY p.published_at DESC, p.id DESC LIMIT ?");

const SELECT_BY_TAG: &str = select_posts!(
    "JOIN post_tags pt ON pt.post_id = p.id",
    "WHERE pt.tag_id = ?",
    "ORDER BY p.published_at DESC, p.id DESC LIMIT ?"
);

const SELECT_BY_SLUG: &str = select_posts!("", "WHERE p.slug = ?", "");

const INSERT_POST: &str = r#"
    INSERT INTO posts (title, text, image, published_at, slug, author_id)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

fn post_from_input(id: i64, input: &CreatePostInput) -> Post {
    Post {
        id,
        title: input.title.clone(),
        text: input.text.clone(),
        image: input.image.clone(),
        published_at: input.published_at,
        slug: input.slug.clone(),
        author_id: input.author_id,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, input: &CreatePostInput) -> Result<Post> {
    let result = sqlx::query(INSERT_POST)
        .bind(&input.title)
        .bind(&input.text)
        .bind(&input.image)
        .bind(input.published_at)
        .bind(&input.slug)
        .bind(input.author_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create post '{}'", input.slug))?;

    Ok(post_from_input(result.last_insert_rowid(), input))
}

/// Run a list query; `tag_id` is bound before the limit when present.
async fn list_posts_sqlite(
    pool: &SqlitePool,
    sql: &str,
    tag_id: Option<i64>,
    limit: usize,
) -> Result<Vec<PostWithMeta>> {
    let mut query = sqlx::query(sql);
    if let Some(tag_id) = tag_id {
        query = query.bind(tag_id);
    }

    let rows = query.bind(limit as i64).fetch_all(pool).await?;

    Ok(rows.iter().map(row_to_post_sqlite).collect())
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<PostWithMeta>> {
    let row = sqlx::query(SELECT_BY_SLUG)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_sqlite))
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> PostWithMeta {
    let post = Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        image: row.get("image"),
        published_at: row.get("published_at"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    };
    PostWithMeta::new(post, row.get("author"), row.get("likes_count"))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, input: &CreatePostInput) -> Result<Post> {
    let result = sqlx::query(INSERT_POST)
        .bind(&input.title)
        .bind(&input.text)
        .bind(&input.image)
        .bind(input.published_at)
        .bind(&input.slug)
        .bind(input.author_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create post '{}'", input.slug))?;

    Ok(post_from_input(result.last_insert_id() as i64, input))
}

async fn list_posts_mysql(
    pool: &MySqlPool,
    sql: &str,
    tag_id: Option<i64>,
    limit: usize,
) -> Result<Vec<PostWithMeta>> {
    let mut query = sqlx::query(sql);
    if let Some(tag_id) = tag_id {
        query = query.bind(tag_id);
    }

    let rows = query.bind(limit as i64).fetch_all(pool).await?;

    Ok(rows.iter().map(row_to_post_mysql).collect())
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<PostWithMeta>> {
    let row = sqlx::query(SELECT_BY_SLUG)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    Ok(row.as_ref().map(row_to_post_mysql))
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> PostWithMeta {
    let post = Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        image: row.get("image"),
        published_at: row.get("published_at"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    };
    PostWithMeta::new(post, row.get("author"), row.get("likes_count"))
}
