//! User repository
//!
//! Database operations for users. The front pages never read users directly
//! (authors are joined into post and comment queries); this repository backs
//! content seeding and tests.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, username: &str) -> Result<User>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Count total users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, username: &str) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.sqlite()?, username).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.mysql()?, username).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_user_by_username_sqlite(self.pool.sqlite()?, username).await
            }
            DatabaseDriver::Mysql => {
                get_user_by_username_mysql(self.pool.mysql()?, username).await
            }
        }
    }

    async fn count(&self) -> Result<i64> {
        let count = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar::<_, i64>(COUNT_USERS)
                    .fetch_one(self.pool.sqlite()?)
                    .await
            }
            DatabaseDriver::Mysql => {
                sqlx::query_scalar::<_, i64>(COUNT_USERS)
                    .fetch_one(self.pool.mysql()?)
                    .await
            }
        };
        count.context("Failed to count users")
    }
}

const INSERT_USER: &str = "INSERT INTO users (username, created_at) VALUES (?, ?)";
const SELECT_BY_USERNAME: &str = "SELECT id, username, created_at FROM users WHERE username = ?";
const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, username: &str) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_USER)
        .bind(username)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create user '{}'", username))?;

    Ok(User {
        id: result.last_insert_rowid(),
        username: username.to_string(),
        created_at: now,
    })
}

async fn get_user_by_username_sqlite(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, username: &str) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(INSERT_USER)
        .bind(username)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create user '{}'", username))?;

    Ok(User {
        id: result.last_insert_id() as i64,
        username: username.to_string(),
        created_at: now,
    })
}

async fn get_user_by_username_mysql(pool: &MySqlPool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_BY_USERNAME)
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;

    Ok(row.map(|row| User {
        id: row.get("id"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }))
}
