//! Database layer
//!
//! blogfront stores its content in SQLite (default) or MySQL, selected by
//! configuration. The `DatabasePool` trait hides the backend; repositories
//! dispatch on the driver and run the same SQL against either pool.
//!
//! # Usage
//!
//! ```ignore
//! use blogfront::config::DatabaseConfig;
//! use blogfront::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
