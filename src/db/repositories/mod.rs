//! Database repositories
//!
//! One repository per entity. Every list query documents what it loads
//! eagerly; nothing is fetched lazily per row.

pub mod comment;
pub mod post;
pub mod tag;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// Comma-separated `?` placeholders for an `IN (...)` list of `count` values
pub(crate) fn in_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
