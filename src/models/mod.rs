//! Data models
//!
//! This module contains the data structures used throughout blogfront:
//! - Database entities (Post, Tag, Comment, User)
//! - Eagerly-loaded read models (PostWithMeta, TagWithCount, CommentWithAuthor)
//! - Inputs used to create content

mod comment;
mod post;
mod tag;
mod user;

pub use comment::{Comment, CommentWithAuthor, CreateCommentInput};
pub use post::{CreatePostInput, Post, PostWithMeta};
pub use tag::{Tag, TagWithCount};
pub use user::User;
