//! Post model
//!
//! This module defines the Post entity, the input used to create posts, and
//! `PostWithMeta`, the eagerly-loaded shape every post listing works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TagWithCount;

/// Post entity representing a published blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Full body text
    pub text: String,
    /// Stored media path of the cover image, if any
    pub image: Option<String>,
    /// Publication timestamp
    pub published_at: DateTime<Utc>,
    /// URL-friendly unique identifier
    pub slug: String,
    /// Author user ID
    pub author_id: i64,
}

/// Post with the relations and aggregates the pages need.
///
/// Repositories fill `author` and `likes_count` from the same query that
/// loads the post. `tags` and `comments_count` are attached afterwards with
/// one batched query each for a whole list of posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostWithMeta {
    #[serde(flatten)]
    pub post: Post,
    /// Author username
    pub author: String,
    /// Number of users who liked the post
    pub likes_count: i64,
    /// Number of comments on the post
    #[serde(default)]
    pub comments_count: i64,
    /// Tags of the post, most popular first
    #[serde(default)]
    pub tags: Vec<TagWithCount>,
}

impl PostWithMeta {
    /// Wrap a post row with its joined author and like count.
    pub fn new(post: Post, author: String, likes_count: i64) -> Self {
        Self {
            post,
            author,
            likes_count,
            comments_count: 0,
            tags: Vec::new(),
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub author_id: i64,
}

impl CreatePostInput {
    /// Create input for a post published now without an image
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        text: impl Into<String>,
        author_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            image: None,
            published_at: Utc::now(),
            slug: slug.into(),
            author_id,
        }
    }

    /// Set the stored image path
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Override the publication time
    pub fn published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }
}
