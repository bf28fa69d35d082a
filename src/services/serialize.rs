//! View-model serialization
//!
//! Flattens loaded entities into the plain structures templates consume.
//! Nothing here touches the database: posts arrive with their author, counts
//! and popularity-ordered tags already attached.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CommentWithAuthor, PostWithMeta, TagWithCount};
use crate::services::media::MediaStorage;

/// Maximum teaser length, in characters
pub const TEASER_LENGTH: usize = 200;

/// Post as shown in listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostView {
    pub title: String,
    pub teaser_text: String,
    pub author: String,
    pub comments_count: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagView>,
    pub first_tag_title: Option<String>,
}

/// Tag with its popularity
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagView {
    pub title: String,
    pub posts_count: i64,
}

/// Comment under a post
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentView {
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
}

/// Post as shown on its own page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostDetailView {
    pub title: String,
    pub text: String,
    pub author: String,
    pub comments: Vec<CommentView>,
    pub likes_count: i64,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub slug: String,
    pub tags: Vec<TagView>,
}

/// First `TEASER_LENGTH` characters of `text`
pub fn teaser(text: &str) -> String {
    text.chars().take(TEASER_LENGTH).collect()
}

pub fn serialize_tag(tag: &TagWithCount) -> TagView {
    TagView {
        title: tag.tag.title.clone(),
        posts_count: tag.posts_count,
    }
}

pub fn serialize_comment(comment: &CommentWithAuthor) -> CommentView {
    CommentView {
        text: comment.comment.text.clone(),
        published_at: comment.comment.published_at,
        author: comment.author.clone(),
    }
}

/// Listing view of a post; `first_tag_title` is the most popular tag's title.
pub fn serialize_post(post: &PostWithMeta, media: &MediaStorage) -> PostView {
    PostView {
        title: post.post.title.clone(),
        teaser_text: teaser(&post.post.text),
        author: post.author.clone(),
        comments_count: post.comments_count,
        image_url: media.optional_url(post.post.image.as_deref()),
        published_at: post.post.published_at,
        slug: post.post.slug.clone(),
        tags: post.tags.iter().map(serialize_tag).collect(),
        first_tag_title: post.tags.first().map(|tag| tag.tag.title.clone()),
    }
}

/// Full view of a post with its comments and popularity-ordered tags
pub fn serialize_post_detail(
    post: &PostWithMeta,
    comments: &[CommentWithAuthor],
    tags: &[TagWithCount],
    media: &MediaStorage,
) -> PostDetailView {
    PostDetailView {
        title: post.post.title.clone(),
        text: post.post.text.clone(),
        author: post.author.clone(),
        comments: comments.iter().map(serialize_comment).collect(),
        likes_count: post.likes_count,
        image_url: media.optional_url(post.post.image.as_deref()),
        published_at: post.post.published_at,
        slug: post.post.slug.clone(),
        tags: tags.iter().map(serialize_tag).collect(),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::Post;
    use proptest::prelude::*;

    fn post_with(text: String, image: Option<String>) -> PostWithMeta {
        let post = Post {
            id: 1,
            title: "T".to_string(),
            text,
            image,
            published_at: Utc::now(),
            slug: "t".to_string(),
            author_id: 1,
        };
        PostWithMeta::new(post, "a".to_string(), 0)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The teaser never exceeds the limit and is always a prefix of the text.
        #[test]
        fn teaser_is_bounded_prefix(text in "\\PC{0,400}") {
            let view = serialize_post(&post_with(text.clone(), None), &MediaStorage::default());

            prop_assert!(view.teaser_text.chars().count() <= TEASER_LENGTH);
            prop_assert!(text.starts_with(&view.teaser_text));
            if text.chars().count() <= TEASER_LENGTH {
                prop_assert_eq!(&view.teaser_text, &text);
            }
        }

        /// A stored image always yields a non-empty URL, and no image yields none.
        #[test]
        fn image_url_presence_follows_image(image in proptest::option::of("[a-z]{1,12}/[a-z]{1,12}\\.png")) {
            let view = serialize_post(&post_with("x".to_string(), image.clone()), &MediaStorage::default());

            match image {
                Some(_) => prop_assert!(view.image_url.map_or(false, |url| !url.is_empty())),
                None => prop_assert!(view.image_url.is_none()),
            }
        }
    }
}
