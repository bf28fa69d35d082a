//! Blog page composition
//!
//! `BlogService` assembles the data of each front page from the repositories
//! and flattens it into view models:
//! - index: most popular posts, freshest posts, most popular tags
//! - post detail: the post with comments and tags, plus the popular sidebars
//! - tag filter: posts under a tag, plus the popular sidebars
//! - contacts: static
//!
//! Every post listing goes through `fetch_with_comments_count`, which
//! attaches tags and comment counts with one query each for the whole list.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repositories::{
    CommentRepository, PostRepository, SqlxCommentRepository, SqlxPostRepository,
    SqlxTagRepository, TagRepository,
};
use crate::db::DynDatabasePool;
use crate::models::PostWithMeta;
use crate::services::media::MediaStorage;
use crate::services::serialize::{
    serialize_post, serialize_post_detail, serialize_tag, PostDetailView, PostView, TagView,
};

/// Posts in the "most popular" sidebar
pub const POPULAR_POSTS_LIMIT: usize = 5;
/// Posts in the "fresh" list of the index page
pub const FRESH_POSTS_LIMIT: usize = 5;
/// Tags in the "popular tags" sidebar
pub const POPULAR_TAGS_LIMIT: usize = 5;
/// Posts listed on a tag page
pub const TAG_POSTS_LIMIT: usize = 20;

/// Error types for page composition
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// No post or tag matches the requested key
    #[error("{0} not found")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Data of the index page
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    pub most_popular_posts: Vec<PostView>,
    pub page_posts: Vec<PostView>,
    pub popular_tags: Vec<TagView>,
}

/// Data of a post page
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailPage {
    pub post: PostDetailView,
    pub popular_tags: Vec<TagView>,
    pub most_popular_posts: Vec<PostView>,
}

/// Data of a tag page
#[derive(Debug, Clone, Serialize)]
pub struct TagFilterPage {
    pub tag: String,
    pub popular_tags: Vec<TagView>,
    pub posts: Vec<PostView>,
    pub most_popular_posts: Vec<PostView>,
}

/// Data of the contacts page
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactsPage {}

/// Composes the front pages
pub struct BlogService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    media: MediaStorage,
}

impl BlogService {
    /// Create a new blog service
    pub fn new(
        posts: Arc<dyn PostRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
        media: MediaStorage,
    ) -> Self {
        Self {
            posts,
            tags,
            comments,
            media,
        }
    }

    /// Create a blog service backed by the SQLx repositories
    pub fn from_pool(pool: DynDatabasePool, media: MediaStorage) -> Self {
        Self::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxCommentRepository::boxed(pool),
            media,
        )
    }

    /// Index page: popular posts, fresh posts and popular tags
    pub async fn index(&self) -> Result<IndexPage, BlogServiceError> {
        let most_popular_posts = self.most_popular_posts().await?;

        let fresh = self.posts.fresh(FRESH_POSTS_LIMIT).await?;
        let fresh = self.fetch_with_comments_count(fresh).await?;

        Ok(IndexPage {
            most_popular_posts,
            page_posts: self.serialize_posts(&fresh),
            popular_tags: self.most_popular_tags().await?,
        })
    }

    /// Post page for the post with exactly this slug
    ///
    /// # Errors
    /// - `NotFound` if no post has the slug
    pub async fn post_detail(&self, slug: &str) -> Result<PostDetailPage, BlogServiceError> {
        let post = self
            .posts
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| BlogServiceError::NotFound(format!("Post '{}'", slug)))?;

        let comments = self.comments.list_for_post(post.post.id).await?;
        let tags = self
            .tags
            .popular_for_posts(&[post.post.id])
            .await?
            .remove(&post.post.id)
            .unwrap_or_default();

        Ok(PostDetailPage {
            post: serialize_post_detail(&post, &comments, &tags, &self.media),
            popular_tags: self.most_popular_tags().await?,
            most_popular_posts: self.most_popular_posts().await?,
        })
    }

    /// Tag page for the tag with exactly this title
    ///
    /// # Errors
    /// - `NotFound` if no tag has the title
    pub async fn tag_filter(&self, tag_title: &str) -> Result<TagFilterPage, BlogServiceError> {
        let tag = self
            .tags
            .get_by_title(tag_title)
            .await?
            .ok_or_else(|| BlogServiceError::NotFound(format!("Tag '{}'", tag_title)))?;

        let related = self.posts.by_tag(tag.id, TAG_POSTS_LIMIT).await?;
        let related = self.fetch_with_comments_count(related).await?;

        Ok(TagFilterPage {
            tag: tag.title,
            popular_tags: self.most_popular_tags().await?,
            posts: self.serialize_posts(&related),
            most_popular_posts: self.most_popular_posts().await?,
        })
    }

    /// Contacts page
    pub fn contacts(&self) -> ContactsPage {
        ContactsPage::default()
    }

    /// Most liked posts, serialized for the sidebar
    pub async fn most_popular_posts(&self) -> Result<Vec<PostView>, BlogServiceError> {
        let posts = self.posts.popular(POPULAR_POSTS_LIMIT).await?;
        let posts = self.fetch_with_comments_count(posts).await?;
        Ok(self.serialize_posts(&posts))
    }

    /// Most used tags, serialized for the sidebar
    pub async fn most_popular_tags(&self) -> Result<Vec<TagView>, BlogServiceError> {
        let tags = self.tags.popular(POPULAR_TAGS_LIMIT).await?;
        Ok(tags.iter().map(serialize_tag).collect())
    }

    /// Attach tags (most popular first) and comment counts to a post list.
    ///
    /// Runs exactly two queries regardless of the list length, none for an
    /// empty list.
    pub async fn fetch_with_comments_count(
        &self,
        mut posts: Vec<PostWithMeta>,
    ) -> anyhow::Result<Vec<PostWithMeta>> {
        if posts.is_empty() {
            return Ok(posts);
        }

        let ids: Vec<i64> = posts.iter().map(|p| p.post.id).collect();
        let mut tags = self.tags.popular_for_posts(&ids).await?;
        let counts: HashMap<i64, i64> = self.comments.count_for_posts(&ids).await?;

        for post in &mut posts {
            post.tags = tags.remove(&post.post.id).unwrap_or_default();
            post.comments_count = counts.get(&post.post.id).copied().unwrap_or(0);
        }

        Ok(posts)
    }

    fn serialize_posts(&self, posts: &[PostWithMeta]) -> Vec<PostView> {
        posts
            .iter()
            .map(|post| serialize_post(post, &self.media))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateCommentInput, CreatePostInput, Post};
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        pool: DynDatabasePool,
        service: BlogService,
        author_id: i64,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let author = SqlxUserRepository::new(pool.clone())
            .create("author")
            .await
            .expect("Failed to create author");
        Fixture {
            service: BlogService::from_pool(pool.clone(), MediaStorage::default()),
            pool,
            author_id: author.id,
        }
    }

    impl Fixture {
        fn posts(&self) -> SqlxPostRepository {
            SqlxPostRepository::new(self.pool.clone())
        }

        fn tags(&self) -> SqlxTagRepository {
            SqlxTagRepository::new(self.pool.clone())
        }

        /// Post published `hours` after a fixed epoch
        async fn post(&self, slug: &str, hours: i64) -> Post {
            let epoch = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
            self.posts()
                .create(
                    &CreatePostInput::new(format!("Title {}", slug), slug, "Body", self.author_id)
                        .published_at(epoch + Duration::hours(hours)),
                )
                .await
                .expect("Failed to create post")
        }

        async fn users(&self, prefix: &str, count: usize) -> Vec<i64> {
            let users = SqlxUserRepository::new(self.pool.clone());
            let mut ids = Vec::new();
            for i in 0..count {
                ids.push(users.create(&format!("{}-{}", prefix, i)).await.unwrap().id);
            }
            ids
        }
    }

    #[tokio::test]
    async fn test_index_most_popular_posts_by_likes() {
        let fx = setup().await;
        let likers = fx.users("liker", 5).await;

        for likes in 0..6usize {
            let post = fx.post(&format!("likes-{}", likes), likes as i64).await;
            for liker in likers.iter().take(likes) {
                fx.posts().add_like(post.id, *liker).await.unwrap();
            }
        }

        let page = fx.service.index().await.unwrap();
        let slugs: Vec<&str> = page.most_popular_posts.iter().map(|p| p.slug.as_str()).collect();

        assert_eq!(slugs, vec!["likes-5", "likes-4", "likes-3", "likes-2", "likes-1"]);
    }

    #[tokio::test]
    async fn test_index_fresh_posts_are_latest_five_ascending() {
        let fx = setup().await;
        for (slug, hours) in [("h4", 4), ("h0", 0), ("h6", 6), ("h2", 2), ("h5", 5), ("h1", 1), ("h3", 3)] {
            fx.post(slug, hours).await;
        }

        let page = fx.service.index().await.unwrap();
        let fresh = &page.page_posts;

        let slugs: Vec<&str> = fresh.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["h2", "h3", "h4", "h5", "h6"]);
        assert!(fresh.windows(2).all(|w| w[0].published_at <= w[1].published_at));
    }

    #[tokio::test]
    async fn test_index_attaches_comment_counts_and_tags() {
        let fx = setup().await;
        let post = fx.post("commented", 1).await;
        fx.post("quiet", 2).await;

        let comments = SqlxCommentRepository::new(fx.pool.clone());
        for _ in 0..2 {
            comments
                .create(&CreateCommentInput::new(post.id, fx.author_id, "hi"))
                .await
                .unwrap();
        }
        let tag = fx.tags().create("python").await.unwrap();
        fx.tags().add_to_post(tag.id, post.id).await.unwrap();

        let page = fx.service.index().await.unwrap();
        let commented = page.page_posts.iter().find(|p| p.slug == "commented").unwrap();
        let quiet = page.page_posts.iter().find(|p| p.slug == "quiet").unwrap();

        assert_eq!(commented.comments_count, 2);
        assert_eq!(commented.first_tag_title.as_deref(), Some("python"));
        assert_eq!(quiet.comments_count, 0);
        assert!(quiet.first_tag_title.is_none());
        assert_eq!(page.popular_tags[0].title, "python");
        assert_eq!(page.popular_tags[0].posts_count, 1);
    }

    #[tokio::test]
    async fn test_index_on_empty_store() {
        let fx = setup().await;

        let page = fx.service.index().await.unwrap();
        assert!(page.most_popular_posts.is_empty());
        assert!(page.page_posts.is_empty());
        assert!(page.popular_tags.is_empty());
    }

    #[tokio::test]
    async fn test_post_detail() {
        let fx = setup().await;
        let post = fx.post("detail", 1).await;
        let other = fx.post("other", 2).await;

        let rare = fx.tags().create("rare").await.unwrap();
        let common = fx.tags().create("common").await.unwrap();
        fx.tags().add_to_post(rare.id, post.id).await.unwrap();
        fx.tags().add_to_post(common.id, post.id).await.unwrap();
        fx.tags().add_to_post(common.id, other.id).await.unwrap();

        let readers = fx.users("reader", 2).await;
        fx.posts().add_like(post.id, readers[0]).await.unwrap();

        let comments = SqlxCommentRepository::new(fx.pool.clone());
        let at = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        comments
            .create(&CreateCommentInput::new(post.id, readers[1], "later").published_at(at + Duration::minutes(5)))
            .await
            .unwrap();
        comments
            .create(&CreateCommentInput::new(post.id, readers[0], "earlier").published_at(at))
            .await
            .unwrap();

        let page = fx.service.post_detail("detail").await.unwrap();

        assert_eq!(page.post.slug, "detail");
        assert_eq!(page.post.likes_count, 1);
        assert_eq!(page.post.author, "author");
        let texts: Vec<&str> = page.post.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["earlier", "later"]);
        assert_eq!(page.post.comments[0].author, "reader-0");
        let tags: Vec<&str> = page.post.tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(tags, vec!["common", "rare"]);
        assert_eq!(page.most_popular_posts[0].slug, "detail");
        assert_eq!(page.popular_tags.len(), 2);
    }

    #[tokio::test]
    async fn test_post_detail_unknown_slug() {
        let fx = setup().await;
        fx.post("exists", 1).await;

        let result = fx.service.post_detail("missing").await;
        assert!(matches!(result, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_tag_filter_returns_only_tagged_posts() {
        let fx = setup().await;
        let python = fx.tags().create("python").await.unwrap();
        let rust = fx.tags().create("rust").await.unwrap();

        for i in 0..6 {
            let post = fx.post(&format!("p{}", i), i).await;
            let tag = if i % 2 == 0 { &python } else { &rust };
            fx.tags().add_to_post(tag.id, post.id).await.unwrap();
        }

        let page = fx.service.tag_filter("python").await.unwrap();
        let slugs: Vec<&str> = page.posts.iter().map(|p| p.slug.as_str()).collect();

        assert_eq!(page.tag, "python");
        assert_eq!(slugs, vec!["p4", "p2", "p0"]);
        assert!(page
            .posts
            .iter()
            .all(|p| p.tags.iter().any(|t| t.title == "python")));
        assert_eq!(page.most_popular_posts.len(), 5);
    }

    #[tokio::test]
    async fn test_tag_filter_limits_posts() {
        let fx = setup().await;
        let tag = fx.tags().create("busy").await.unwrap();
        for i in 0..(TAG_POSTS_LIMIT as i64 + 3) {
            let post = fx.post(&format!("p{}", i), i).await;
            fx.tags().add_to_post(tag.id, post.id).await.unwrap();
        }

        let page = fx.service.tag_filter("busy").await.unwrap();
        assert_eq!(page.posts.len(), TAG_POSTS_LIMIT);
    }

    #[tokio::test]
    async fn test_tag_filter_unknown_tag() {
        let fx = setup().await;

        let result = fx.service.tag_filter("nope").await;
        assert!(matches!(result, Err(BlogServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_with_comments_count_empty_list() {
        let fx = setup().await;

        let posts = fx.service.fetch_with_comments_count(Vec::new()).await.unwrap();
        assert!(posts.is_empty());
    }

    #[test]
    fn test_contacts_is_empty() {
        let page = ContactsPage::default();
        assert_eq!(serde_json::to_value(&page).unwrap(), serde_json::json!({}));
    }
}
