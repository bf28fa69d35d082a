//! Demo content
//!
//! Seeds a handful of users, tags, posts, likes and comments into an empty
//! database so the front pages have something to show. Only compiled with
//! `--features demo`.

use anyhow::Result;
use chrono::{Duration, Utc};

use crate::db::repositories::{
    CommentRepository, PostRepository, SqlxCommentRepository, SqlxPostRepository,
    SqlxTagRepository, SqlxUserRepository, TagRepository, UserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::{CreateCommentInput, CreatePostInput};

const USERS: [&str; 4] = ["editor", "alice", "bob", "carol"];

const TAGS: [&str; 4] = ["rust", "web", "databases", "notes"];

/// (title, slug, tag indexes, likes); likes never exceed the user count
const POSTS: [(&str, &str, &[usize], usize); 6] = [
    ("Getting started", "getting-started", &[3], 1),
    ("Routing requests", "routing-requests", &[0, 1], 3),
    ("Templates on the server", "templates-on-the-server", &[1], 2),
    ("Counting likes in SQL", "counting-likes-in-sql", &[0, 2], 4),
    ("Tags and popularity", "tags-and-popularity", &[2, 3], 0),
    ("Serving media files", "serving-media-files", &[1], 1),
];

const BODY: &str = "This is demo content. Each post has a slug, an author, a few tags \
and some likes so that the index, the post pages and the tag pages all have \
something to list. Replace it with real posts once the blog is up.";

/// Seed demo content. Returns `false` without touching anything when the
/// database already has users.
pub async fn seed(pool: &DynDatabasePool) -> Result<bool> {
    let users = SqlxUserRepository::new(pool.clone());
    if users.count().await? > 0 {
        return Ok(false);
    }

    let posts = SqlxPostRepository::new(pool.clone());
    let tags = SqlxTagRepository::new(pool.clone());
    let comments = SqlxCommentRepository::new(pool.clone());

    let mut user_ids = Vec::with_capacity(USERS.len());
    for username in USERS {
        user_ids.push(users.create(username).await?.id);
    }

    let mut tag_ids = Vec::with_capacity(TAGS.len());
    for title in TAGS {
        tag_ids.push(tags.create(title).await?.id);
    }

    let start = Utc::now() - Duration::days(POSTS.len() as i64);
    for (i, (title, slug, post_tags, likes)) in POSTS.iter().enumerate() {
        let post = posts
            .create(
                &CreatePostInput::new(*title, *slug, BODY, user_ids[0])
                    .published_at(start + Duration::days(i as i64)),
            )
            .await?;

        for tag_index in post_tags.iter() {
            tags.add_to_post(tag_ids[*tag_index], post.id).await?;
        }

        for user_id in user_ids.iter().take(*likes) {
            posts.add_like(post.id, *user_id).await?;
        }

        if i % 2 == 1 {
            comments
                .create(&CreateCommentInput::new(post.id, user_ids[1 + i % 3], "Nice write-up."))
                .await?;
        }
    }

    tracing::info!(
        "Demo mode: seeded {} users, {} tags and {} posts",
        USERS.len(),
        TAGS.len(),
        POSTS.len()
    );

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn test_seed_only_once() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        assert!(seed(&pool).await.unwrap());
        assert!(!seed(&pool).await.unwrap());

        let users = SqlxUserRepository::new(pool.clone());
        assert_eq!(users.count().await.unwrap(), USERS.len() as i64);

        let popular = SqlxPostRepository::new(pool).popular(1).await.unwrap();
        assert_eq!(popular[0].post.slug, "counting-likes-in-sql");
    }
}
