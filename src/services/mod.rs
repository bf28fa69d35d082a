//! Services layer - Business logic
//!
//! Services sit between the repositories and the HTTP handlers:
//! - `blog` composes the data of each front page
//! - `serialize` flattens loaded entities into view models
//! - `media` resolves stored image paths to public URLs

pub mod blog;
#[cfg(feature = "demo")]
pub mod demo;
pub mod media;
pub mod serialize;

pub use blog::{
    BlogService, BlogServiceError, ContactsPage, IndexPage, PostDetailPage, TagFilterPage,
    FRESH_POSTS_LIMIT, POPULAR_POSTS_LIMIT, POPULAR_TAGS_LIMIT, TAG_POSTS_LIMIT,
};
pub use media::MediaStorage;
pub use serialize::{
    serialize_comment, serialize_post, serialize_post_detail, serialize_tag, teaser, CommentView,
    PostDetailView, PostView, TagView, TEASER_LENGTH,
};
