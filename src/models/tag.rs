//! Tag model
//!
//! Tags are identified by their unique title, which is also the URL segment
//! of the tag listing page.

use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Unique tag title
    pub title: String,
}

impl Tag {
    /// Create a new Tag with the given title.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: String) -> Self {
        Self { id: 0, title }
    }
}

/// Tag annotated with the number of posts carrying it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagWithCount {
    /// The tag itself
    #[serde(flatten)]
    pub tag: Tag,
    /// Number of posts with this tag
    pub posts_count: i64,
}

impl TagWithCount {
    /// Create a new TagWithCount
    pub fn new(tag: Tag, posts_count: i64) -> Self {
        Self { tag, posts_count }
    }
}
