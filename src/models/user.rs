//! User model
//!
//! Users author posts and comments and like posts. Accounts are managed
//! by the external administrative UI; the front pages only display usernames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique username shown as the author of posts and comments
    pub username: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given username.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(username: String) -> Self {
        Self {
            id: 0,
            username,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("admin".to_string());

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "admin");
    }
}
