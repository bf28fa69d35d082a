//! Admin registry
//!
//! Content is managed by an external administrative UI. `AdminSite` is the
//! explicit description of what that UI manages: one `ModelAdmin` per model,
//! with the columns shown in its list view and the relations edited by raw
//! ID instead of a select box. It is built once at startup and kept in the
//! application state.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Admin registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    /// The model already has an admin registered
    #[error("Model already registered: {0}")]
    AlreadyRegistered(String),
}

/// How one model appears in the admin UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    pub model: String,
    /// Columns of the change list; empty means the default representation
    pub list_display: Vec<String>,
    /// Relations edited by raw ID
    pub raw_id_fields: Vec<String>,
}

impl ModelAdmin {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            list_display: Vec::new(),
            raw_id_fields: Vec::new(),
        }
    }

    pub fn list_display(mut self, fields: &[&str]) -> Self {
        self.list_display = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn raw_id_fields(mut self, fields: &[&str]) -> Self {
        self.raw_id_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }
}

/// Models managed by the admin UI
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminSite {
    models: BTreeMap<String, ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// The blog's admin: tags, posts and comments.
    pub fn blog() -> Self {
        let mut site = Self::new();
        let registrations = [
            ModelAdmin::new("tag"),
            ModelAdmin::new("post").raw_id_fields(&["likes", "author", "tags"]),
            ModelAdmin::new("comment")
                .list_display(&["post", "author"])
                .raw_id_fields(&["post", "author"]),
        ];
        for admin in registrations {
            if let Err(e) = site.register(admin) {
                tracing::warn!("{}", e);
            }
        }
        site
    }

    /// Register a model admin
    ///
    /// # Errors
    /// - `AlreadyRegistered` if the model has one already
    pub fn register(&mut self, admin: ModelAdmin) -> Result<(), AdminError> {
        if self.models.contains_key(&admin.model) {
            return Err(AdminError::AlreadyRegistered(admin.model));
        }
        self.models.insert(admin.model.clone(), admin);
        Ok(())
    }

    /// Look up a model admin by model name
    pub fn get(&self, model: &str) -> Option<&ModelAdmin> {
        self.models.get(model)
    }

    /// Registered models, sorted by name
    pub fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.models.values()
    }

    pub fn is_registered(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_site_registrations() {
        let site = AdminSite::blog();

        let names: Vec<&str> = site.models().map(|m| m.model.as_str()).collect();
        assert_eq!(names, vec!["comment", "post", "tag"]);

        let post = site.get("post").unwrap();
        assert_eq!(post.raw_id_fields, vec!["likes", "author", "tags"]);
        assert!(post.list_display.is_empty());

        let comment = site.get("comment").unwrap();
        assert_eq!(comment.list_display, vec!["post", "author"]);
        assert_eq!(comment.raw_id_fields, vec!["post", "author"]);

        assert_eq!(site.get("tag"), Some(&ModelAdmin::new("tag")));
        assert!(!site.is_registered("user"));
    }

    #[test]
    fn test_register_twice_fails() {
        let mut site = AdminSite::new();
        site.register(ModelAdmin::new("tag")).unwrap();

        let result = site.register(ModelAdmin::new("tag").list_display(&["title"]));
        assert_eq!(result, Err(AdminError::AlreadyRegistered("tag".to_string())));
        assert!(site.get("tag").unwrap().list_display.is_empty());
    }
}
