//! Media storage
//!
//! Posts store the relative path of their image inside the media directory.
//! `MediaStorage` turns that path into the public URL templates link to, and
//! knows where the files live so the router can serve them.

use std::path::{Path, PathBuf};

use crate::config::MediaConfig;

/// Resolves stored media paths to public URLs
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    /// Create a storage rooted at `root`, published under `url_prefix`
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    /// Build from the `media` configuration section
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.path.clone(), config.url_prefix.clone())
    }

    /// Directory holding the media files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL prefix, always ending with `/`
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Whether files are published by this server rather than an external host
    pub fn is_served_locally(&self) -> bool {
        self.url_prefix.starts_with('/') && !self.url_prefix.starts_with("//")
    }

    /// Public URL of a stored file, each path segment percent-encoded
    pub fn url(&self, stored_path: &str) -> String {
        let encoded: Vec<_> = stored_path
            .trim_start_matches('/')
            .split('/')
            .map(urlencoding::encode)
            .collect();
        format!("{}{}", self.url_prefix, encoded.join("/"))
    }

    /// Public URL of an optional stored file; empty paths count as missing
    pub fn optional_url(&self, stored_path: Option<&str>) -> Option<String> {
        stored_path
            .filter(|path| !path.trim().is_empty())
            .map(|path| self.url(path))
    }
}

impl Default for MediaStorage {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}
