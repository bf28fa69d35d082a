//! Front page handlers
//!
//! Each handler asks `BlogService` for its page data and renders it with
//! the theme template of the same page:
//! - GET /                   -> index.html
//! - GET /posts/{slug}/      -> post-details.html
//! - GET /tags/{tag_title}/  -> posts-list.html
//! - GET /contacts/          -> contacts.html

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Html,
};
use serde::Serialize;
use tera::Context as TeraContext;

use crate::api::middleware::{AppState, PageError};

/// Template of the index page
pub const INDEX_TEMPLATE: &str = "index.html";
/// Template of a post page
pub const POST_DETAIL_TEMPLATE: &str = "post-details.html";
/// Template of a tag page
pub const TAG_FILTER_TEMPLATE: &str = "posts-list.html";
/// Template of the contacts page
pub const CONTACTS_TEMPLATE: &str = "contacts.html";

/// GET /
pub async fn index(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .index()
        .await
        .map_err(|e| PageError::from_service(&state, uri.path(), e))?;

    render(&state, INDEX_TEMPLATE, &page, uri.path())
}

/// GET /posts/{slug}/
pub async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    uri: Uri,
) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .post_detail(&slug)
        .await
        .map_err(|e| PageError::from_service(&state, uri.path(), e))?;

    render(&state, POST_DETAIL_TEMPLATE, &page, uri.path())
}

/// GET /tags/{tag_title}/
pub async fn tag_filter(
    State(state): State<AppState>,
    Path(tag_title): Path<String>,
    uri: Uri,
) -> Result<Html<String>, PageError> {
    let page = state
        .blog_service
        .tag_filter(&tag_title)
        .await
        .map_err(|e| PageError::from_service(&state, uri.path(), e))?;

    render(&state, TAG_FILTER_TEMPLATE, &page, uri.path())
}

/// GET /contacts/
pub async fn contacts(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Html<String>, PageError> {
    let page = state.blog_service.contacts();
    render(&state, CONTACTS_TEMPLATE, &page, uri.path())
}

/// Fallback for every unknown route
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> PageError {
    PageError::not_found(&state, uri.path())
}

fn render<T: Serialize>(
    state: &AppState,
    template: &str,
    page: &T,
    request_path: &str,
) -> Result<Html<String>, PageError> {
    let context = TeraContext::from_serialize(page)
        .map_err(|e| PageError::internal(state, request_path, &anyhow::Error::from(e)))?;
    state.render_page(template, &context, request_path)
}
