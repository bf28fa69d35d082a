//! HTTP layer - routing and page handlers
//!
//! Every route renders an HTML page; there is no JSON API.
//! - Front pages (index, post, tag, contacts)
//! - Media files under the configured URL prefix
//! - Rendered 404 page for anything else

pub mod middleware;
pub mod pages;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::services::MediaStorage;

pub use middleware::{AppState, PageError};

/// Build the page routes
pub fn build_page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/posts/{slug}/", get(pages::post_detail))
        .route("/tags/{tag_title}/", get(pages::tag_filter))
        .route("/contacts/", get(pages::contacts))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, media: &MediaStorage) -> Router {
    let mut router = build_page_router();

    if media.is_served_locally() {
        let mount = media.url_prefix().trim_end_matches('/');
        if mount.is_empty() {
            tracing::warn!("Media URL prefix '/' would shadow every page, not serving media");
        } else {
            tracing::debug!("Serving media from {:?} at {}", media.root(), mount);
            router = router.nest_service(mount, ServeDir::new(media.root()));
        }
    }

    router
        .fallback(pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
