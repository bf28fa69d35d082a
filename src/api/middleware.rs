//! Shared handler state and error pages
//!
//! `AppState` is built once at startup and cloned into every handler.
//! `PageError` carries an already rendered HTML page with its status code,
//! so handlers can return it with `?`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tera::Context as TeraContext;

use crate::admin::AdminSite;
use crate::config::SiteConfig;
use crate::services::{BlogService, BlogServiceError};
use crate::theme::{StandardTemplateVars, ThemeEngine, NOT_FOUND_TEMPLATE};

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub blog_service: Arc<BlogService>,
    pub theme_engine: Arc<ThemeEngine>,
    pub site: Arc<SiteConfig>,
    pub admin_site: Arc<AdminSite>,
}

impl AppState {
    /// Standard template variables for a request path
    pub fn standard_vars(&self, request_path: &str) -> StandardTemplateVars {
        StandardTemplateVars::new(&self.site.name, &self.site.description, request_path)
    }

    /// Render a page template with the standard variables.
    ///
    /// A template that fails to render yields the 500 error page.
    pub fn render_page(
        &self,
        template: &str,
        context: &TeraContext,
        request_path: &str,
    ) -> Result<Html<String>, PageError> {
        self.theme_engine
            .render_with_standard_vars(template, context, &self.standard_vars(request_path))
            .map(Html)
            .map_err(|e| PageError::internal(self, request_path, &e))
    }
}

/// Rendered error page
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub body: String,
}

impl PageError {
    /// 404 page for `request_path`
    pub fn not_found(state: &AppState, request_path: &str) -> Self {
        match state.render_page(NOT_FOUND_TEMPLATE, &TeraContext::new(), request_path) {
            Ok(Html(body)) => Self {
                status: StatusCode::NOT_FOUND,
                body,
            },
            Err(error_page) => error_page,
        }
    }

    /// 500 page; the cause is logged, not shown
    pub fn internal(state: &AppState, request_path: &str, error: &anyhow::Error) -> Self {
        tracing::error!("Failed to serve {}: {:#}", request_path, error);
        let body = state
            .theme_engine
            .render_error_page("Internal server error", &state.standard_vars(request_path));
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        }
    }

    /// Map a page composition error to its page
    pub fn from_service(state: &AppState, request_path: &str, error: BlogServiceError) -> Self {
        match error {
            BlogServiceError::NotFound(what) => {
                tracing::debug!("{} not found for {}", what, request_path);
                Self::not_found(state, request_path)
            }
            BlogServiceError::InternalError(e) => Self::internal(state, request_path, &e),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}
