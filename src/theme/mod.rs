//! Theme engine
//!
//! This module provides template rendering using Tera.
//! Features:
//! - Built-in templates embedded in the binary
//! - Per-template overrides from a theme directory on disk
//! - Standard template variables
//! - Error page with a plain HTML fallback

use anyhow::{Context, Result};
use chrono::Datelike;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Templates shipped with the binary
#[derive(RustEmbed)]
#[folder = "assets/templates/"]
#[include = "*.html"]
struct BuiltinTemplates;

/// Template rendered when a page or the server fails
pub const ERROR_TEMPLATE: &str = "error.html";

/// Template rendered for unknown pages
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine from the built-in templates, replacing any of
    /// them that also exist under `override_path`.
    ///
    /// A missing override directory is not an error.
    pub fn new(override_path: &Path) -> Result<Self> {
        let tera = load_templates(override_path)?;
        Ok(Self { tera })
    }

    /// Built-in templates only
    pub fn builtin() -> Result<Self> {
        let tera = build_tera(builtin_templates()?)?;
        Ok(Self { tera })
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ThemeError::TemplateError(error_msg).into()
        })
    }

    /// Render a template with standard variables automatically added
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();
        standard_vars.insert_into(&mut full_context);
        self.render(template, &full_context)
    }

    /// Render `error.html`, or a plain HTML page if that fails too.
    ///
    /// `message` is shown to the visitor; callers pass a generic text and
    /// log the actual cause.
    pub fn render_error_page(&self, message: &str, standard_vars: &StandardTemplateVars) -> String {
        let mut context = TeraContext::new();
        standard_vars.insert_into(&mut context);
        context.insert("error_message", message);

        match self.render(ERROR_TEMPLATE, &context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render error template: {}", e);
                simple_error_page("Server Error", message)
            }
        }
    }

    /// Names of all loaded templates, sorted
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(str::to_string).collect();
        names.sort();
        names
    }
}

/// Standard template variables, available to every page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardTemplateVars {
    /// Blog name
    pub site_name: String,
    /// Blog description
    pub site_description: String,
    /// Current request path
    pub request_path: String,
    /// Current year (for copyright)
    pub year: i32,
}

impl StandardTemplateVars {
    /// Create new standard template variables
    pub fn new(
        site_name: impl Into<String>,
        site_description: impl Into<String>,
        request_path: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            site_description: site_description.into(),
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
        }
    }

    fn insert_into(&self, context: &mut TeraContext) {
        context.insert("site_name", &self.site_name);
        context.insert("site_description", &self.site_description);
        context.insert("request_path", &self.request_path);
        context.insert("year", &self.year);
    }
}

/// Built-in templates, then overrides from disk, keyed by template name
fn load_templates(override_path: &Path) -> Result<Tera> {
    let mut templates = builtin_templates()?;

    if override_path.is_dir() {
        let mut overrides = BTreeMap::new();
        collect_templates_from_dir(override_path, override_path, &mut overrides)?;
        for name in overrides.keys() {
            tracing::debug!("Template '{}' overridden from {:?}", name, override_path);
        }
        templates.extend(overrides);
    } else if !override_path.as_os_str().is_empty() {
        tracing::debug!(
            "Theme directory {:?} not found, using built-in templates",
            override_path
        );
    }

    build_tera(templates)
}

fn builtin_templates() -> Result<BTreeMap<String, String>> {
    let mut templates = BTreeMap::new();
    for name in BuiltinTemplates::iter() {
        let file = BuiltinTemplates::get(&name)
            .ok_or_else(|| ThemeError::TemplateError(format!("Missing built-in template {}", name)))?;
        let content = String::from_utf8(file.data.into_owned())
            .with_context(|| format!("Built-in template {} is not UTF-8", name))?;
        templates.insert(name.to_string(), content);
    }
    Ok(templates)
}

fn build_tera(templates: BTreeMap<String, String>) -> Result<Tera> {
    let mut tera = Tera::default();

    // Added in one batch so inheritance resolves regardless of order
    tera.add_raw_templates(templates)
        .map_err(|e| ThemeError::TemplateError(format!("Failed to add templates: {}", e)))?;

    Ok(tera)
}

/// Collect `.html` files under `current_path`, named relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut BTreeMap<String, String>,
) -> Result<()> {
    for entry in fs::read_dir(current_path)
        .with_context(|| format!("Failed to read theme directory: {:?}", current_path))?
    {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;

            templates.insert(template_name, content);
        }
    }

    Ok(())
}

/// Last-resort page when even the error template fails
fn simple_error_page(title: &str, error: &str) -> String {
    let error = tera::escape_html(error);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
        }}
        h1 {{ color: #e74c3c; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>{error}</p>
</body>
</html>"#
    )
}
