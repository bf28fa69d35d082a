//! blogfront - server-rendered front pages for a small blog

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogfront::{
    admin::AdminSite,
    api::{self, AppState},
    config::Config,
    db,
    services::{BlogService, MediaStorage},
    theme::ThemeEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogfront=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blogfront...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    #[cfg(feature = "demo")]
    {
        if blogfront::services::demo::seed(&pool).await? {
            tracing::info!("Demo mode: demo content created");
        }
    }

    let media = MediaStorage::from_config(&config.media);
    let blog_service = Arc::new(BlogService::from_pool(pool.clone(), media.clone()));

    // Initialize theme engine
    let theme_engine = ThemeEngine::new(&config.theme.path)?;
    tracing::info!(
        "Theme engine initialized: {} templates (overrides from {:?})",
        theme_engine.template_names().len(),
        config.theme.path
    );

    let admin_site = AdminSite::blog();
    for model in admin_site.models() {
        tracing::info!(
            "Admin model registered: {} (raw id fields: {:?})",
            model.model,
            model.raw_id_fields
        );
    }

    let state = AppState {
        blog_service,
        theme_engine: Arc::new(theme_engine),
        site: Arc::new(config.site.clone()),
        admin_site: Arc::new(admin_site),
    };

    // Build router
    let app = api::build_router(state, &media);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
