// ABOUTME: Server bootstrap and command implementations for the tagging CLI
// ABOUTME: Builds the HTTP app with CORS and list views from environment configuration

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use tagging_api::{DbState, TaggedObjectList};

pub mod commands;
pub mod config;

pub use config::{Config, ConfigError};

/// One list view per configured content type, mounted at `/tagged/{content_type}`
pub fn list_views(config: &Config) -> Vec<(String, TaggedObjectList)> {
    config
        .list_models
        .iter()
        .map(|model| {
            let mut view = TaggedObjectList::for_model(model.clone()).with_related_tags(true);
            if let Some(page_size) = config.paginate_by {
                view = view.paginate_by(page_size);
            }
            (model.clone(), view)
        })
        .collect()
}

pub fn build_app(state: DbState, config: &Config) -> anyhow::Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(tagging_api::create_router(state, list_views(config)).layer(cors))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = DbState::init_with_path(config.database_path.clone(), config.settings.clone())
        .await
        .context("Failed to open tag storage")?;

    let app = build_app(state, &config)?;
    let addr = config.addr();

    info!("Tagging server listening on http://{}", addr);
    info!("CORS origin: {}", config.cors_origin);
    for model in &config.list_models {
        info!("Serving tagged {} at /tagged/{}/{{tag}}", model, model);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
