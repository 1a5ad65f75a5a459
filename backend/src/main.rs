//! HTTP server that turns Strapi content into page data for the Bugninja
//! marketing site, plus crawler-facing HTML, sitemap and robots files.

mod config;
mod handlers;
mod markdown;
mod models;
mod routes;
mod seo;
mod state;

use anyhow::{Context, Result};
use bugninja_shared::cms_api::CmsConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::SiteConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("bugninja_backend=info,bugninja_shared=info,tower_http=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cms_config = CmsConfig::from_env().context("invalid CMS configuration")?;
    let site = SiteConfig::from_env();

    tracing::info!("Starting Bugninja content server");
    tracing::info!("CMS API: {}", cms_config.api_url);
    tracing::info!("CMS media (browser): {}", cms_config.public_url);
    tracing::info!("Slug lookup: {:?}", cms_config.slug_lookup);
    tracing::info!("Site: {} ({})", site.name, site.base_url);

    let addr = site.listen_addr();
    let app_state = state::AppState::new(cms_config, site)?;
    let app = routes::create_router(app_state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
