use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, seo, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page data
        .route("/api/pages/home", get(handlers::home_page))
        .route("/api/pages/blog", get(handlers::blog_page))
        .route("/api/pages/blog/:slug", get(handlers::article_page))
        .route("/api/pages/author/:slug", get(handlers::author_page))
        // Crawlers
        .route("/blog/:slug", get(seo::seo_article_page))
        .route("/sitemap.xml", get(seo::sitemap_xml))
        .route("/robots.txt", get(seo::robots_txt))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
