use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bugninja_shared::{
    ordering::{most_recent, sort_most_recent, split_with_hero, BlogIndex},
    Article, ArticlePage as CmsArticlePage, Pagination,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{BLOG_PAGE_SIZE, HOME_FEATURED_ARTICLES, HOME_RECENT_ARTICLES},
    markdown::render_markdown,
    models::{ArticleCard, ArticlePage, AuthorPage, AuthorProfile, BlogPage, HomePage},
    seo::{article_meta, author_meta},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn not_found(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
            code: 404,
        }),
    )
}

/// GET /api/pages/home
pub async fn home_page(State(state): State<AppState>) -> Json<HomePage> {
    let (all, featured) = tokio::join!(
        state.cms.list_all_articles(),
        state.cms.get_featured_articles(HOME_FEATURED_ARTICLES)
    );

    let recent = all
        .map(|articles| most_recent(articles, HOME_RECENT_ARTICLES))
        .unwrap_or_else(|err| {
            tracing::warn!("home: failed to load recent articles: {}", err);
            Vec::new()
        });
    let mut featured = featured.unwrap_or_else(|err| {
        tracing::warn!("home: failed to load featured articles: {}", err);
        Vec::new()
    });
    // An article already in the recent strip is not repeated below it.
    featured.retain(|article| !recent.iter().any(|shown| shown.id == article.id));

    Json(HomePage {
        recent: ArticleCard::list(&recent, &state.media),
        featured: ArticleCard::list(&featured, &state.media),
    })
}

/// GET /api/pages/blog
pub async fn blog_page(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> Json<BlogPage> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(BLOG_PAGE_SIZE).max(1);

    let (featured, listed) = tokio::join!(
        state.cms.get_featured_articles(1),
        state.cms.list_articles(page, page_size)
    );

    let flagged = match featured {
        Ok(articles) => articles.into_iter().next(),
        Err(err) => {
            tracing::warn!("blog: failed to load featured article: {}", err);
            None
        },
    };
    let listed = listed.unwrap_or_else(|err| {
        tracing::warn!("blog: failed to load page {}: {}", page, err);
        CmsArticlePage {
            articles: Vec::new(),
            pagination: Pagination {
                page,
                page_size,
                page_count: 0,
                total: 0,
            },
        }
    });

    let index = blog_index(page, flagged, listed.articles);
    Json(BlogPage {
        hero: index
            .hero
            .as_ref()
            .map(|hero| ArticleCard::new(hero, &state.media)),
        grid: ArticleCard::list(&index.grid, &state.media),
        pagination: listed.pagination,
    })
}

/// The hero slot only exists on the first page; the flagged hero is kept out
/// of every page's grid.
fn blog_index(
    page: u32,
    flagged: Option<Article>,
    articles: Vec<Article>,
) -> BlogIndex {
    if page <= 1 {
        return split_with_hero(flagged, articles);
    }
    match flagged {
        Some(hero) => BlogIndex {
            hero: None,
            ..split_with_hero(Some(hero), articles)
        },
        None => {
            let mut grid = articles;
            sort_most_recent(&mut grid);
            BlogIndex {
                hero: None,
                grid,
            }
        },
    }
}

/// Loads and renders an article; `None` for unknown slugs and CMS failures.
pub async fn load_article_page(state: &AppState, slug: &str) -> Option<ArticlePage> {
    let article = match state.cms.get_article_by_slug(slug).await {
        Ok(article) => article,
        Err(err) if err.is_not_found() => {
            tracing::debug!("article {:?} not found", slug);
            return None;
        },
        Err(err) => {
            tracing::warn!("article {:?}: failed to load: {}", slug, err);
            return None;
        },
    };

    let content_html = render_markdown(&article.content, &state.media);
    let meta = article_meta(&article, &state.site, &state.media);
    Some(ArticlePage::new(&article, content_html, meta, &state.media))
}

/// GET /api/pages/blog/:slug
pub async fn article_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ArticlePage> {
    load_article_page(&state, &slug)
        .await
        .map(Json)
        .ok_or_else(|| not_found("Article not found"))
}

/// GET /api/pages/author/:slug
pub async fn author_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<AuthorPage> {
    let (author, articles) = tokio::join!(
        state.cms.get_author_by_slug(&slug),
        state.cms.get_articles_by_author(&slug)
    );

    let author = author.map_err(|err| {
        if !err.is_not_found() {
            tracing::warn!("author {:?}: failed to load: {}", slug, err);
        }
        not_found("Author not found")
    })?;
    let articles = articles.unwrap_or_else(|err| {
        tracing::warn!("author {:?}: failed to load articles: {}", slug, err);
        Vec::new()
    });

    Ok(Json(AuthorPage {
        author: AuthorProfile::new(&author, &state.media),
        articles: ArticleCard::list(&articles, &state.media),
        meta: author_meta(&author, &state.site, &state.media),
    }))
}
