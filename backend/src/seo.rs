use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use bugninja_shared::{
    media::{ExecutionContext, MediaUrlResolver},
    Article, Author,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::{SiteConfig, STATIC_ROUTES},
    handlers::load_article_page,
    markdown::{strip_markdown, truncate_text},
    models::{author_picture, ArticlePage},
    state::AppState,
};

const DESCRIPTION_CHARS: usize = 160;

/// Head metadata for one page.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetaTags {
    pub title: String,
    pub description: String,
    pub keywords: Option<String>,
    pub robots: String,
    pub canonical: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub structured_data: Option<Value>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OpenGraph {
    pub og_type: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// HTML escaping
// ---------------------------------------------------------------------------

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn html_attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Metadata synthesis
// ---------------------------------------------------------------------------

/// Best description of an article: SEO description, else summary, else body.
fn article_description(article: &Article) -> String {
    if let Some(description) = article
        .seo
        .as_ref()
        .and_then(|seo| seo.meta_description.as_deref())
    {
        return description.to_string();
    }
    let source = if article.summary.trim().is_empty() {
        &article.content
    } else {
        &article.summary
    };
    truncate_text(&strip_markdown(source), DESCRIPTION_CHARS)
}

fn article_json_ld(
    article: &Article,
    site: &SiteConfig,
    canonical: &str,
    description: &str,
    image: Option<&str>,
) -> Value {
    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": article.title,
        "description": description,
        "mainEntityOfPage": { "@type": "WebPage", "@id": canonical },
        "publisher": { "@type": "Organization", "name": site.name },
    });
    if let Some(author) = &article.author {
        ld["author"] = json!({ "@type": "Person", "name": author.name });
    }
    if let Some(published) = article.effective_date() {
        ld["datePublished"] = json!(published.to_rfc3339());
    }
    if let Some(modified) = article.update_date.or(article.updated_at) {
        ld["dateModified"] = json!(modified.to_rfc3339());
    }
    if let Some(image) = image {
        ld["image"] = json!(image);
    }
    if !article.tags.is_empty() {
        let keywords: Vec<&str> = article.tags.iter().map(|tag| tag.name.as_str()).collect();
        ld["keywords"] = json!(keywords);
    }
    ld
}

/// Metadata of an article detail page. Values authored in the CMS SEO block
/// win; everything missing is derived from the article itself.
pub fn article_meta(article: &Article, site: &SiteConfig, media: &MediaUrlResolver) -> MetaTags {
    let seo = article.seo.clone().unwrap_or_default();
    let title = seo
        .meta_title
        .clone()
        .unwrap_or_else(|| format!("{} | {}", article.title, site.name));
    let description = article_description(article);
    let canonical = seo
        .canonical_url
        .clone()
        .unwrap_or_else(|| site.article_url(&article.slug));
    let keywords = seo.keywords.clone().or_else(|| {
        (!article.tags.is_empty()).then(|| {
            article
                .tags
                .iter()
                .map(|tag| tag.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
    });
    let robots = if seo.prevent_indexing {
        "noindex, nofollow".to_string()
    } else {
        seo.meta_robots
            .clone()
            .unwrap_or_else(|| "index, follow".to_string())
    };

    let structured_image = seo
        .structured_data
        .as_ref()
        .and_then(|data| data.get("image"))
        .and_then(Value::as_str)
        .filter(|image| !image.is_empty())
        .map(|image| media.resolve(image, ExecutionContext::Browser));
    let image = structured_image.or_else(|| {
        article
            .featured_image
            .as_ref()
            .map(|image| media.resolve(&image.url, ExecutionContext::Browser))
    });
    let structured_data = seo.structured_data.clone().or_else(|| {
        Some(article_json_ld(article, site, &canonical, &description, image.as_deref()))
    });
    let images: Vec<String> = image.into_iter().collect();

    MetaTags {
        open_graph: OpenGraph {
            og_type: "article".to_string(),
            title: title.clone(),
            description: description.clone(),
            url: canonical.clone(),
            images: images.clone(),
        },
        twitter: TwitterCard {
            card: "summary_large_image".to_string(),
            title: title.clone(),
            description: description.clone(),
            images,
        },
        title,
        description,
        keywords,
        robots,
        canonical,
        structured_data,
    }
}

/// Metadata of an author profile page with a schema.org `Person`.
pub fn author_meta(author: &Author, site: &SiteConfig, media: &MediaUrlResolver) -> MetaTags {
    let role = author.role.as_deref().unwrap_or("Author");
    let canonical = site.author_url(&author.slug);
    let picture = author_picture(author, media);
    let description = author
        .bio
        .as_deref()
        .map(|bio| bio.chars().take(DESCRIPTION_CHARS).collect::<String>())
        .filter(|bio| !bio.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Articles and insights from {}, {} at {}.",
                author.name, role, site.name
            )
        });
    let same_as: Vec<&str> = author
        .social_links
        .iter()
        .map(|link| link.url.as_str())
        .collect();
    let person = json!({
        "@context": "https://schema.org",
        "@type": "Person",
        "name": author.name,
        "jobTitle": author.role,
        "description": author.bio,
        "image": picture,
        "url": canonical,
        "sameAs": same_as,
    });
    let short_title = format!("{} - {}", author.name, role);

    MetaTags {
        title: format!("{} | {}", short_title, site.name),
        keywords: author.expertise.clone(),
        robots: "index, follow".to_string(),
        open_graph: OpenGraph {
            og_type: "profile".to_string(),
            title: short_title.clone(),
            description: description.clone(),
            url: canonical.clone(),
            images: vec![picture.clone()],
        },
        twitter: TwitterCard {
            card: "summary".to_string(),
            title: short_title,
            description: description.clone(),
            images: vec![picture],
        },
        description,
        canonical,
        structured_data: Some(person),
    }
}

// ---------------------------------------------------------------------------
// HTML rendering
// ---------------------------------------------------------------------------

fn render_head(meta: &MetaTags) -> String {
    let mut head = format!(
        r#"<meta charset="utf-8" />
<title>{title}</title>
<meta name="description" content="{description}" />
<meta name="robots" content="{robots}" />
<link rel="canonical" href="{canonical}" />
<meta property="og:type" content="{og_type}" />
<meta property="og:title" content="{og_title}" />
<meta property="og:description" content="{description}" />
<meta property="og:url" content="{canonical}" />
<meta name="twitter:card" content="{twitter_card}" />
<meta name="twitter:title" content="{og_title}" />
<meta name="twitter:description" content="{description}" />
"#,
        title = html_escape(&meta.title),
        description = html_attr_escape(&meta.description),
        robots = html_attr_escape(&meta.robots),
        canonical = html_attr_escape(&meta.canonical),
        og_type = html_attr_escape(&meta.open_graph.og_type),
        og_title = html_attr_escape(&meta.open_graph.title),
        twitter_card = html_attr_escape(&meta.twitter.card),
    );
    if let Some(keywords) = &meta.keywords {
        head.push_str(&format!(
            "<meta name=\"keywords\" content=\"{}\" />\n",
            html_attr_escape(keywords)
        ));
    }
    for image in &meta.open_graph.images {
        head.push_str(&format!(
            "<meta property=\"og:image\" content=\"{0}\" />\n<meta name=\"twitter:image\" \
             content=\"{0}\" />\n",
            html_attr_escape(image)
        ));
    }
    if let Some(data) = &meta.structured_data {
        // `</` must not terminate the script element early.
        let json = data.to_string().replace("</", "<\\/");
        head.push_str(&format!("<script type=\"application/ld+json\">{json}</script>\n"));
    }
    head
}

/// Minimal crawlable document for an article: full head metadata plus the
/// rendered body.
pub fn render_article_document(page: &ArticlePage) -> String {
    let article = &page.article;
    let byline = article
        .author
        .as_ref()
        .map(|author| format!(" · By {}", html_escape(&author.name)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
{head}</head>
<body>
<article>
<h1>{title}</h1>
<p><time>{published}</time> · {minutes} min read{byline}</p>
<p>{summary}</p>
{content}
</article>
</body>
</html>"#,
        head = render_head(&page.meta),
        title = html_escape(&article.title),
        published = html_escape(&article.published),
        minutes = article.reading_time,
        byline = byline,
        summary = html_escape(&article.summary),
        content = page.content_html,
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /blog/:slug
pub async fn seo_article_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    match load_article_page(&state, &slug).await {
        Some(page) => Html(render_article_document(&page)).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    let slugs = match state.cms.list_article_slugs().await {
        Ok(slugs) => slugs,
        Err(err) => {
            tracing::warn!("sitemap: failed to list article slugs: {}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate sitemap")
                .into_response();
        },
    };

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );
    for route in STATIC_ROUTES {
        let priority = if *route == "/" { "1.0" } else { "0.5" };
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <changefreq>weekly</changefreq>\n    \
             <priority>{}</priority>\n  </url>\n",
            html_escape(&state.site.url(route)),
            priority
        ));
    }
    for slug in &slugs {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <changefreq>weekly</changefreq>\n    \
             <priority>0.8</priority>\n  </url>\n",
            html_escape(&state.site.article_url(slug)),
        ));
    }
    xml.push_str("</urlset>\n");

    (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
        .into_response()
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    let body = format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        state.site.url("sitemap.xml")
    );
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

#[cfg(test)]
mod tests {
    use bugninja_shared::{
        dates::parse_timestamp, MediaAsset, Seo, SocialLink, Tag,
    };

    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    fn media() -> MediaUrlResolver {
        MediaUrlResolver::new("https://cms.bugninja.ai", "http://strapi:1337")
    }

    fn article() -> Article {
        Article {
            id: 1,
            title: "Bug <triage>".to_string(),
            slug: "bug-triage".to_string(),
            summary: "How we **triage** bugs.".to_string(),
            content: "Body".to_string(),
            reading_time: 4,
            publish_date: parse_timestamp("2024-03-15"),
            update_date: None,
            created_at: None,
            updated_at: None,
            featured: false,
            featured_image: Some(MediaAsset {
                id: Some(2),
                url: "/uploads/triage.png".to_string(),
                alternative_text: None,
                width: None,
                height: None,
                formats: Default::default(),
            }),
            author: None,
            categories: vec![],
            tags: vec![Tag {
                id: 1,
                name: "QA".to_string(),
                slug: "qa".to_string(),
                color: None,
            }],
            references: vec![],
            cta: vec![],
            seo: None,
        }
    }

    #[test]
    fn article_meta_derives_missing_fields() {
        let meta = article_meta(&article(), &site(), &media());

        assert_eq!(meta.title, "Bug <triage> | Bugninja");
        assert_eq!(meta.description, "How we triage bugs.");
        assert_eq!(meta.canonical, "https://bugninja.ai/blog/bug-triage");
        assert_eq!(meta.keywords.as_deref(), Some("QA"));
        assert_eq!(meta.robots, "index, follow");
        assert_eq!(meta.open_graph.images, ["https://cms.bugninja.ai/uploads/triage.png"]);
        let ld = meta.structured_data.expect("generated json-ld");
        assert_eq!(ld["@type"], "Article");
        assert_eq!(ld["datePublished"], "2024-03-15T00:00:00+00:00");
    }

    #[test]
    fn authored_seo_block_wins() {
        let mut article = article();
        article.seo = Some(Seo {
            meta_title: Some("Custom title".to_string()),
            meta_description: Some("Custom description".to_string()),
            keywords: Some("bugs, ai".to_string()),
            meta_robots: Some("index, nofollow".to_string()),
            canonical_url: Some("https://bugninja.ai/custom".to_string()),
            prevent_indexing: false,
            structured_data: Some(json!({ "@type": "BlogPosting", "image": "https://cdn.example.com/og.png" })),
        });

        let meta = article_meta(&article, &site(), &media());

        assert_eq!(meta.title, "Custom title");
        assert_eq!(meta.description, "Custom description");
        assert_eq!(meta.robots, "index, nofollow");
        assert_eq!(meta.canonical, "https://bugninja.ai/custom");
        assert_eq!(meta.open_graph.images, ["https://cdn.example.com/og.png"]);
        assert_eq!(meta.structured_data.expect("authored")["@type"], "BlogPosting");
    }

    #[test]
    fn prevent_indexing_overrides_robots() {
        let mut article = article();
        article.seo = Some(Seo {
            meta_robots: Some("index, follow".to_string()),
            prevent_indexing: true,
            ..Seo::default()
        });

        assert_eq!(article_meta(&article, &site(), &media()).robots, "noindex, nofollow");
    }

    #[test]
    fn author_meta_builds_person_schema() {
        let author = Author {
            id: 3,
            name: "Jane Doe".to_string(),
            slug: "jane-doe".to_string(),
            email: None,
            bio: None,
            role: None,
            expertise: None,
            profile_picture: None,
            social_links: vec![SocialLink {
                id: 1,
                platform: "github".to_string(),
                url: "https://github.com/jane".to_string(),
            }],
        };

        let meta = author_meta(&author, &site(), &media());

        assert_eq!(meta.title, "Jane Doe - Author | Bugninja");
        assert_eq!(meta.description, "Articles and insights from Jane Doe, Author at Bugninja.");
        assert_eq!(meta.canonical, "https://bugninja.ai/author/jane-doe");
        assert_eq!(meta.open_graph.images, ["/blog/default-author.jpg"]);
        let person = meta.structured_data.expect("person");
        assert_eq!(person["@type"], "Person");
        assert_eq!(person["sameAs"][0], "https://github.com/jane");
    }

    #[test]
    fn head_escapes_values_and_script_terminators() {
        let mut meta = article_meta(&article(), &site(), &media());
        meta.structured_data = Some(json!({ "headline": "</script><b>" }));

        let head = render_head(&meta);

        assert!(head.contains("<title>Bug &lt;triage&gt; | Bugninja</title>"));
        assert!(head.contains(r#"<\/script><b>"#));
        assert!(!head.contains("</script><b>"));
    }
}
