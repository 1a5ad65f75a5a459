use std::env;

/// Cover shown when an article has no featured image.
pub const DEFAULT_ARTICLE_IMAGE: &str = "/blog/featured-article.jpg";

/// Avatar shown when an author has no profile picture.
pub const DEFAULT_AUTHOR_IMAGE: &str = "/blog/default-author.jpg";

/// Articles shown in the homepage "most recent" strip.
pub const HOME_RECENT_ARTICLES: usize = 3;

/// Featured articles fetched for the homepage.
pub const HOME_FEATURED_ARTICLES: u32 = 3;

/// Default blog index page size.
pub const BLOG_PAGE_SIZE: u32 = 10;

/// Marketing routes that exist regardless of CMS content.
pub const STATIC_ROUTES: &[&str] = &["/", "/blog", "/book-meeting", "/privacy-policy", "/terms"];

/// Site-level settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub name: String,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bugninja.ai".to_string(),
            name: "Bugninja".to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("SITE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            name: env::var("SITE_NAME").unwrap_or(defaults.name),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Absolute URL of a site path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn article_url(&self, slug: &str) -> String {
        self.url(&format!("blog/{}", urlencoding::encode(slug)))
    }

    pub fn author_url(&self, slug: &str) -> String {
        self.url(&format!("author/{}", urlencoding::encode(slug)))
    }
}
