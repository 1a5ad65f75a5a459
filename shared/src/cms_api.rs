//! Read-only client for the CMS REST API.
//!
//! Every call is a single stateless GET: no retry, no timeout beyond the
//! runtime's, no caching. Slug lookups verify that the record they return
//! carries exactly the requested slug.

use std::{borrow::Cow, env, str::FromStr};

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::{
    error::{CmsError, CmsResult},
    media::MediaUrlResolver,
    ordering::{filter_by_author, sort_most_recent},
    strapi::{
        normalize_article, normalize_author, normalize_category, normalize_pagination,
        normalize_tag, ArticleAttributes, AuthorAttributes, ListResponse, SingleResponse,
        SlugAttributes, TaxonomyAttributes,
    },
    Article, ArticlePage, Author, Category, Tag,
};

/// Origin used when neither CMS URL variable is set.
pub const DEFAULT_CMS_URL: &str = "http://localhost:1337";

/// `pagination[limit]` value meaning "no upper bound".
pub const UNBOUNDED: &str = "-1";

/// How slug lookups find the record id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlugLookup {
    /// Server-side `filters[slug][$eq]` query only.
    Filter,
    /// Fetch every id+slug pair and scan for an exact match.
    Scan,
    /// Filter first; scan only when the filtered response proves the CMS
    /// ignored the filter (non-empty, but no exact match).
    #[default]
    Auto,
}

impl FromStr for SlugLookup {
    type Err = CmsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "filter" => Ok(Self::Filter),
            "scan" => Ok(Self::Scan),
            "auto" | "" => Ok(Self::Auto),
            other => Err(CmsError::Config(format!(
                "unknown slug lookup `{other}` (expected filter, scan or auto)"
            ))),
        }
    }
}

/// Connection settings of [`CmsClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmsConfig {
    /// Origin used for API calls and server-side media.
    pub api_url: String,
    /// Browser-reachable origin used for media rendered into pages.
    pub public_url: String,
    /// Optional API token sent as a bearer credential.
    pub token: Option<String>,
    /// Slug lookup strategy.
    pub slug_lookup: SlugLookup,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CMS_URL.to_string(),
            public_url: DEFAULT_CMS_URL.to_string(),
            token: None,
            slug_lookup: SlugLookup::Auto,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl CmsConfig {
    /// Reads `STRAPI_INTERNAL_URL`, `NEXT_PUBLIC_STRAPI_URL`,
    /// `STRAPI_API_TOKEN` (or `NEXT_PUBLIC_STRAPI_API_TOKEN`) and
    /// `CMS_SLUG_LOOKUP`.
    pub fn from_env() -> CmsResult<Self> {
        let slug_lookup = match env_non_empty("CMS_SLUG_LOOKUP") {
            Some(value) => value.parse()?,
            None => SlugLookup::default(),
        };
        Ok(Self {
            api_url: env_non_empty("STRAPI_INTERNAL_URL")
                .unwrap_or_else(|| DEFAULT_CMS_URL.to_string()),
            public_url: env_non_empty("NEXT_PUBLIC_STRAPI_URL")
                .unwrap_or_else(|| DEFAULT_CMS_URL.to_string()),
            token: env_non_empty("STRAPI_API_TOKEN")
                .or_else(|| env_non_empty("NEXT_PUBLIC_STRAPI_API_TOKEN")),
            slug_lookup,
        })
    }

    /// Media resolver pairing the public and internal origins.
    pub fn media_resolver(&self) -> MediaUrlResolver {
        MediaUrlResolver::new(&self.public_url, &self.api_url)
    }
}

/// Query string in the bracketed form the CMS expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrapiQuery {
    pairs: Vec<(String, String)>,
}

impl StrapiQuery {
    /// Empty query.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// `populate=*`: embed every first-level relation.
    pub fn populate_all(self) -> Self {
        self.push("populate", "*")
    }

    /// `populate[i]=relation` for each listed relation.
    pub fn populate(mut self, relations: &[&str]) -> Self {
        for (index, relation) in relations.iter().enumerate() {
            self = self.push(format!("populate[{index}]"), *relation);
        }
        self
    }

    /// Adds `sort[i]=field:desc` after any existing sort keys.
    pub fn sort_desc(self, field: &str) -> Self {
        let index = self.count_prefix("sort[");
        self.push(format!("sort[{index}]"), format!("{field}:desc"))
    }

    /// Adds `sort[i]=field:asc` after any existing sort keys.
    pub fn sort_asc(self, field: &str) -> Self {
        let index = self.count_prefix("sort[");
        self.push(format!("sort[{index}]"), format!("{field}:asc"))
    }

    /// `fields[i]=field`: restrict returned attributes.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for (index, field) in fields.iter().enumerate() {
            self = self.push(format!("fields[{index}]"), *field);
        }
        self
    }

    /// `filters[a][b]...[$eq]=value`.
    pub fn filter_eq(self, path: &[&str], value: impl Into<String>) -> Self {
        let key: String = path.iter().map(|segment| format!("[{segment}]")).collect();
        self.push(format!("filters{key}[$eq]"), value)
    }

    /// `pagination[page]` and `pagination[pageSize]`.
    pub fn paginate(self, page: u32, page_size: u32) -> Self {
        self.push("pagination[page]", page.to_string())
            .push("pagination[pageSize]", page_size.to_string())
    }

    /// `pagination[pageSize]` alone, for "first N" queries.
    pub fn limit(self, page_size: u32) -> Self {
        self.push("pagination[pageSize]", page_size.to_string())
    }

    /// `pagination[limit]=-1`: the whole collection in one response.
    pub fn unbounded(self) -> Self {
        self.push("pagination[limit]", UNBOUNDED)
    }

    /// Key/value pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    fn count_prefix(&self, prefix: &str) -> usize {
        self.pairs
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .count()
    }
}

/// Percent-decodes a slug typed or pasted as raw URL text. Malformed escapes
/// are kept verbatim. Slugs from an HTTP path extractor are already decoded
/// and must not go through this again.
pub fn decode_slug(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

enum FilterOutcome {
    Match(u64),
    Empty,
    Unreliable,
}

/// Typed accessors over the CMS REST API.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    config: CmsConfig,
}

impl CmsClient {
    /// Builds a client; fails if the API origin is not a valid URL.
    pub fn new(config: CmsConfig) -> CmsResult<Self> {
        url::Url::parse(&config.api_url).map_err(|err| {
            CmsError::Config(format!("invalid CMS url `{}`: {err}", config.api_url))
        })?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(CmsError::Transport)?;
        Ok(Self {
            http,
            config,
        })
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    /// GET `{api_url}/api/{path}` and decode the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &StrapiQuery,
    ) -> CmsResult<T> {
        let url = format!(
            "{}/api/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut request = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .query(query.pairs());
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("GET {} ({} query params)", url, query.pairs().len());
        let response = request.send().await.map_err(CmsError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Fetch {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        let body = response.bytes().await.map_err(CmsError::Transport)?;
        serde_json::from_slice(&body).map_err(|source| CmsError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn fetch_articles(&self, query: &StrapiQuery) -> CmsResult<Vec<Article>> {
        let response: ListResponse<ArticleAttributes> = self.fetch_json("articles", query).await?;
        Ok(response.data.into_iter().map(normalize_article).collect())
    }

    /// One page of articles, newest first, with every relation populated.
    pub async fn list_articles(&self, page: u32, page_size: u32) -> CmsResult<ArticlePage> {
        let query = StrapiQuery::new()
            .populate_all()
            .sort_desc("publishDate")
            .paginate(page, page_size);
        let response: ListResponse<ArticleAttributes> =
            self.fetch_json("articles", &query).await?;
        let returned = response.data.len();
        let pagination =
            normalize_pagination(response.meta.pagination, page, page_size, returned);
        Ok(ArticlePage {
            articles: response.data.into_iter().map(normalize_article).collect(),
            pagination,
        })
    }

    /// Every article, most recent first (publish date, else creation date).
    ///
    /// The response grows with the collection; there is no chunking.
    pub async fn list_all_articles(&self) -> CmsResult<Vec<Article>> {
        let query = StrapiQuery::new()
            .populate_all()
            .sort_desc("publishDate")
            .unbounded();
        let mut articles = self.fetch_articles(&query).await?;
        sort_most_recent(&mut articles);
        Ok(articles)
    }

    /// Up to `limit` articles flagged as featured, newest first.
    pub async fn get_featured_articles(&self, limit: u32) -> CmsResult<Vec<Article>> {
        let query = StrapiQuery::new()
            .filter_eq(&["featured"], "true")
            .populate_all()
            .sort_desc("publishDate")
            .limit(limit);
        let mut articles = self.fetch_articles(&query).await?;
        articles.retain(|article| article.featured);
        sort_most_recent(&mut articles);
        Ok(articles)
    }

    /// Full article by id; `None` if the CMS has no such record.
    pub async fn get_article(&self, id: u64) -> CmsResult<Option<Article>> {
        let query = StrapiQuery::new().populate_all();
        match self
            .fetch_json::<SingleResponse<ArticleAttributes>>(&format!("articles/{id}"), &query)
            .await
        {
            Ok(response) => Ok(response.data.map(normalize_article)),
            Err(CmsError::Fetch {
                status: 404, ..
            }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Full article whose slug equals `slug` exactly. `slug` is taken as
    /// already decoded; see [`decode_slug`] for raw URL input.
    pub async fn get_article_by_slug(&self, slug: &str) -> CmsResult<Article> {
        let id = self.find_id_by_slug("articles", "Article", slug).await?;
        match self.get_article(id).await? {
            Some(article) if article.slug == slug => Ok(article),
            Some(article) => {
                tracing::warn!(
                    "article {} resolved for slug `{}` carries slug `{}`",
                    id,
                    slug,
                    article.slug
                );
                Err(CmsError::not_found("Article", slug))
            },
            None => Err(CmsError::not_found("Article", slug)),
        }
    }

    /// Full author by id; `None` if the CMS has no such record.
    pub async fn get_author(&self, id: u64) -> CmsResult<Option<Author>> {
        let query = StrapiQuery::new().populate_all();
        match self
            .fetch_json::<SingleResponse<AuthorAttributes>>(&format!("authors/{id}"), &query)
            .await
        {
            Ok(response) => Ok(response.data.map(normalize_author)),
            Err(CmsError::Fetch {
                status: 404, ..
            }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Full author whose slug equals `slug` exactly (already decoded).
    pub async fn get_author_by_slug(&self, slug: &str) -> CmsResult<Author> {
        let id = self.find_id_by_slug("authors", "Author", slug).await?;
        match self.get_author(id).await? {
            Some(author) if author.slug == slug => Ok(author),
            _ => Err(CmsError::not_found("Author", slug)),
        }
    }

    /// Articles written by the author with `slug`, newest first.
    ///
    /// Relational filtering on the CMS is only sent as a hint: the full
    /// response is always filtered here on the nested author slug, which
    /// costs a scan of the whole collection per call.
    pub async fn get_articles_by_author(&self, slug: &str) -> CmsResult<Vec<Article>> {
        let mut query = StrapiQuery::new()
            .populate(&["author", "categories", "tags", "featuredImage"])
            .sort_desc("publishDate")
            .unbounded();
        if self.config.slug_lookup != SlugLookup::Scan {
            query = query.filter_eq(&["author", "slug"], slug);
        }
        let articles = self.fetch_articles(&query).await?;
        let fetched = articles.len();
        let mut matched = filter_by_author(articles, slug);
        sort_most_recent(&mut matched);
        tracing::debug!("author `{}`: {} of {} articles match", slug, matched.len(), fetched);
        Ok(matched)
    }

    /// Every article slug, for sitemaps and static-path generation.
    pub async fn list_article_slugs(&self) -> CmsResult<Vec<String>> {
        let query = StrapiQuery::new().fields(&["slug"]).unbounded();
        let response: ListResponse<SlugAttributes> = self.fetch_json("articles", &query).await?;
        Ok(response
            .data
            .into_iter()
            .map(|entry| entry.into_parts().1.slug)
            .collect())
    }

    /// Every category, by name.
    pub async fn list_categories(&self) -> CmsResult<Vec<Category>> {
        let query = StrapiQuery::new().sort_asc("name").unbounded();
        let response: ListResponse<TaxonomyAttributes> =
            self.fetch_json("categories", &query).await?;
        Ok(response.data.into_iter().map(normalize_category).collect())
    }

    /// Every tag, by name.
    pub async fn list_tags(&self) -> CmsResult<Vec<Tag>> {
        let query = StrapiQuery::new().sort_asc("name").unbounded();
        let response: ListResponse<TaxonomyAttributes> = self.fetch_json("tags", &query).await?;
        Ok(response.data.into_iter().map(normalize_tag).collect())
    }

    async fn find_id_by_slug(
        &self,
        collection: &str,
        kind: &'static str,
        slug: &str,
    ) -> CmsResult<u64> {
        let found = match self.config.slug_lookup {
            SlugLookup::Scan => self.scan_for_slug(collection, slug).await?,
            SlugLookup::Filter => match self.filter_for_slug(collection, slug).await? {
                FilterOutcome::Match(id) => Some(id),
                FilterOutcome::Empty | FilterOutcome::Unreliable => None,
            },
            SlugLookup::Auto => match self.filter_for_slug(collection, slug).await? {
                FilterOutcome::Match(id) => Some(id),
                FilterOutcome::Empty => None,
                FilterOutcome::Unreliable => {
                    tracing::warn!(
                        "{} slug filter returned non-matching records for `{}`; falling back to \
                         a full scan",
                        collection,
                        slug
                    );
                    self.scan_for_slug(collection, slug).await?
                },
            },
        };
        found.ok_or_else(|| CmsError::not_found(kind, slug))
    }

    async fn filter_for_slug(&self, collection: &str, slug: &str) -> CmsResult<FilterOutcome> {
        let query = StrapiQuery::new()
            .filter_eq(&["slug"], slug)
            .fields(&["slug"]);
        let response: ListResponse<SlugAttributes> = self.fetch_json(collection, &query).await?;
        if response.data.is_empty() {
            return Ok(FilterOutcome::Empty);
        }
        Ok(response
            .data
            .iter()
            .find(|entry| entry.fields().slug == slug)
            .and_then(|entry| entry.id())
            .map_or(FilterOutcome::Unreliable, FilterOutcome::Match))
    }

    async fn scan_for_slug(&self, collection: &str, slug: &str) -> CmsResult<Option<u64>> {
        let query = StrapiQuery::new().fields(&["slug"]).unbounded();
        let response: ListResponse<SlugAttributes> = self.fetch_json(collection, &query).await?;
        Ok(response
            .data
            .iter()
            .find(|entry| entry.fields().slug == slug)
            .and_then(|entry| entry.id()))
    }
}
