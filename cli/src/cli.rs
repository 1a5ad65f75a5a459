use bugninja_shared::{cms_api::SlugLookup, media::ExecutionContext};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Origin a media URL is resolved against.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MediaContext {
    /// Public origin, as rendered into pages.
    Browser,
    /// Internal origin, as fetched by the server.
    Server,
}

impl From<MediaContext> for ExecutionContext {
    fn from(context: MediaContext) -> Self {
        match context {
            MediaContext::Browser => ExecutionContext::Browser,
            MediaContext::Server => ExecutionContext::Server,
        }
    }
}

/// Top-level arguments.
#[derive(Parser)]
#[command(name = "bn-cli", version, about = "Bugninja CMS content CLI")]
pub struct Cli {
    /// Connection overrides shared by every subcommand.
    #[command(flatten)]
    pub cms: CmsArgs,
    /// Read to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides. Unset values fall back to the same environment
/// variables the server reads.
#[derive(Debug, Default, Args)]
pub struct CmsArgs {
    /// CMS origin used for API calls (`STRAPI_INTERNAL_URL`).
    #[arg(long, global = true)]
    pub cms_url: Option<String>,
    /// Browser-facing CMS origin for media (`NEXT_PUBLIC_STRAPI_URL`).
    #[arg(long, global = true)]
    pub public_url: Option<String>,
    /// API token (`STRAPI_API_TOKEN`).
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Slug lookup strategy: filter, scan or auto (`CMS_SLUG_LOOKUP`).
    #[arg(long, global = true, value_parser = parse_slug_lookup)]
    pub slug_lookup: Option<SlugLookup>,
}

fn parse_slug_lookup(value: &str) -> Result<SlugLookup, String> {
    value.parse().map_err(|err: bugninja_shared::CmsError| err.to_string())
}

/// CMS reads and local helpers.
#[derive(Subcommand)]
pub enum Commands {
    /// One page of articles, newest first.
    ListArticles {
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Articles per page.
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Every article, most recent first.
    AllArticles,
    /// Full article by slug.
    Article {
        /// Article slug; percent-encoded input is decoded once.
        slug: String,
    },
    /// Articles flagged as featured.
    Featured {
        /// Maximum number of articles.
        #[arg(long, default_value_t = 3)]
        limit: u32,
    },
    /// Full author by slug.
    Author {
        /// Author slug; percent-encoded input is decoded once.
        slug: String,
    },
    /// Articles written by an author.
    AuthorArticles {
        /// Author slug; percent-encoded input is decoded once.
        slug: String,
    },
    /// Every category.
    Categories,
    /// Every tag.
    Tags,
    /// Resolve a media path against the configured CMS origins.
    MediaUrl {
        /// Relative or absolute media path.
        path: String,
        /// Which origin to resolve against.
        #[arg(long, value_enum, default_value = "browser")]
        context: MediaContext,
    },
    /// Format an ISO date as a long English date.
    FormatDate {
        /// ISO-8601 timestamp or `YYYY-MM-DD`.
        iso: String,
    },
}
