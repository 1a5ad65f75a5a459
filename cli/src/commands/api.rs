use anyhow::{bail, Result};
use bugninja_shared::{
    cms_api::{decode_slug, CmsClient},
    dates::{format_timestamp, parse_timestamp},
    media::ExecutionContext,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::Commands;

#[derive(Serialize)]
struct MediaUrlResult {
    path: String,
    context: ExecutionContext,
    url: String,
}

/// Runs one read against the CMS and returns what should be printed.
pub async fn execute(client: &CmsClient, command: Commands) -> Result<Value> {
    let value = match command {
        Commands::ListArticles {
            page,
            page_size,
        } => serde_json::to_value(client.list_articles(page, page_size).await?)?,
        Commands::AllArticles => {
            let articles = client.list_all_articles().await?;
            json!({ "total": articles.len(), "articles": articles })
        },
        Commands::Article {
            slug,
        } => serde_json::to_value(client.get_article_by_slug(&decode_slug(&slug)).await?)?,
        Commands::Featured {
            limit,
        } => {
            let articles = client.get_featured_articles(limit).await?;
            json!({ "total": articles.len(), "articles": articles })
        },
        Commands::Author {
            slug,
        } => serde_json::to_value(client.get_author_by_slug(&decode_slug(&slug)).await?)?,
        Commands::AuthorArticles {
            slug,
        } => {
            let slug = decode_slug(&slug);
            let articles = client.get_articles_by_author(&slug).await?;
            json!({ "author": slug, "total": articles.len(), "articles": articles })
        },
        Commands::Categories => json!({ "categories": client.list_categories().await? }),
        Commands::Tags => json!({ "tags": client.list_tags().await? }),
        Commands::MediaUrl {
            path,
            context,
        } => {
            let context = ExecutionContext::from(context);
            let url = client
                .config()
                .media_resolver()
                .resolve(&path, context);
            serde_json::to_value(MediaUrlResult {
                path,
                context,
                url,
            })?
        },
        Commands::FormatDate {
            iso,
        } => match parse_timestamp(&iso) {
            Some(timestamp) => json!({ "input": iso, "formatted": format_timestamp(&timestamp) }),
            None => bail!("unrecognized date: {iso}"),
        },
    };
    Ok(value)
}
