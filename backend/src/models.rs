use bugninja_shared::{
    dates::{format_date, format_timestamp},
    media::{ExecutionContext, MediaUrlResolver},
    Article, Author, Category, Cta, ImageSize, Pagination, Tag,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::{DEFAULT_ARTICLE_IMAGE, DEFAULT_AUTHOR_IMAGE},
    seo::MetaTags,
};

/// Article as shown on cards and in the hero slot.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ArticleCard {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub image_url: String,
    pub image_alt: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub published: String,
    pub reading_time: u32,
    pub author: Option<AuthorSummary>,
    pub categories: Vec<Category>,
}

impl ArticleCard {
    pub fn new(article: &Article, media: &MediaUrlResolver) -> Self {
        let image = article.featured_image.as_ref();
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            summary: article.summary.clone(),
            image_url: media.resolve_or(
                image.map(|image| image.variant_url(ImageSize::Medium)),
                DEFAULT_ARTICLE_IMAGE,
                ExecutionContext::Browser,
            ),
            image_alt: image
                .and_then(|image| image.alternative_text.clone())
                .unwrap_or_else(|| article.title.clone()),
            publish_date: article.effective_date(),
            published: article
                .effective_date()
                .map(|date| format_timestamp(&date))
                .unwrap_or_default(),
            reading_time: article.reading_time,
            author: article
                .author
                .as_ref()
                .map(|author| AuthorSummary::new(author, media)),
            categories: article.categories.clone(),
        }
    }

    pub fn list(articles: &[Article], media: &MediaUrlResolver) -> Vec<Self> {
        articles.iter().map(|article| Self::new(article, media)).collect()
    }
}

/// Byline data.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuthorSummary {
    pub name: String,
    pub slug: String,
    pub role: Option<String>,
    pub picture_url: String,
}

impl AuthorSummary {
    pub fn new(author: &Author, media: &MediaUrlResolver) -> Self {
        Self {
            name: author.name.clone(),
            slug: author.slug.clone(),
            role: author.role.clone(),
            picture_url: author_picture(author, media),
        }
    }
}

pub fn author_picture(author: &Author, media: &MediaUrlResolver) -> String {
    media.resolve_or(
        author
            .profile_picture
            .as_ref()
            .map(|picture| picture.variant_url(ImageSize::Small)),
        DEFAULT_AUTHOR_IMAGE,
        ExecutionContext::Browser,
    )
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HomePage {
    pub recent: Vec<ArticleCard>,
    pub featured: Vec<ArticleCard>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BlogPage {
    pub hero: Option<ArticleCard>,
    pub grid: Vec<ArticleCard>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReferenceView {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub published: String,
    pub reference_type: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ArticlePage {
    pub article: ArticleCard,
    pub content_html: String,
    pub updated: String,
    pub tags: Vec<Tag>,
    pub references: Vec<ReferenceView>,
    pub cta: Vec<Cta>,
    pub meta: MetaTags,
}

impl ArticlePage {
    pub fn new(article: &Article, content_html: String, meta: MetaTags, media: &MediaUrlResolver) -> Self {
        Self {
            article: ArticleCard::new(article, media),
            content_html,
            updated: article
                .update_date
                .or(article.updated_at)
                .map(|date| format_timestamp(&date))
                .unwrap_or_default(),
            tags: article.tags.clone(),
            references: article
                .references
                .iter()
                .map(|reference| ReferenceView {
                    title: reference.title.clone(),
                    description: reference.description.clone(),
                    url: reference.url.clone(),
                    authors: reference.authors.clone(),
                    publisher: reference.publisher.clone(),
                    published: reference
                        .publish_date
                        .as_deref()
                        .map(format_date)
                        .unwrap_or_default(),
                    reference_type: reference.reference_type.clone(),
                })
                .collect(),
            cta: article.cta.clone(),
            meta,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SocialLinkView {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuthorProfile {
    pub name: String,
    pub first_name: String,
    pub slug: String,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub picture_url: String,
    pub social_links: Vec<SocialLinkView>,
}

impl AuthorProfile {
    pub fn new(author: &Author, media: &MediaUrlResolver) -> Self {
        Self {
            name: author.name.clone(),
            first_name: author.first_name().to_string(),
            slug: author.slug.clone(),
            role: author.role.clone(),
            bio: author.bio.clone(),
            expertise: author.expertise.clone(),
            picture_url: author_picture(author, media),
            social_links: author
                .social_links
                .iter()
                .map(|link| SocialLinkView {
                    platform: link.platform.to_lowercase(),
                    url: link.url.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AuthorPage {
    pub author: AuthorProfile,
    /// Empty when the author has not published anything yet.
    pub articles: Vec<ArticleCard>,
    pub meta: MetaTags,
}
