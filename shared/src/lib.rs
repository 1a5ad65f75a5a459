//! Content model and CMS access shared by the Bugninja backend and CLI.
//!
//! The records here are request-scoped read projections of what the headless
//! CMS owns. [`cms_api::CmsClient`] fetches and normalizes them,
//! [`media::MediaUrlResolver`] turns their relative media paths into absolute
//! URLs, and [`ordering`] holds the "most recent first" selection rules the
//! pages rely on.

pub mod cms_api;
pub mod dates;
pub mod error;
pub mod media;
pub mod ordering;
pub mod strapi;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::{CmsError, CmsResult};

/// Full article record as rendered by the blog detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// CMS identifier.
    pub id: u64,
    /// Headline.
    pub title: String,
    /// Unique, URL-safe lookup key of the detail page.
    pub slug: String,
    /// Short lead shown on cards.
    pub summary: String,
    /// Markdown (or pre-rendered HTML) body.
    pub content: String,
    /// Estimated reading time in minutes.
    pub reading_time: u32,
    /// Editorial publish date.
    pub publish_date: Option<DateTime<Utc>>,
    /// Editorial update date.
    pub update_date: Option<DateTime<Utc>>,
    /// CMS creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// CMS modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether editors flagged the article for hero placement.
    pub featured: bool,
    /// Cover image.
    pub featured_image: Option<MediaAsset>,
    /// Zero or one author.
    pub author: Option<Author>,
    /// Categories the article belongs to.
    pub categories: Vec<Category>,
    /// Tags attached to the article.
    pub tags: Vec<Tag>,
    /// Citations rendered under the body.
    pub references: Vec<Reference>,
    /// Call-to-action buttons rendered under the body.
    pub cta: Vec<Cta>,
    /// SEO metadata block.
    pub seo: Option<Seo>,
}

impl Article {
    /// Date used for "most recent" ordering: publish date, else creation.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.publish_date.or(self.created_at)
    }

    /// Slug of the nested author, if the relation was populated.
    pub fn author_slug(&self) -> Option<&str> {
        self.author.as_ref().map(|author| author.slug.as_str())
    }
}

/// Author profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// CMS identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Unique, URL-safe lookup key of the author page.
    pub slug: String,
    /// Contact address, rarely populated.
    pub email: Option<String>,
    /// Biography (may contain HTML).
    pub bio: Option<String>,
    /// Job title.
    pub role: Option<String>,
    /// Free-form expertise blurb.
    pub expertise: Option<String>,
    /// Avatar.
    pub profile_picture: Option<MediaAsset>,
    /// Links to external profiles.
    pub social_links: Vec<SocialLink>,
}

impl Author {
    /// Looks up a social profile by platform name, ignoring case.
    pub fn social_link(&self, platform: &str) -> Option<&str> {
        self.social_links
            .iter()
            .find(|link| link.platform.eq_ignore_ascii_case(platform))
            .map(|link| link.url.as_str())
    }

    /// First word of the display name, used in "Connect with ..." headings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// One external profile of an author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Component identifier.
    pub id: u64,
    /// Platform name such as `linkedin` or `github`.
    pub platform: String,
    /// Profile URL.
    pub url: String,
}

/// Article category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// CMS identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL-safe key.
    pub slug: String,
}

/// Article tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// CMS identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL-safe key.
    pub slug: String,
    /// Optional badge color.
    pub color: Option<String>,
}

/// Uploaded image with its resized variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Upload identifier, absent when the CMS returned a bare `{ url }`.
    pub id: Option<u64>,
    /// Path relative to the CMS origin, or an absolute URL.
    pub url: String,
    /// Alt text.
    pub alternative_text: Option<String>,
    /// Original width in pixels.
    pub width: Option<u32>,
    /// Original height in pixels.
    pub height: Option<u32>,
    /// Resized variants.
    pub formats: ImageFormats,
}

/// Named image variant sizes, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    /// 156px bounding box.
    Thumbnail,
    /// 500px.
    Small,
    /// 750px.
    Medium,
    /// 1000px.
    Large,
}

/// Resized variants generated by the CMS upload plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFormats {
    /// Thumbnail variant.
    pub thumbnail: Option<ImageVariant>,
    /// Small variant.
    pub small: Option<ImageVariant>,
    /// Medium variant.
    pub medium: Option<ImageVariant>,
    /// Large variant.
    pub large: Option<ImageVariant>,
}

impl ImageFormats {
    /// Variant of exactly the given size.
    pub fn get(&self, size: ImageSize) -> Option<&ImageVariant> {
        match size {
            ImageSize::Thumbnail => self.thumbnail.as_ref(),
            ImageSize::Small => self.small.as_ref(),
            ImageSize::Medium => self.medium.as_ref(),
            ImageSize::Large => self.large.as_ref(),
        }
    }
}

/// One resized image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Path relative to the CMS origin.
    pub url: String,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
}

impl MediaAsset {
    /// URL of the requested variant, else the next larger one, else the
    /// original upload.
    pub fn variant_url(&self, size: ImageSize) -> &str {
        [
            ImageSize::Thumbnail,
            ImageSize::Small,
            ImageSize::Medium,
            ImageSize::Large,
        ]
        .into_iter()
        .filter(|candidate| *candidate >= size)
        .find_map(|candidate| self.formats.get(candidate))
        .map(|variant| variant.url.as_str())
        .unwrap_or(&self.url)
    }
}

/// Citation embedded in an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Component identifier.
    pub id: u64,
    /// Cited work title.
    pub title: String,
    /// Short description.
    pub description: Option<String>,
    /// Link to the cited work.
    pub url: Option<String>,
    /// Authors of the cited work.
    pub authors: Option<String>,
    /// Publisher of the cited work.
    pub publisher: Option<String>,
    /// Publication date as given by the CMS.
    pub publish_date: Option<String>,
    /// Kind of source (paper, article, ...).
    pub reference_type: Option<String>,
}

/// Call-to-action button embedded in an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cta {
    /// Component identifier.
    pub id: u64,
    /// Button label.
    pub text: String,
    /// Target URL.
    pub url: String,
    /// Visual variant (`primary`, `secondary`, ...).
    pub cta_type: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Open the target in a new tab.
    pub new_tab: bool,
}

/// SEO metadata authored alongside an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    /// `<title>` override.
    pub meta_title: Option<String>,
    /// Meta description.
    pub meta_description: Option<String>,
    /// Comma-separated keywords.
    pub keywords: Option<String>,
    /// Robots directive, e.g. `index, follow`.
    pub meta_robots: Option<String>,
    /// Canonical URL.
    pub canonical_url: Option<String>,
    /// Ask crawlers not to index the page.
    pub prevent_indexing: bool,
    /// schema.org JSON-LD object.
    pub structured_data: Option<Value>,
}

/// Pagination metadata returned with list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Number of pages.
    pub page_count: u32,
    /// Total number of records.
    pub total: u32,
}

/// One page of articles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticlePage {
    /// Articles on this page.
    pub articles: Vec<Article>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Words per minute used when the CMS did not store a reading time.
pub const WORDS_PER_MINUTE: usize = 200;

/// Reading-time estimate in minutes; never zero.
pub fn estimate_reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    u32::try_from(words / WORDS_PER_MINUTE + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(formats: ImageFormats) -> MediaAsset {
        MediaAsset {
            id: Some(1),
            url: "/uploads/original.png".to_string(),
            alternative_text: None,
            width: Some(2000),
            height: Some(1000),
            formats,
        }
    }

    fn variant(url: &str) -> Option<ImageVariant> {
        Some(ImageVariant {
            url: url.to_string(),
            width: None,
            height: None,
        })
    }

    #[test]
    fn variant_url_prefers_requested_then_larger_then_original() {
        let media = asset(ImageFormats {
            thumbnail: variant("/uploads/thumb.png"),
            small: None,
            medium: variant("/uploads/medium.png"),
            large: None,
        });

        assert_eq!(media.variant_url(ImageSize::Thumbnail), "/uploads/thumb.png");
        assert_eq!(media.variant_url(ImageSize::Small), "/uploads/medium.png");
        assert_eq!(media.variant_url(ImageSize::Large), "/uploads/original.png");
    }

    #[test]
    fn reading_time_is_at_least_one_minute() {
        assert_eq!(estimate_reading_time(""), 1);
        assert_eq!(estimate_reading_time(&"word ".repeat(199)), 1);
        assert_eq!(estimate_reading_time(&"word ".repeat(450)), 3);
    }

    #[test]
    fn social_link_lookup_ignores_case() {
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
                platform: "LinkedIn".to_string(),
                url: "https://linkedin.com/in/jane".to_string(),
            }],
        };

        assert_eq!(author.social_link("linkedin"), Some("https://linkedin.com/in/jane"));
        assert_eq!(author.social_link("github"), None);
        assert_eq!(author.first_name(), "Jane");
    }
}
