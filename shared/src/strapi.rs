//! Wire shapes of the Strapi REST API and their normalization into the
//! typed records of this crate.
//!
//! The same relation comes back in different shapes depending on the CMS
//! version and on which (custom) controller served it: entries may be
//! wrapped as `{ id, attributes }` or flat, single relations may sit in a
//! `{ data }` envelope or not, and ids may be numbers or numeric strings.
//! Everything here accepts all of those and never fails on an absent nested
//! relation.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    dates::parse_timestamp, estimate_reading_time, Article, Author, Category, Cta, ImageFormats,
    ImageVariant, MediaAsset, Pagination, Reference, Seo, SocialLink, Tag,
};

/// Record id, accepted as a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawId(pub u64);

impl<'de> Deserialize<'de> for RawId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(id) => Ok(RawId(id)),
            Repr::Text(text) => text
                .trim()
                .parse()
                .map(RawId)
                .map_err(|_| de::Error::custom(format!("invalid record id `{text}`"))),
        }
    }
}

/// One collection entry, wrapped or flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawEntry<T> {
    /// `{ "id": 1, "attributes": { ... } }`
    Wrapped {
        /// Record id.
        id: RawId,
        /// Record fields.
        attributes: T,
    },
    /// `{ "id": 1, ... }`
    Flat(FlatEntry<T>),
}

/// Flat entry; the id is optional because bare media objects omit it.
#[derive(Debug, Deserialize)]
pub struct FlatEntry<T> {
    /// Record id.
    pub id: Option<RawId>,
    /// Record fields.
    #[serde(flatten)]
    pub fields: T,
}

impl<T> RawEntry<T> {
    /// Splits the entry into its id and fields.
    pub fn into_parts(self) -> (Option<u64>, T) {
        match self {
            RawEntry::Wrapped {
                id,
                attributes,
            } => (Some(id.0), attributes),
            RawEntry::Flat(flat) => (flat.id.map(|id| id.0), flat.fields),
        }
    }

    /// Borrowed view of the fields.
    pub fn fields(&self) -> &T {
        match self {
            RawEntry::Wrapped {
                attributes, ..
            } => attributes,
            RawEntry::Flat(flat) => &flat.fields,
        }
    }

    /// Record id, if present.
    pub fn id(&self) -> Option<u64> {
        match self {
            RawEntry::Wrapped {
                id, ..
            } => Some(id.0),
            RawEntry::Flat(flat) => flat.id.map(|id| id.0),
        }
    }
}

/// To-one relation: a bare entry or a `{ data: entry | null }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawOne<T> {
    /// Entry inlined directly.
    Bare(RawEntry<T>),
    /// Entry inside a `data` envelope.
    Envelope {
        /// The related entry, `null` when unset.
        data: Option<RawEntry<T>>,
    },
}

impl<T> RawOne<T> {
    /// The related entry, if any.
    pub fn into_entry(self) -> Option<RawEntry<T>> {
        match self {
            RawOne::Bare(entry) => Some(entry),
            RawOne::Envelope {
                data,
            } => data,
        }
    }
}

/// To-many relation: a bare array or a `{ data: [...] }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawMany<T> {
    /// Entries inlined directly.
    List(Vec<RawEntry<T>>),
    /// Entries inside a `data` envelope.
    Envelope {
        /// Related entries.
        #[serde(default = "Vec::new")]
        data: Vec<RawEntry<T>>,
    },
}

impl<T> RawMany<T> {
    /// The related entries.
    pub fn into_entries(self) -> Vec<RawEntry<T>> {
        match self {
            RawMany::List(entries) => entries,
            RawMany::Envelope {
                data,
            } => data,
        }
    }
}

/// Collection response body.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    /// Entries of this page.
    #[serde(default = "Vec::new")]
    pub data: Vec<RawEntry<T>>,
    /// Response metadata.
    #[serde(default)]
    pub meta: RawMeta,
}

/// Single-record response body.
#[derive(Debug, Deserialize)]
pub struct SingleResponse<T> {
    /// The record; `null` or absent when the CMS found nothing.
    pub data: Option<RawEntry<T>>,
}

/// `meta` block of a collection response.
#[derive(Debug, Default, Deserialize)]
pub struct RawMeta {
    /// Pagination block, absent on some custom controllers.
    #[serde(default)]
    pub pagination: Option<RawPagination>,
}

/// `meta.pagination` as sent by the CMS.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPagination {
    /// Page number.
    #[serde(default)]
    pub page: Option<i64>,
    /// Page size; `-1` for "everything".
    #[serde(default)]
    pub page_size: Option<i64>,
    /// Page count.
    #[serde(default)]
    pub page_count: Option<i64>,
    /// Total number of records.
    #[serde(default)]
    pub total: Option<i64>,
}

/// Fields of an article entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAttributes {
    /// Headline.
    pub title: String,
    /// Lookup key.
    pub slug: String,
    /// Lead.
    #[serde(default)]
    pub summary: Option<String>,
    /// Body.
    #[serde(default)]
    pub content: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub reading_time: Option<u32>,
    /// Publish date.
    #[serde(default)]
    pub publish_date: Option<String>,
    /// Update date.
    #[serde(default)]
    pub update_date: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Modification timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Hero flag.
    #[serde(default)]
    pub featured: Option<bool>,
    /// Cover image.
    #[serde(default)]
    pub featured_image: Option<RawOne<MediaAttributes>>,
    /// Author relation.
    #[serde(default)]
    pub author: Option<RawOne<AuthorAttributes>>,
    /// Category relation.
    #[serde(default)]
    pub categories: Option<RawMany<TaxonomyAttributes>>,
    /// Tag relation.
    #[serde(default)]
    pub tags: Option<RawMany<TaxonomyAttributes>>,
    /// Citation components.
    #[serde(default)]
    pub references: Option<Vec<RawReference>>,
    /// Call-to-action components.
    #[serde(default)]
    pub cta: Option<Vec<RawCta>>,
    /// SEO component.
    #[serde(default)]
    pub seo: Option<RawSeo>,
}

/// Fields of an author entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAttributes {
    /// Display name.
    pub name: String,
    /// Lookup key.
    pub slug: String,
    /// Contact address.
    #[serde(default)]
    pub email: Option<String>,
    /// Biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// Job title.
    #[serde(default)]
    pub role: Option<String>,
    /// Expertise blurb.
    #[serde(default)]
    pub expertise: Option<String>,
    /// Avatar.
    #[serde(default)]
    pub profile_picture: Option<RawOne<MediaAttributes>>,
    /// Social link components.
    #[serde(default)]
    pub social_links: Option<Vec<RawSocialLink>>,
}

/// Fields shared by categories and tags.
#[derive(Debug, Deserialize)]
pub struct TaxonomyAttributes {
    /// Display name.
    pub name: String,
    /// Lookup key.
    pub slug: String,
    /// Badge color (tags only).
    #[serde(default)]
    pub color: Option<String>,
}

/// Fields of the minimal id+slug listing used for slug scans.
#[derive(Debug, Deserialize)]
pub struct SlugAttributes {
    /// Lookup key.
    pub slug: String,
}

/// Fields of an uploaded file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttributes {
    /// Relative or absolute URL.
    pub url: String,
    /// Alt text.
    #[serde(default)]
    pub alternative_text: Option<String>,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Resized variants.
    #[serde(default)]
    pub formats: Option<RawFormats>,
}

/// `formats` object of an upload.
#[derive(Debug, Default, Deserialize)]
pub struct RawFormats {
    /// Thumbnail variant.
    #[serde(default)]
    pub thumbnail: Option<RawVariant>,
    /// Small variant.
    #[serde(default)]
    pub small: Option<RawVariant>,
    /// Medium variant.
    #[serde(default)]
    pub medium: Option<RawVariant>,
    /// Large variant.
    #[serde(default)]
    pub large: Option<RawVariant>,
}

/// One resized variant.
#[derive(Debug, Deserialize)]
pub struct RawVariant {
    /// Relative URL.
    pub url: String,
    /// Width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Social link component.
#[derive(Debug, Deserialize)]
pub struct RawSocialLink {
    /// Component id.
    #[serde(default)]
    pub id: Option<RawId>,
    /// Platform name.
    #[serde(default)]
    pub platform: Option<String>,
    /// Profile URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Citation component.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReference {
    /// Component id.
    #[serde(default)]
    pub id: Option<RawId>,
    /// Cited work title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link.
    #[serde(default)]
    pub url: Option<String>,
    /// Authors of the cited work.
    #[serde(default)]
    pub authors: Option<String>,
    /// Publisher.
    #[serde(default)]
    pub publisher: Option<String>,
    /// Publication date.
    #[serde(default)]
    pub publish_date: Option<String>,
    /// Source kind.
    #[serde(default)]
    pub reference_type: Option<String>,
}

/// Call-to-action component.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCta {
    /// Component id.
    #[serde(default)]
    pub id: Option<RawId>,
    /// Label.
    #[serde(default)]
    pub text: Option<String>,
    /// Target.
    #[serde(default)]
    pub url: Option<String>,
    /// Visual variant.
    #[serde(default, rename = "type")]
    pub cta_type: Option<String>,
    /// Icon name.
    #[serde(default)]
    pub icon: Option<String>,
    /// Open in new tab.
    #[serde(default)]
    pub new_tab: Option<bool>,
}

/// SEO component.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeo {
    /// Title override.
    #[serde(default)]
    pub meta_title: Option<String>,
    /// Description.
    #[serde(default)]
    pub meta_description: Option<String>,
    /// Keywords.
    #[serde(default)]
    pub keywords: Option<String>,
    /// Robots directive.
    #[serde(default)]
    pub meta_robots: Option<String>,
    /// Canonical URL.
    #[serde(default, rename = "canonicalURL")]
    pub canonical_url: Option<String>,
    /// No-index flag.
    #[serde(default)]
    pub prevent_indexing: Option<bool>,
    /// JSON-LD.
    #[serde(default)]
    pub structured_data: Option<Value>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn timestamp(field: &str, slug: &str, raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        tracing::warn!("ignoring unparseable {} `{}` on `{}`", field, raw, slug);
    }
    parsed
}

/// Normalizes an article entry. Absent relations become empty values.
pub fn normalize_article(entry: RawEntry<ArticleAttributes>) -> Article {
    let (id, attrs) = entry.into_parts();
    let slug = attrs.slug;
    let content = attrs.content.unwrap_or_default();
    let reading_time = attrs
        .reading_time
        .filter(|minutes| *minutes > 0)
        .unwrap_or_else(|| estimate_reading_time(&content));

    Article {
        id: id.unwrap_or_default(),
        publish_date: timestamp("publishDate", &slug, attrs.publish_date.as_deref()),
        update_date: timestamp("updateDate", &slug, attrs.update_date.as_deref()),
        created_at: timestamp("createdAt", &slug, attrs.created_at.as_deref()),
        updated_at: timestamp("updatedAt", &slug, attrs.updated_at.as_deref()),
        title: attrs.title,
        summary: attrs.summary.unwrap_or_default(),
        content,
        reading_time,
        featured: attrs.featured.unwrap_or(false),
        featured_image: attrs.featured_image.and_then(normalize_media),
        author: attrs
            .author
            .and_then(RawOne::into_entry)
            .map(normalize_author),
        categories: attrs
            .categories
            .map(RawMany::into_entries)
            .unwrap_or_default()
            .into_iter()
            .map(normalize_category)
            .collect(),
        tags: attrs
            .tags
            .map(RawMany::into_entries)
            .unwrap_or_default()
            .into_iter()
            .map(normalize_tag)
            .collect(),
        references: attrs
            .references
            .unwrap_or_default()
            .into_iter()
            .map(normalize_reference)
            .collect(),
        cta: attrs
            .cta
            .unwrap_or_default()
            .into_iter()
            .map(normalize_cta)
            .collect(),
        seo: attrs.seo.map(normalize_seo),
        slug,
    }
}

/// Normalizes an author entry.
pub fn normalize_author(entry: RawEntry<AuthorAttributes>) -> Author {
    let (id, attrs) = entry.into_parts();
    Author {
        id: id.unwrap_or_default(),
        name: attrs.name,
        slug: attrs.slug,
        email: non_empty(attrs.email),
        bio: non_empty(attrs.bio),
        role: non_empty(attrs.role),
        expertise: non_empty(attrs.expertise),
        profile_picture: attrs.profile_picture.and_then(normalize_media),
        social_links: attrs
            .social_links
            .unwrap_or_default()
            .into_iter()
            .filter_map(|link| {
                // A link without a URL has nothing to render.
                let url = non_empty(link.url)?;
                Some(SocialLink {
                    id: link.id.map(|id| id.0).unwrap_or_default(),
                    platform: link.platform.unwrap_or_default(),
                    url,
                })
            })
            .collect(),
    }
}

/// Normalizes a media relation; `None` when unset or when the URL is empty.
pub fn normalize_media(relation: RawOne<MediaAttributes>) -> Option<MediaAsset> {
    let (id, attrs) = relation.into_entry()?.into_parts();
    if attrs.url.trim().is_empty() {
        return None;
    }
    let formats = attrs.formats.unwrap_or_default();
    Some(MediaAsset {
        id,
        url: attrs.url,
        alternative_text: non_empty(attrs.alternative_text),
        width: attrs.width,
        height: attrs.height,
        formats: ImageFormats {
            thumbnail: formats.thumbnail.map(normalize_variant),
            small: formats.small.map(normalize_variant),
            medium: formats.medium.map(normalize_variant),
            large: formats.large.map(normalize_variant),
        },
    })
}

fn normalize_variant(variant: RawVariant) -> ImageVariant {
    ImageVariant {
        url: variant.url,
        width: variant.width,
        height: variant.height,
    }
}

/// Normalizes a category entry.
pub fn normalize_category(entry: RawEntry<TaxonomyAttributes>) -> Category {
    let (id, attrs) = entry.into_parts();
    Category {
        id: id.unwrap_or_default(),
        name: attrs.name,
        slug: attrs.slug,
    }
}

/// Normalizes a tag entry.
pub fn normalize_tag(entry: RawEntry<TaxonomyAttributes>) -> Tag {
    let (id, attrs) = entry.into_parts();
    Tag {
        id: id.unwrap_or_default(),
        name: attrs.name,
        slug: attrs.slug,
        color: non_empty(attrs.color),
    }
}

fn normalize_reference(raw: RawReference) -> Reference {
    Reference {
        id: raw.id.map(|id| id.0).unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description: non_empty(raw.description),
        url: non_empty(raw.url),
        authors: non_empty(raw.authors),
        publisher: non_empty(raw.publisher),
        publish_date: non_empty(raw.publish_date),
        reference_type: non_empty(raw.reference_type),
    }
}

fn normalize_cta(raw: RawCta) -> Cta {
    Cta {
        id: raw.id.map(|id| id.0).unwrap_or_default(),
        text: raw.text.unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        cta_type: non_empty(raw.cta_type),
        icon: non_empty(raw.icon),
        new_tab: raw.new_tab.unwrap_or(false),
    }
}

fn normalize_seo(raw: RawSeo) -> Seo {
    Seo {
        meta_title: non_empty(raw.meta_title),
        meta_description: non_empty(raw.meta_description),
        keywords: non_empty(raw.keywords),
        meta_robots: non_empty(raw.meta_robots),
        canonical_url: non_empty(raw.canonical_url),
        prevent_indexing: raw.prevent_indexing.unwrap_or(false),
        structured_data: raw.structured_data.filter(|value| !value.is_null()),
    }
}

/// Pagination of a list response, derived from what was requested and
/// returned when the CMS omits or truncates the block.
pub fn normalize_pagination(
    meta: Option<RawPagination>,
    requested_page: u32,
    requested_page_size: u32,
    returned: usize,
) -> Pagination {
    let clamp = |value: i64| u32::try_from(value.max(0)).unwrap_or(u32::MAX);
    let meta = meta.unwrap_or_default();
    let page_size = meta
        .page_size
        .filter(|size| *size > 0)
        .map(clamp)
        .unwrap_or(requested_page_size);
    let total = meta
        .total
        .map(clamp)
        .unwrap_or_else(|| u32::try_from(returned).unwrap_or(u32::MAX));
    let page_count = meta.page_count.map(clamp).unwrap_or_else(|| {
        if page_size == 0 {
            u32::from(total > 0)
        } else {
            total.div_ceil(page_size)
        }
    });
    Pagination {
        page: meta.page.map(clamp).unwrap_or(requested_page),
        page_size,
        page_count,
        total,
    }
}
