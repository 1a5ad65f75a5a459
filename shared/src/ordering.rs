//! "Most recent first" ordering and the hero/grid split of the blog index.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Article;

/// Effective date descending; undated articles last; ties by id descending.
pub fn compare_most_recent(a: &Article, b: &Article) -> Ordering {
    match (a.effective_date(), b.effective_date()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.id.cmp(&a.id))
}

/// Sorts in place, most recent first.
pub fn sort_most_recent(articles: &mut [Article]) {
    articles.sort_by(compare_most_recent);
}

/// The `limit` most recent articles.
pub fn most_recent(mut articles: Vec<Article>, limit: usize) -> Vec<Article> {
    sort_most_recent(&mut articles);
    articles.truncate(limit);
    articles
}

/// Articles whose nested author slug equals `author_slug` exactly.
pub fn filter_by_author(articles: Vec<Article>, author_slug: &str) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|article| article.author_slug() == Some(author_slug))
        .collect()
}

/// Blog index layout: one hero article above a grid of the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogIndex {
    /// Most recent article, promoted to the hero slot.
    pub hero: Option<Article>,
    /// Remaining articles, never containing the hero.
    pub grid: Vec<Article>,
}

/// Promotes the most recent article to hero and drops it from the grid.
pub fn split_featured(mut articles: Vec<Article>) -> BlogIndex {
    sort_most_recent(&mut articles);
    let mut iter = articles.into_iter();
    let Some(hero) = iter.next() else {
        return BlogIndex::default();
    };
    let grid = iter.filter(|article| article.id != hero.id).collect();
    BlogIndex {
        hero: Some(hero),
        grid,
    }
}

/// Uses an editor-chosen hero when there is one and removes it from the
/// grid; otherwise infers the hero as the most recent article.
pub fn split_with_hero(hero: Option<Article>, articles: Vec<Article>) -> BlogIndex {
    let Some(hero) = hero else {
        return split_featured(articles);
    };
    let mut grid: Vec<Article> = articles
        .into_iter()
        .filter(|article| article.id != hero.id)
        .collect();
    sort_most_recent(&mut grid);
    BlogIndex {
        hero: Some(hero),
        grid,
    }
}
