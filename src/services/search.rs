//! Keyword search producing the synthetic search-result level.

use crate::managers::bookmark_store::BookmarkStore;
use crate::services::sorter;
use crate::types::errors::NavigationError;
use crate::types::tree::{SearchOptions, SearchQuery, TreeLevel};

/// Whether every whitespace-separated word of `keyword` occurs in `title`,
/// ignoring case.
pub fn title_matches(title: &str, keyword: &str) -> bool {
    let title = title.to_lowercase();
    keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|word| title.contains(&word))
}

/// Runs `keyword` against the store and returns the matching bookmarks as a level.
///
/// Only bookmarks are kept. With `title_only`, the store's title-or-url
/// match is narrowed to titles. Results are cut at `max_results` before
/// being ordered by title.
pub async fn search<S: BookmarkStore + ?Sized>(
    store: &S,
    keyword: &str,
    options: &SearchOptions,
) -> Result<TreeLevel, NavigationError> {
    let candidates = store.search(keyword).await?;

    let results: Vec<_> = candidates
        .into_iter()
        .filter(|record| record.kind().is_listable_in_search())
        .filter(|record| !options.title_only || title_matches(&record.title, keyword))
        .take(options.max_results)
        .collect();

    tracing::debug!("Search '{}' matched {} bookmarks", keyword, results.len());

    let query = SearchQuery {
        keyword: keyword.to_string(),
        options: options.clone(),
    };
    Ok(TreeLevel::search_result(query, sorter::sort_by_title(results)))
}
