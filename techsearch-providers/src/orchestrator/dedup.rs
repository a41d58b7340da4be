//! Result deduplication preserving first-seen order.
//!
//! Results with a URL are keyed by its canonical form; results without
//! one (analysis answers) are keyed by their normalised title and
//! snippet. The first occurrence of a key wins and keeps its position.

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::normalize_url;

/// Drop later duplicates, keeping the order of first appearance.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    let mut unique = Vec::with_capacity(results.len());

    for result in results {
        if seen.insert(dedup_key(&result)) {
            unique.push(result);
        } else {
            tracing::trace!(title = %result.title, provider = %result.provider, "dropping duplicate");
        }
    }
    unique
}

/// Identity of a result for dedup purposes.
pub fn dedup_key(result: &SearchResult) -> String {
    match result.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => format!("url:{}", normalize_url(url)),
        None => format!(
            "text:{}\n{}",
            normalize_text(&result.title),
            normalize_text(&result.snippet)
        ),
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
