//! Result export and display helpers.

use std::collections::BTreeSet;

use serde_json::{Value, json};
use techsearch_providers::{Provider, SearchResult};

/// Results as a JSON array of `{title, url, snippet, provider}` objects.
///
/// Metadata is left out; `url` is `null` for results without one.
pub fn to_json(results: &[SearchResult]) -> Value {
    Value::Array(
        results
            .iter()
            .map(|r| {
                json!({
                    "title": r.title,
                    "url": r.url,
                    "snippet": r.snippet,
                    "provider": r.provider.slug(),
                })
            })
            .collect(),
    )
}

/// Number of distinct providers among `results`.
pub fn summarize_providers(results: &[SearchResult]) -> usize {
    results
        .iter()
        .map(|r| r.provider)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Results from `provider` only, in their original order.
pub fn filter_by_provider(results: &[SearchResult], provider: Provider) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| r.provider == provider)
        .cloned()
        .collect()
}
