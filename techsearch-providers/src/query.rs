//! Immutable search queries and their cache fingerprints.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

use crate::types::{Provider, TechDomain};
use crate::video::{extract_video_id, is_video_url};

/// Result limit used when the caller does not set one.
pub const DEFAULT_LIMIT: usize = 10;

/// Bumped whenever the canonical fingerprint input changes shape.
const FINGERPRINT_VERSION: &str = "v1";

/// A search request. Built once, never mutated.
///
/// ```
/// use techsearch_providers::{Provider, Query, TechDomain};
///
/// let query = Query::new("  Rust async runtimes ")
///     .with_domains([TechDomain::ProgrammingLanguages])
///     .with_providers([Provider::WebSearch])
///     .with_limit(5);
/// assert_eq!(query.text(), "Rust async runtimes");
/// assert_eq!(query.limit(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    domains: BTreeSet<TechDomain>,
    providers: Option<Vec<Provider>>,
    limit: usize,
}

impl Query {
    /// A query for `text` with no filters, auto routing and the default limit.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_owned(),
            domains: BTreeSet::new(),
            providers: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Scope the query to the given technology domains.
    pub fn with_domains(mut self, domains: impl IntoIterator<Item = TechDomain>) -> Self {
        self.domains = domains.into_iter().collect();
        self
    }

    /// Select providers explicitly. Duplicates are dropped, first occurrence wins.
    /// An empty selection means auto routing.
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        let mut selected: Vec<Provider> = Vec::new();
        for provider in providers {
            if !selected.contains(&provider) {
                selected.push(provider);
            }
        }
        self.providers = (!selected.is_empty()).then_some(selected);
        self
    }

    /// Cap the number of results returned.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The query text, trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn domains(&self) -> &BTreeSet<TechDomain> {
        &self.domains
    }

    /// The explicit provider selection, if any.
    pub fn providers(&self) -> Option<&[Provider]> {
        self.providers.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Text lowercased with whitespace runs collapsed.
    pub fn normalized_text(&self) -> String {
        self.text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Query text with the domain filters appended as a topic hint.
    pub fn scoped_text(&self) -> String {
        if self.domains.is_empty() {
            return self.text.clone();
        }
        let topics: Vec<&str> = self.domains.iter().map(|d| d.label()).collect();
        format!("{} (topics: {})", self.text, topics.join(", "))
    }

    /// Text as it enters the fingerprint.
    ///
    /// Video links reduce to `video:{id}` with the id's case kept, since ids
    /// are case-sensitive. Everything else is [`normalized_text`](Self::normalized_text).
    fn canonical_text(&self) -> String {
        if is_video_url(&self.text) {
            if let Some(id) = extract_video_id(&self.text) {
                return format!("video:{id}");
            }
        }
        self.normalized_text()
    }

    /// Deterministic cache key over the normalised fields.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut domains: Vec<&str> = self.domains.iter().map(|d| d.slug()).collect();
        domains.sort_unstable();
        let providers = match &self.providers {
            Some(selected) => selected
                .iter()
                .map(|p| p.slug())
                .collect::<Vec<_>>()
                .join(","),
            None => "auto".to_owned(),
        };
        let canonical = format!(
            "{FINGERPRINT_VERSION}\ntext={}\ndomains={}\nproviders={}\nlimit={}",
            self.canonical_text(),
            domains.join(","),
            providers,
            self.limit
        );

        let digest = Sha256::digest(canonical.as_bytes());
        Fingerprint(format!("{digest:x}"))
    }
}

/// Lowercase hex SHA-256 of a query's canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Fingerprint {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
