//! Error types for the search service.

use techsearch_providers::ProviderFailure;

use crate::cache::CacheError;

/// Top-level error type for [`crate::SearchService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Every dispatched provider failed; nothing was cached.
    #[error("all providers failed: {}", summarize_failures(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),

    /// Cache read or write failure. Never treated as a miss.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Empty query text or zero limit.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The caller cancelled the search before it finished.
    #[error("search cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Per-provider failures, when every provider failed.
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed(failures) => failures,
            _ => &[],
        }
    }
}

impl From<techsearch_providers::ConfigError> for ServiceError {
    fn from(err: techsearch_providers::ConfigError) -> Self {
        Self::Config(err.0)
    }
}

fn summarize_failures(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no providers dispatched".to_owned();
    }
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;
