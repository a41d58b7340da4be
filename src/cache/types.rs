//! Cache entry, statistics and error types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use techsearch_providers::{Fingerprint, Provider, SearchResult};

/// One stored search outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    /// Results in the order they were returned to the first caller.
    pub results: Vec<SearchResult>,
    pub created_at: DateTime<Utc>,
    /// Providers that were dispatched for this entry.
    pub providers: Vec<Provider>,
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: u64,
    /// Entries past their TTL that `cleanup` would remove.
    pub expired: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// Errors from the cache store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row could not be decoded.
    #[error("corrupt cache entry: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// The blocking task running a cache call panicked or was cancelled.
    #[error("cache task failed: {0}")]
    Task(String),

    #[error("cache lock poisoned")]
    Poisoned,
}
