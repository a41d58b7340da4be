//! Persistent search result cache.
//!
//! Sub-modules:
//! - `types`: entry, stats and error types.
//! - `schema`: SQLite DDL.
//! - `sqlite`: the `SqliteCacheStore` itself.

pub(crate) mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteCacheStore;
pub use types::{CacheEntry, CacheError, CacheStats};

/// Database filename within the data directory.
pub const DB_FILENAME: &str = "cache.db";
