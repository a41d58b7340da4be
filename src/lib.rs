//! techsearch: cached technical search across web, LLM and video providers.
//!
//! One query goes to the providers chosen by the router, the answers are
//! normalised into a common [`SearchResult`] shape, deduplicated, truncated
//! and cached in SQLite under the query's fingerprint.
//!
//! # Architecture
//!
//! - **Providers** (`techsearch-providers`): adapters for Tavily web search,
//!   Groq text analysis and YouTube transcripts, plus routing and fan-out
//! - **Cache**: [`SqliteCacheStore`], a TTL-bounded result store
//! - **Service**: [`SearchService`], the cache-or-fetch façade
//! - **Config**: [`AppConfig`], TOML file plus environment overrides
//!
//! The `techsearch` binary is a thin driver over [`SearchService`].

pub mod app_dirs;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod service;

pub use cache::{CacheEntry, CacheError, CacheStats, SqliteCacheStore};
pub use config::{AppConfig, ProviderStatus};
pub use error::{Result, ServiceError};
pub use service::{SearchOutcome, SearchService};

pub use techsearch_providers::{
    AdapterSet, FailureKind, Fingerprint, Provider, ProviderConfig, ProviderFailure, Query,
    SearchResult, TechDomain,
};
