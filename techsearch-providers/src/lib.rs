//! # techsearch-providers
//!
//! Provider adapters and fan-out for techsearch.
//!
//! Three kinds of content sit behind one [`ProviderAdapter`] trait: ranked
//! web snippets (Tavily), an LLM analysis of the topic (Groq chat
//! completions) and full video transcripts (YouTube captions). Each
//! adapter returns its provider's native shape; [`normalize::normalize`]
//! turns that into common [`SearchResult`]s.
//!
//! ## Design
//!
//! - Closed [`Provider`] and [`NativeResponse`] enums, one variant per provider
//! - [`router::select`] picks providers from the query; text analysis is opt-in
//! - [`orchestrator::fan_out`] calls the selected adapters concurrently, each
//!   under its own timeout, and records failures as values
//! - Results are deduplicated by canonical URL in first-seen order
//!
//! ## Security
//!
//! - Credentials come from [`ProviderConfig`]; nothing here reads the environment
//! - Query text is logged only at trace level
//! - Error messages never echo API keys

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod error;
pub mod http;
pub mod native;
pub mod normalize;
pub mod orchestrator;
pub mod query;
pub mod router;
pub mod types;
pub mod video;

pub use adapter::ProviderAdapter;
pub use config::ProviderConfig;
pub use error::{ConfigError, FailureKind, ProviderError, ProviderFailure, Result};
pub use native::NativeResponse;
pub use orchestrator::{AdapterSet, FanOut};
pub use query::{Fingerprint, Query, DEFAULT_LIMIT};
pub use types::{Metadata, Provider, SearchResult, TechDomain};

/// Route `query`, query the selected providers with live adapters and
/// merge the results. No caching.
///
/// # Errors
///
/// Returns [`ConfigError`] if `config` is invalid and
/// [`ProviderError`] if the HTTP clients cannot be built. Provider failures
/// during the search are reported in [`FanOut::failures`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// use techsearch_providers::{ProviderConfig, Query};
///
/// let mut config = ProviderConfig::default();
/// config.web.api_key = Some("tvly-...".into());
/// let out = techsearch_providers::search_uncached(&Query::new("rust async"), &config).await?;
/// for result in &out.results {
///     println!("{}: {:?}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_uncached(
    query: &Query,
    config: &ProviderConfig,
) -> std::result::Result<FanOut, Box<dyn std::error::Error + Send + Sync>> {
    config.validate()?;
    let adapters = AdapterSet::from_config(config)?;
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);
    let (_, out) = orchestrator::fan_out(&adapters, query, timeout).await;
    Ok(out)
}
