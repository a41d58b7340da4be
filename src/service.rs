//! Cache-or-fetch search façade.
//!
//! [`SearchService`] owns the adapters and a shared [`SqliteCacheStore`].
//! A search validates the query, serves a live cache entry when allowed,
//! otherwise fans out to the routed providers and caches the merged
//! results if at least one provider answered.
//!
//! Concurrent searches for the same fingerprint are serialised: the first
//! caller fetches while the others wait, then re-check the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use techsearch_providers::{
    AdapterSet, Fingerprint, Provider, ProviderConfig, ProviderFailure, Query, SearchResult,
    orchestrator,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheEntry, CacheError, CacheStats, SqliteCacheStore};
use crate::config::{AppConfig, ProviderStatus, provider_status};
use crate::error::{Result, ServiceError};

/// Idle time after which an unused fingerprint lock is dropped.
const IN_FLIGHT_IDLE: Duration = Duration::from_secs(300);

/// Everything a search produced, including diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub fingerprint: Fingerprint,
    pub results: Vec<SearchResult>,
    /// Providers dispatched for this query (or stored with the cache entry).
    pub providers: Vec<Provider>,
    /// Providers that failed while others succeeded. Empty on a cache hit.
    pub failures: Vec<ProviderFailure>,
    pub from_cache: bool,
}

impl SearchOutcome {
    fn from_entry(entry: CacheEntry) -> Self {
        Self {
            fingerprint: entry.fingerprint,
            results: entry.results,
            providers: entry.providers,
            failures: Vec::new(),
            from_cache: true,
        }
    }
}

/// Search service.
pub struct SearchService {
    adapters: AdapterSet,
    store: Arc<SqliteCacheStore>,
    providers: ProviderConfig,
    adapter_timeout: Duration,
    in_flight: Cache<Fingerprint, Arc<Mutex<()>>>,
}

impl SearchService {
    /// Build a service over explicit adapters and store.
    ///
    /// The per-adapter timeout comes from `providers.timeout_seconds`.
    pub fn new(
        adapters: AdapterSet,
        store: Arc<SqliteCacheStore>,
        providers: ProviderConfig,
    ) -> Self {
        let adapter_timeout = Duration::from_secs(providers.timeout_seconds);
        Self {
            adapters,
            store,
            providers,
            adapter_timeout,
            // Unbounded: a lock must never be evicted while held.
            in_flight: Cache::builder().time_to_idle(IN_FLIGHT_IDLE).build(),
        }
    }

    /// Override the per-adapter timeout.
    #[must_use]
    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    /// Live HTTP adapters and the on-disk cache described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] for invalid provider settings or an
    /// HTTP client that cannot be built, and [`ServiceError::Cache`] if the
    /// database cannot be opened.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = config.provider_config();
        providers.validate()?;
        let adapters = AdapterSet::from_config(&providers)
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        let store = SqliteCacheStore::open(&config.cache_path(), config.cache_ttl())?;
        Ok(Self::new(adapters, Arc::new(store), providers))
    }

    pub fn store(&self) -> &Arc<SqliteCacheStore> {
        &self.store
    }

    /// Search and return only the results.
    ///
    /// # Errors
    ///
    /// See [`search_with_cancel`](Self::search_with_cancel).
    pub async fn search(&self, query: &Query, use_cache: bool) -> Result<Vec<SearchResult>> {
        Ok(self.search_detailed(query, use_cache).await?.results)
    }

    /// Search and return results plus diagnostics.
    ///
    /// # Errors
    ///
    /// See [`search_with_cancel`](Self::search_with_cancel).
    pub async fn search_detailed(&self, query: &Query, use_cache: bool) -> Result<SearchOutcome> {
        self.search_with_cancel(query, use_cache, CancellationToken::new())
            .await
    }

    /// Search, giving up as soon as `cancel` fires.
    ///
    /// A cancelled search drops its in-flight provider calls and writes
    /// nothing to the cache.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidQuery`] for empty text or a zero limit
    /// - [`ServiceError::AllProvidersFailed`] if no dispatched provider answered
    /// - [`ServiceError::Cache`] if the cache cannot be read or written
    /// - [`ServiceError::Cancelled`] if `cancel` fired first
    pub async fn search_with_cancel(
        &self,
        query: &Query,
        use_cache: bool,
        cancel: CancellationToken,
    ) -> Result<SearchOutcome> {
        validate(query)?;
        let fingerprint = query.fingerprint();
        tracing::trace!(query = query.text(), %fingerprint, use_cache, "search requested");

        if use_cache && let Some(hit) = self.lookup(&fingerprint).await? {
            return Ok(hit);
        }

        let lock = self.in_flight_lock(&fingerprint).await;
        let _guard = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ServiceError::Cancelled),
            guard = lock.lock() => guard,
        };

        // Another caller may have filled the entry while we waited.
        if use_cache && let Some(hit) = self.lookup(&fingerprint).await? {
            return Ok(hit);
        }

        let (providers, merged) = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(%fingerprint, "search cancelled during fan-out");
                return Err(ServiceError::Cancelled);
            }
            out = orchestrator::fan_out(&self.adapters, query, self.adapter_timeout) => out,
        };

        if !merged.any_succeeded() {
            return Err(ServiceError::AllProvidersFailed(merged.failures));
        }
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        self.store_results(&fingerprint, &merged.results, &providers)
            .await?;

        Ok(SearchOutcome {
            fingerprint,
            results: merged.results,
            providers,
            failures: merged.failures,
            from_cache: false,
        })
    }

    /// Delete expired cache entries. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Cache`] on database failure.
    pub async fn cleanup_cache(&self) -> Result<usize> {
        let removed = self.blocking(|store| store.cleanup()).await?;
        tracing::info!(removed, "cache cleanup finished");
        Ok(removed)
    }

    /// Delete every cache entry. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Cache`] on database failure.
    pub async fn clear_cache(&self) -> Result<usize> {
        let removed = self.blocking(|store| store.clear()).await?;
        tracing::info!(removed, "cache cleared");
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::Cache`] on database failure.
    pub async fn cache_stats(&self) -> Result<CacheStats> {
        Ok(self.blocking(|store| store.stats()).await?)
    }

    /// Credential availability per provider.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        provider_status(&self.providers)
    }

    async fn in_flight_lock(&self, fingerprint: &Fingerprint) -> Arc<Mutex<()>> {
        self.in_flight
            .get_with(fingerprint.clone(), async { Arc::new(Mutex::new(())) })
            .await
    }

    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<SearchOutcome>> {
        let key = fingerprint.clone();
        let entry = self.blocking(move |store| store.get(&key)).await?;
        match entry {
            Some(entry) => {
                tracing::debug!(%fingerprint, results = entry.results.len(), "cache hit");
                Ok(Some(SearchOutcome::from_entry(entry)))
            }
            None => {
                tracing::debug!(%fingerprint, "cache miss");
                Ok(None)
            }
        }
    }

    async fn store_results(
        &self,
        fingerprint: &Fingerprint,
        results: &[SearchResult],
        providers: &[Provider],
    ) -> Result<()> {
        let key = fingerprint.clone();
        let results = results.to_vec();
        let providers = providers.to_vec();
        let count = results.len();
        self.blocking(move |store| store.put(&key, &results, &providers))
            .await?;
        tracing::debug!(%fingerprint, results = count, "cache write");
        Ok(())
    }

    /// Run a store call on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> std::result::Result<T, CacheError>
    where
        F: FnOnce(&SqliteCacheStore) -> std::result::Result<T, CacheError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| CacheError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("store", &self.store)
            .field("adapter_timeout", &self.adapter_timeout)
            .finish_non_exhaustive()
    }
}

fn validate(query: &Query) -> Result<()> {
    if query.text().trim().is_empty() {
        return Err(ServiceError::InvalidQuery("query text is empty".to_owned()));
    }
    if query.limit() == 0 {
        return Err(ServiceError::InvalidQuery(
            "limit must be at least 1".to_owned(),
        ));
    }
    Ok(())
}
