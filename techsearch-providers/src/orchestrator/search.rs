//! Concurrent provider fan-out and fan-in.
//!
//! Dispatches one query to every selected adapter at once, each under its
//! own timeout, then normalises, deduplicates and truncates what came back.
//! Per-provider failures are returned as values alongside the results.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::ProviderAdapter;
use crate::adapters::build_adapter;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderFailure};
use crate::normalize::normalize;
use crate::query::Query;
use crate::router;
use crate::types::{Provider, SearchResult};

use super::dedup::deduplicate;

/// One adapter slot per [`Provider`].
#[derive(Clone)]
pub struct AdapterSet {
    web_search: Arc<dyn ProviderAdapter>,
    text_analysis: Arc<dyn ProviderAdapter>,
    transcript: Arc<dyn ProviderAdapter>,
}

impl AdapterSet {
    /// Assemble a set from explicit adapters (tests inject mocks here).
    pub fn new(
        web_search: Arc<dyn ProviderAdapter>,
        text_analysis: Arc<dyn ProviderAdapter>,
        transcript: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            web_search,
            text_analysis,
            transcript,
        }
    }

    /// Build the live HTTP adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unreachable`] if an HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self::new(
            build_adapter(Provider::WebSearch, config)?,
            build_adapter(Provider::TextAnalysis, config)?,
            build_adapter(Provider::Transcript, config)?,
        ))
    }

    /// The adapter serving `provider`.
    pub fn get(&self, provider: Provider) -> &Arc<dyn ProviderAdapter> {
        match provider {
            Provider::WebSearch => &self.web_search,
            Provider::TextAnalysis => &self.text_analysis,
            Provider::Transcript => &self.transcript,
        }
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSet").finish_non_exhaustive()
    }
}

/// What one dispatched provider produced, already normalised.
#[derive(Debug)]
pub struct ProviderOutcome {
    pub provider: Provider,
    pub result: Result<Vec<SearchResult>, ProviderError>,
}

/// Merged output of a fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Deduplicated, truncated results in dispatch-then-native order.
    pub results: Vec<SearchResult>,
    /// Providers that failed, in dispatch order.
    pub failures: Vec<ProviderFailure>,
    /// Providers that answered, in dispatch order.
    pub succeeded: Vec<Provider>,
}

impl FanOut {
    /// At least one provider answered (possibly with zero results).
    pub fn any_succeeded(&self) -> bool {
        !self.succeeded.is_empty()
    }
}

/// Route, dispatch and merge in one step.
///
/// Returns the providers dispatched alongside the merged output.
pub async fn fan_out(
    adapters: &AdapterSet,
    query: &Query,
    timeout: Duration,
) -> (Vec<Provider>, FanOut) {
    let providers = router::select(query);
    let outcomes = dispatch(adapters, &providers, query, timeout).await;
    (providers, merge(outcomes, query.limit()))
}

/// Call every provider in `providers` concurrently.
///
/// Each call is bounded by `timeout` on its own; a slow provider yields a
/// `Timeout` outcome without holding up the others. Outcomes come back in
/// `providers` order.
pub async fn dispatch(
    adapters: &AdapterSet,
    providers: &[Provider],
    query: &Query,
    timeout: Duration,
) -> Vec<ProviderOutcome> {
    let futures: Vec<_> = providers
        .iter()
        .map(|&provider| {
            let adapter = Arc::clone(adapters.get(provider));
            async move {
                let result = fetch_one(adapter.as_ref(), provider, query, timeout).await;
                ProviderOutcome { provider, result }
            }
        })
        .collect();

    futures::future::join_all(futures).await
}

async fn fetch_one(
    adapter: &dyn ProviderAdapter,
    provider: Provider,
    query: &Query,
    timeout: Duration,
) -> Result<Vec<SearchResult>, ProviderError> {
    let native = match tokio::time::timeout(timeout, adapter.fetch(query)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ProviderError::Timeout(format!(
                "{} did not answer within {}s",
                provider.service_name(),
                timeout.as_secs_f64()
            )));
        }
    };

    if native.provider() != provider {
        return Err(ProviderError::Malformed(format!(
            "{provider} adapter returned a {} response",
            native.provider()
        )));
    }
    Ok(normalize(native))
}

/// Collect outcomes into results and failures, dedup, then truncate to `limit`.
pub fn merge(outcomes: Vec<ProviderOutcome>, limit: usize) -> FanOut {
    let mut merged = FanOut::default();
    let mut collected = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(results) => {
                tracing::debug!(provider = %outcome.provider, count = results.len(), "provider returned results");
                collected.extend(results);
                merged.succeeded.push(outcome.provider);
            }
            Err(err) => {
                tracing::warn!(provider = %outcome.provider, error = %err, "provider query failed");
                merged
                    .failures
                    .push(ProviderFailure::new(outcome.provider, &err));
            }
        }
    }

    let mut results = deduplicate(collected);
    results.truncate(limit);
    merged.results = results;
    merged
}
