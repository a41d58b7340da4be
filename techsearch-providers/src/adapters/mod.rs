//! Concrete adapters, one per [`Provider`].

pub mod text_analysis;
pub mod transcript;
pub mod web_search;

use std::sync::Arc;

use crate::adapter::ProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::types::Provider;

pub use text_analysis::TextAnalysisAdapter;
pub use transcript::TranscriptAdapter;
pub use web_search::WebSearchAdapter;

/// Build the live adapter for `provider`.
///
/// # Errors
///
/// Returns [`ProviderError::Unreachable`] if the HTTP client cannot be built.
pub fn build_adapter(
    provider: Provider,
    config: &ProviderConfig,
) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
    Ok(match provider {
        Provider::WebSearch => Arc::new(WebSearchAdapter::new(config)?),
        Provider::TextAnalysis => Arc::new(TextAnalysisAdapter::new(config)?),
        Provider::Transcript => Arc::new(TranscriptAdapter::new(config)?),
    })
}
