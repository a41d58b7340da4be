//! Trait definition for provider adapters.
//!
//! Each provider (web search, text analysis, transcript) implements
//! [`ProviderAdapter`] to give the fan-out step one uniform call.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::native::NativeResponse;
use crate::query::Query;
use crate::types::Provider;

/// A boundary adapter for one external provider.
///
/// Implementors handle their own:
///
/// - request construction (endpoint, auth headers, body)
/// - mapping of HTTP and transport failures onto [`ProviderError`]
/// - decoding into the provider's [`NativeResponse`] variant
///
/// Adapters must not touch shared state. All implementations must be
/// `Send + Sync` so one instance can serve concurrent searches.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter speaks for.
    fn provider(&self) -> Provider;

    /// Perform one outbound call for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] classified as `Unauthorized`, `RateLimited`,
    /// `Timeout`, `Unreachable` or `Malformed`.
    async fn fetch(&self, query: &Query) -> Result<NativeResponse, ProviderError>;
}
