//! Error types for provider adapters.
//!
//! Every adapter failure collapses into one of five kinds. Messages are
//! stable and never contain API keys or request bodies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Provider;

/// Errors an adapter can return from a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Missing or rejected credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The provider is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The call did not complete inside its timeout window.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Network, DNS or server-side failure.
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The provider answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// The failure kind, without the message.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unauthorized(_) => FailureKind::Unauthorized,
            Self::RateLimited(_) => FailureKind::RateLimited,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Unreachable(_) => FailureKind::Unreachable,
            Self::Malformed(_) => FailureKind::Malformed,
        }
    }

    /// The inner message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(m)
            | Self::RateLimited(m)
            | Self::Timeout(m)
            | Self::Unreachable(m)
            | Self::Malformed(m) => m,
        }
    }
}

/// Stable classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unauthorized,
    RateLimited,
    Timeout,
    Unreachable,
    Malformed,
}

impl FailureKind {
    /// SCREAMING_SNAKE_CASE code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Timeout => "TIMEOUT",
            Self::Unreachable => "UNREACHABLE",
            Self::Malformed => "MALFORMED",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A recorded per-provider failure from one fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub kind: FailureKind,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(provider: Provider, error: &ProviderError) -> Self {
        Self {
            provider,
            kind: error.kind(),
            message: error.message().to_owned(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.provider, self.kind, self.message)
    }
}

/// Invalid provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// Convenience type alias for adapter results.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unauthorized() {
        let err = ProviderError::Unauthorized("TAVILY_API_KEY not configured".into());
        assert_eq!(err.to_string(), "unauthorized: TAVILY_API_KEY not configured");
    }

    #[test]
    fn display_timeout() {
        let err = ProviderError::Timeout("exceeded 20s limit".into());
        assert_eq!(err.to_string(), "timed out: exceeded 20s limit");
    }

    #[test]
    fn display_malformed() {
        let err = ProviderError::Malformed("missing choices".into());
        assert_eq!(err.to_string(), "malformed response: missing choices");
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            ProviderError::RateLimited(String::new()).kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            ProviderError::Unreachable(String::new()).kind(),
            FailureKind::Unreachable
        );
    }

    #[test]
    fn failure_codes_are_stable() {
        assert_eq!(FailureKind::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(FailureKind::RateLimited.code(), "RATE_LIMITED");
        assert_eq!(FailureKind::Timeout.code(), "TIMEOUT");
        assert_eq!(FailureKind::Unreachable.code(), "UNREACHABLE");
        assert_eq!(FailureKind::Malformed.code(), "MALFORMED");
    }

    #[test]
    fn provider_failure_display_includes_provider_and_kind() {
        let failure = ProviderFailure::new(
            Provider::WebSearch,
            &ProviderError::Timeout("20s".into()),
        );
        assert_eq!(failure.to_string(), "web-search: TIMEOUT (20s)");
    }

    #[test]
    fn display_config() {
        let err = ConfigError("timeout_seconds must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "config error: timeout_seconds must be greater than 0"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProviderError>();
        assert_send_sync::<ProviderFailure>();
    }
}
