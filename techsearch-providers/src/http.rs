//! Shared HTTP plumbing for adapters.
//!
//! Builds [`reqwest::Client`]s and maps HTTP statuses and transport
//! failures onto [`ProviderError`] kinds so every adapter classifies
//! failures the same way.

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use rand::seq::SliceRandom;
use reqwest::StatusCode;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per page-fetch client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// User-Agent sent to JSON APIs.
const API_USER_AGENT: &str = concat!("techsearch/", env!("CARGO_PKG_VERSION"));

/// Longest provider error body echoed into an error message.
const MAX_BODY_EXCERPT: usize = 200;

/// Build a client for authenticated JSON APIs.
///
/// # Errors
///
/// Returns [`ProviderError::Unreachable`] if the client cannot be constructed.
pub fn build_api_client(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(API_USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Unreachable(format!("failed to build HTTP client: {e}")))
}

/// Build a client for fetching public web pages.
///
/// Uses the configured User-Agent, or a random browser one, and follows
/// up to 10 redirects (consent interstitials redirect a few times).
///
/// # Errors
///
/// Returns [`ProviderError::Unreachable`] if the client cannot be constructed.
pub fn build_page_client(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ProviderError::Unreachable(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array; choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Classify a non-success HTTP status.
///
/// 401/403 → `Unauthorized`, 429 → `RateLimited`, 408/504 → `Timeout`,
/// other 5xx → `Unreachable`, anything else → `Malformed`.
pub fn classify_status(service: &str, status: StatusCode, body: &str) -> ProviderError {
    let excerpt = excerpt(body);
    let message = if excerpt.is_empty() {
        format!("{service} returned {status}")
    } else {
        format!("{service} returned {status}: {excerpt}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::Timeout(message),
        s if s.is_server_error() => ProviderError::Unreachable(message),
        _ => ProviderError::Malformed(message),
    }
}

/// Classify a transport-level [`reqwest::Error`].
pub fn classify_transport(service: &str, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(format!("{service} request timed out"))
    } else if err.is_decode() || err.is_body() {
        ProviderError::Malformed(format!("{service} response unreadable: {err}"))
    } else {
        ProviderError::Unreachable(format!("{service} request failed: {err}"))
    }
}

/// Send a prepared request and return the body on 2xx, classifying failures.
pub async fn send_for_text(
    service: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| classify_transport(service, &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| classify_transport(service, &e))?;

    if !status.is_success() {
        return Err(classify_status(service, status, &body));
    }

    tracing::trace!(service, bytes = body.len(), "response received");
    Ok(body)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}
