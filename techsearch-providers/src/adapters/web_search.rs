//! Web search adapter: Tavily Search API.
//!
//! `POST {base_url}/search` with the API key in the JSON body. Returns
//! ranked hits with title, URL and a content snippet.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::ProviderAdapter;
use crate::config::{usable_key, ProviderConfig, WebSearchSettings};
use crate::error::ProviderError;
use crate::http;
use crate::native::{NativeResponse, WebHit};
use crate::query::Query;
use crate::types::Provider;

const SERVICE: &str = "Tavily";

/// Tavily caps `max_results` at 20.
const MAX_RESULTS_CAP: usize = 20;

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
    include_answer: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<WebHit>,
}

/// Ranked web snippets from Tavily.
pub struct WebSearchAdapter {
    client: reqwest::Client,
    settings: WebSearchSettings,
}

impl WebSearchAdapter {
    /// # Errors
    ///
    /// Returns [`ProviderError::Unreachable`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_api_client(config)?,
            settings: config.web.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ProviderAdapter for WebSearchAdapter {
    fn provider(&self) -> Provider {
        Provider::WebSearch
    }

    async fn fetch(&self, query: &Query) -> Result<NativeResponse, ProviderError> {
        let api_key = usable_key(self.settings.api_key.as_deref())
            .ok_or_else(|| ProviderError::Unauthorized("Tavily API key not configured".into()))?;

        let scoped = query.scoped_text();
        tracing::trace!(query = %scoped, "Tavily search");

        let body = TavilyRequest {
            api_key,
            query: &scoped,
            max_results: query.limit().clamp(1, MAX_RESULTS_CAP),
            search_depth: &self.settings.search_depth,
            include_answer: false,
        };

        let raw = http::send_for_text(SERVICE, self.client.post(self.endpoint()).json(&body)).await?;
        let hits = parse_tavily_response(&raw)?;

        tracing::debug!(count = hits.len(), "Tavily results parsed");
        Ok(NativeResponse::WebSearch(hits))
    }
}

/// Decode a Tavily response body, dropping hits without a URL.
pub(crate) fn parse_tavily_response(raw: &str) -> Result<Vec<WebHit>, ProviderError> {
    let response: TavilyResponse = serde_json::from_str(raw)
        .map_err(|e| ProviderError::Malformed(format!("Tavily response not understood: {e}")))?;

    Ok(response
        .results
        .into_iter()
        .filter(|hit| !hit.url.trim().is_empty())
        .collect())
}
