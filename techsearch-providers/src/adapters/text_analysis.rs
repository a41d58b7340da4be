//! Text analysis adapter: Groq's OpenAI-compatible chat completions API.
//!
//! Sends the query as a single user turn behind a short analyst system
//! prompt and returns the model's answer with its token usage.

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapter::ProviderAdapter;
use crate::config::{usable_key, AnalysisSettings, ProviderConfig};
use crate::error::ProviderError;
use crate::http;
use crate::native::{Completion, NativeResponse};
use crate::query::Query;
use crate::types::Provider;

const SERVICE: &str = "Groq";

const SYSTEM_PROMPT: &str = "You are a technology analyst. Give a concise, accurate overview of \
the topic: key concepts, current state, notable tools or projects, and practical \
considerations. Use short paragraphs or bullet points.";

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

/// LLM-backed analysis of the query topic.
pub struct TextAnalysisAdapter {
    client: reqwest::Client,
    settings: AnalysisSettings,
}

impl TextAnalysisAdapter {
    /// # Errors
    ///
    /// Returns [`ProviderError::Unreachable`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::build_api_client(config)?,
            settings: config.analysis.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/openai/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, query: &Query) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": query.scoped_text()},
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "stream": false,
        })
    }
}

#[async_trait]
impl ProviderAdapter for TextAnalysisAdapter {
    fn provider(&self) -> Provider {
        Provider::TextAnalysis
    }

    async fn fetch(&self, query: &Query) -> Result<NativeResponse, ProviderError> {
        let api_key = usable_key(self.settings.api_key.as_deref())
            .ok_or_else(|| ProviderError::Unauthorized("Groq API key not configured".into()))?;

        tracing::trace!(query = query.text(), model = %self.settings.model, "Groq analysis");

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.request_body(query));
        let raw = http::send_for_text(SERVICE, request).await?;
        let completion = parse_chat_response(&raw, &self.settings.model)?;

        tracing::debug!(
            model = %completion.model,
            tokens = completion.total_tokens,
            "Groq analysis complete"
        );
        Ok(NativeResponse::TextAnalysis(completion))
    }
}

/// Decode a chat completion body. `fallback_model` is used when the
/// response omits the model id.
pub(crate) fn parse_chat_response(
    raw: &str,
    fallback_model: &str,
) -> Result<Completion, ProviderError> {
    let response: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| ProviderError::Malformed(format!("Groq response not understood: {e}")))?;

    let answer = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_owned())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ProviderError::Malformed("Groq response has no answer".into()))?;

    let usage = response.usage.unwrap_or_default();
    let total_tokens = if usage.total_tokens > 0 {
        usage.total_tokens
    } else {
        usage.prompt_tokens.saturating_add(usage.completion_tokens)
    };

    Ok(Completion {
        answer,
        model: response
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_model.to_owned()),
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens,
    })
}
