//! Conversion of provider-native responses into [`SearchResult`]s.
//!
//! Pure functions; nothing here performs I/O or truncates text.

use serde_json::Value;
use url::Url;

use crate::native::{Completion, NativeResponse, Transcript, WebHit};
use crate::types::{Metadata, Provider, SearchResult};
use crate::video::watch_url;

/// Metadata keys written by the normaliser.
pub mod keys {
    /// `"web"`, `"ai_analysis"` or `"transcript"`.
    pub const TYPE: &str = "type";

    pub const RANK: &str = "rank";
    pub const SCORE: &str = "score";
    pub const PUBLISHED_DATE: &str = "published_date";
    pub const DOMAIN: &str = "domain";

    pub const MODEL_USED: &str = "model_used";
    pub const TOKENS_USED: &str = "tokens_used";
    pub const PROMPT_TOKENS: &str = "prompt_tokens";
    pub const COMPLETION_TOKENS: &str = "completion_tokens";
    pub const FULL_ANALYSIS: &str = "full_analysis";

    pub const VIDEO_ID: &str = "video_id";
    pub const TRANSCRIPT_LENGTH: &str = "transcript_length";
    pub const FULL_TRANSCRIPT: &str = "full_transcript";
    pub const DURATION_SECONDS: &str = "duration_seconds";
    pub const LANGUAGE: &str = "language";
}

/// Values of [`keys::TYPE`].
pub mod kinds {
    pub const WEB: &str = "web";
    pub const AI_ANALYSIS: &str = "ai_analysis";
    pub const TRANSCRIPT: &str = "transcript";
}

/// Map one native response onto common results, in native order.
pub fn normalize(response: NativeResponse) -> Vec<SearchResult> {
    match response {
        NativeResponse::WebSearch(hits) => hits
            .into_iter()
            .enumerate()
            .map(|(idx, hit)| normalize_web_hit(idx + 1, hit))
            .collect(),
        NativeResponse::TextAnalysis(completion) => vec![normalize_completion(completion)],
        NativeResponse::Transcript(transcript) => vec![normalize_transcript(transcript)],
    }
}

fn normalize_web_hit(rank: usize, hit: WebHit) -> SearchResult {
    let mut metadata = Metadata::new();
    metadata.insert(keys::TYPE.into(), kinds::WEB.into());
    metadata.insert(keys::RANK.into(), Value::from(rank));
    if let Some(score) = hit.score.filter(|s| s.is_finite()) {
        metadata.insert(keys::SCORE.into(), Value::from(score));
    }
    if let Some(date) = hit.published_date.filter(|d| !d.trim().is_empty()) {
        metadata.insert(keys::PUBLISHED_DATE.into(), Value::from(date));
    }
    if let Some(domain) = display_domain(&hit.url) {
        metadata.insert(keys::DOMAIN.into(), Value::from(domain));
    }

    let title = if hit.title.trim().is_empty() {
        hit.url.clone()
    } else {
        hit.title
    };

    SearchResult {
        title,
        url: Some(hit.url),
        snippet: hit.content,
        provider: Provider::WebSearch,
        metadata,
    }
}

fn normalize_completion(completion: Completion) -> SearchResult {
    let mut metadata = Metadata::new();
    metadata.insert(keys::TYPE.into(), kinds::AI_ANALYSIS.into());
    metadata.insert(keys::MODEL_USED.into(), Value::from(completion.model.clone()));
    metadata.insert(keys::TOKENS_USED.into(), Value::from(completion.total_tokens));
    metadata.insert(keys::PROMPT_TOKENS.into(), Value::from(completion.prompt_tokens));
    metadata.insert(
        keys::COMPLETION_TOKENS.into(),
        Value::from(completion.completion_tokens),
    );
    metadata.insert(
        keys::FULL_ANALYSIS.into(),
        Value::from(completion.answer.clone()),
    );

    SearchResult {
        title: format!("AI Analysis ({})", completion.model),
        url: None,
        snippet: completion.answer,
        provider: Provider::TextAnalysis,
        metadata,
    }
}

fn normalize_transcript(transcript: Transcript) -> SearchResult {
    let full_text = transcript.full_text();

    let mut metadata = Metadata::new();
    metadata.insert(keys::TYPE.into(), kinds::TRANSCRIPT.into());
    metadata.insert(keys::VIDEO_ID.into(), Value::from(transcript.video_id.clone()));
    metadata.insert(
        keys::TRANSCRIPT_LENGTH.into(),
        Value::from(transcript.segments.len()),
    );
    metadata.insert(keys::FULL_TRANSCRIPT.into(), Value::from(full_text.clone()));
    metadata.insert(
        keys::DURATION_SECONDS.into(),
        Value::from(transcript.duration_seconds()),
    );
    if let Some(language) = transcript.language {
        metadata.insert(keys::LANGUAGE.into(), Value::from(language));
    }

    SearchResult {
        title: format!("YouTube transcript: {}", transcript.video_id),
        url: Some(watch_url(&transcript.video_id)),
        snippet: full_text,
        provider: Provider::Transcript,
        metadata,
    }
}

/// Host of `url` without a leading `www.`.
fn display_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_owned).unwrap_or(host))
}
