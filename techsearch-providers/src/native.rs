//! Provider-native response shapes.
//!
//! These mirror what each backing API returns, before normalisation.
//! Nothing outside this crate should see them.

use serde::{Deserialize, Serialize};

use crate::types::Provider;

/// What an adapter hands back from a successful fetch. One variant per provider.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeResponse {
    WebSearch(Vec<WebHit>),
    TextAnalysis(Completion),
    Transcript(Transcript),
}

impl NativeResponse {
    /// The provider whose shape this is.
    pub fn provider(&self) -> Provider {
        match self {
            Self::WebSearch(_) => Provider::WebSearch,
            Self::TextAnalysis(_) => Provider::TextAnalysis,
            Self::Transcript(_) => Provider::Transcript,
        }
    }
}

/// One ranked web search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// A single model answer with its usage accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub answer: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// A full caption track for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub video_id: String,
    pub language: Option<String>,
    pub segments: Vec<CaptionSegment>,
}

impl Transcript {
    /// Segment texts joined with single spaces.
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// End time of the last segment, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.start + s.duration)
            .fold(0.0, f64::max)
    }
}

/// One time-coded caption line.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSegment {
    /// Offset from the start of the video, in seconds.
    pub start: f64,
    pub duration: f64,
    pub text: String,
}
