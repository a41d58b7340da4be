//! Provider configuration with sensible defaults.
//!
//! [`ProviderConfig`] carries credentials, endpoints and the per-adapter
//! timeout. Credentials are supplied by the caller; nothing in this crate
//! reads the environment.

use crate::error::ConfigError;
use crate::types::Provider;

/// Default Tavily endpoint root.
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
/// Default Groq endpoint root (OpenAI-compatible API lives under `/openai/v1`).
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com";
/// Default model for analysis requests.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
/// Default YouTube root for watch pages.
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// Web search (Tavily) settings.
#[derive(Debug, Clone)]
pub struct WebSearchSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    /// `basic` or `advanced`.
    pub search_depth: String,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_TAVILY_BASE_URL.to_owned(),
            search_depth: "basic".to_owned(),
        }
    }
}

/// Text analysis (Groq chat completions) settings.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GROQ_BASE_URL.to_owned(),
            model: DEFAULT_GROQ_MODEL.to_owned(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }
}

/// Transcript (YouTube captions) settings. No credential required.
#[derive(Debug, Clone)]
pub struct TranscriptSettings {
    pub base_url: String,
    /// Caption languages in order of preference.
    pub languages: Vec<String>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_YOUTUBE_BASE_URL.to_owned(),
            languages: vec!["en".to_owned()],
        }
    }
}

/// Configuration for all three adapters.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Per-adapter timeout in seconds, applied to each fetch independently.
    pub timeout_seconds: u64,
    /// Custom User-Agent for page fetches. If `None`, rotates through a
    /// built-in list of browser User-Agents.
    pub user_agent: Option<String>,
    pub web: WebSearchSettings,
    pub analysis: AnalysisSettings,
    pub transcript: TranscriptSettings,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 20,
            user_agent: None,
            web: WebSearchSettings::default(),
            analysis: AnalysisSettings::default(),
            transcript: TranscriptSettings::default(),
        }
    }
}

impl ProviderConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - every base URL must be non-empty
    /// - the analysis model must be named
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        for (name, url) in [
            ("web.base_url", &self.web.base_url),
            ("analysis.base_url", &self.analysis.base_url),
            ("transcript.base_url", &self.transcript.base_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError(format!("{name} must not be empty")));
            }
        }
        if self.analysis.model.trim().is_empty() {
            return Err(ConfigError(
                "analysis.model must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether the credential a provider needs is present.
    pub fn has_credentials(&self, provider: Provider) -> bool {
        match provider {
            Provider::WebSearch => usable_key(self.web.api_key.as_deref()).is_some(),
            Provider::TextAnalysis => usable_key(self.analysis.api_key.as_deref()).is_some(),
            Provider::Transcript => true,
        }
    }
}

/// Returns the key unless it is blank or an unedited `your_...` placeholder.
pub fn usable_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && !k.starts_with("your_"))
}
