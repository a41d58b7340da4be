//! Configuration for the search service and CLI.
//!
//! Loaded from `config.toml` (see [`AppConfig::default_config_path`]) with
//! environment overrides for credentials and the cache TTL.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use techsearch_providers::config::{
    DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, DEFAULT_TAVILY_BASE_URL, DEFAULT_YOUTUBE_BASE_URL,
    usable_key,
};
use techsearch_providers::{DEFAULT_LIMIT, Provider, ProviderConfig};

use crate::error::{Result, ServiceError};

/// Environment variable names consulted by [`AppConfig::apply_env_overrides`].
pub mod env {
    pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";
    pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
    pub const GROQ_MODEL: &str = "GROQ_MODEL";
    pub const CACHE_TTL: &str = "TECHSEARCH_CACHE_TTL";
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
}

/// Result cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum age of a cache entry in seconds (default 24h).
    pub ttl_seconds: u64,
    /// Database file. `None` = `{data_dir}/cache.db`.
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 86_400,
            path: None,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result limit when the caller does not give one.
    pub default_limit: usize,
    /// Per-provider timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            timeout_seconds: 20,
        }
    }
}

/// Provider credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub tavily_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub tavily_base_url: String,
    pub groq_base_url: String,
    pub youtube_base_url: String,
    /// Caption languages in order of preference.
    pub transcript_languages: Vec<String>,
    /// Tavily `search_depth`: `basic` or `advanced`.
    pub search_depth: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            groq_api_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_owned(),
            tavily_base_url: DEFAULT_TAVILY_BASE_URL.to_owned(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_owned(),
            youtube_base_url: DEFAULT_YOUTUBE_BASE_URL.to_owned(),
            transcript_languages: vec!["en".to_owned()],
            search_depth: "basic".to_owned(),
        }
    }
}

/// Logging settings for the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write a daily rolling log under `{data_dir}/logs`.
    pub file: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
}

/// Whether a provider can be used with the current credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub provider: Provider,
    pub available: bool,
    /// Why the provider is unavailable.
    pub reason: Option<String>,
}

/// Credential availability for every provider.
///
/// Transcripts need no key and are always available.
pub fn provider_status(config: &ProviderConfig) -> Vec<ProviderStatus> {
    Provider::all()
        .iter()
        .map(|&provider| {
            let available = config.has_credentials(provider);
            let reason = (!available).then(|| match provider {
                Provider::WebSearch => format!("{} not configured", env::TAVILY_API_KEY),
                Provider::TextAnalysis => format!("{} not configured", env::GROQ_API_KEY),
                Provider::Transcript => "unavailable".to_owned(),
            });
            ProviderStatus {
                provider,
                available,
                reason,
            }
        })
        .collect()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `{config_dir}/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::app_dirs::config_file()
    }

    /// Load `path` (which must exist), or the default path if present, or
    /// defaults. Environment overrides are applied and the result validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be parsed, an override
    /// is malformed, or validation fails.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!(path = %default_path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if `TECHSEARCH_CACHE_TTL` is not a number.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the TTL override is not a number.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(env::TAVILY_API_KEY) {
            self.providers.tavily_api_key = Some(key);
        }
        if let Some(key) = get(env::GROQ_API_KEY) {
            self.providers.groq_api_key = Some(key);
        }
        if let Some(model) = get(env::GROQ_MODEL) {
            self.providers.groq_model = model;
        }
        if let Some(ttl) = get(env::CACHE_TTL) {
            self.cache.ttl_seconds = ttl.trim().parse().map_err(|_| {
                ServiceError::Config(format!("{} must be a number of seconds, got {ttl:?}", env::CACHE_TTL))
            })?;
        }
        Ok(())
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `cache.ttl_seconds` must be greater than 0
    /// - `search.default_limit` must be greater than 0
    /// - provider settings pass [`ProviderConfig::validate`]
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_seconds == 0 {
            return Err(ServiceError::Config(
                "cache.ttl_seconds must be greater than 0".into(),
            ));
        }
        if self.search.default_limit == 0 {
            return Err(ServiceError::Config(
                "search.default_limit must be greater than 0".into(),
            ));
        }
        self.provider_config().validate()?;
        Ok(())
    }

    /// Cache database path.
    pub fn cache_path(&self) -> PathBuf {
        self.cache
            .path
            .clone()
            .unwrap_or_else(crate::app_dirs::cache_db_file)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    /// Settings handed to the provider adapters.
    pub fn provider_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig {
            timeout_seconds: self.search.timeout_seconds,
            ..ProviderConfig::default()
        };
        config.web.api_key = self.providers.tavily_api_key.clone();
        config.web.base_url = self.providers.tavily_base_url.clone();
        config.web.search_depth = self.providers.search_depth.clone();
        config.analysis.api_key = self.providers.groq_api_key.clone();
        config.analysis.base_url = self.providers.groq_base_url.clone();
        config.analysis.model = self.providers.groq_model.clone();
        config.transcript.base_url = self.providers.youtube_base_url.clone();
        config.transcript.languages = self.providers.transcript_languages.clone();
        config
    }

    /// Per-provider credential availability.
    pub fn credential_status(&self) -> Vec<ProviderStatus> {
        provider_status(&self.provider_config())
    }

    /// `true` if at least one keyed provider is configured.
    pub fn has_any_api_key(&self) -> bool {
        usable_key(self.providers.tavily_api_key.as_deref()).is_some()
            || usable_key(self.providers.groq_api_key.as_deref()).is_some()
    }
}
