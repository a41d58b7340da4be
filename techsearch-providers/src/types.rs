//! Core types: provider tags, domain filters and the common result shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Provider-specific metadata attached to a [`SearchResult`].
///
/// The expected keys per provider are documented in [`crate::normalize::keys`].
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A single normalised result, whatever provider produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title.
    pub title: String,
    /// Source URL, when the provider has one (analysis results do not).
    pub url: Option<String>,
    /// Snippet or full body text. Never truncated by the normaliser.
    pub snippet: String,
    /// Which provider produced this result.
    pub provider: Provider,
    /// Provider-specific extras (token usage, segment counts, ...).
    #[serde(default)]
    pub metadata: Metadata,
}

impl SearchResult {
    /// Look up a metadata value as a string slice.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Look up a metadata value as an unsigned integer.
    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(|v| v.as_u64())
    }
}

/// The closed set of content providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Ranked web snippets (Tavily).
    WebSearch,
    /// LLM-synthesised analysis (Groq). Paid; never auto-selected.
    TextAnalysis,
    /// Time-coded video captions (YouTube).
    Transcript,
}

impl Provider {
    /// Stable slug used in cache rows, CLI flags and fingerprints.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::WebSearch => "web-search",
            Self::TextAnalysis => "text-analysis",
            Self::Transcript => "transcript",
        }
    }

    /// Name of the backing service.
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::WebSearch => "Tavily",
            Self::TextAnalysis => "Groq",
            Self::Transcript => "YouTube",
        }
    }

    /// Returns all provider variants in dispatch order.
    pub fn all() -> &'static [Provider] {
        &[Self::WebSearch, Self::TextAnalysis, Self::Transcript]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Provider {
    type Err = String;

    /// Accepts slugs and the backing service names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web-search" | "web" | "tavily" => Ok(Self::WebSearch),
            "text-analysis" | "analysis" | "groq" => Ok(Self::TextAnalysis),
            "transcript" | "youtube" => Ok(Self::Transcript),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Technology domains a query can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TechDomain {
    ArtificialIntelligence,
    MachineLearning,
    WebDevelopment,
    MobileDevelopment,
    CloudComputing,
    Cybersecurity,
    Blockchain,
    DataScience,
    Devops,
    ProgrammingLanguages,
}

impl TechDomain {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ArtificialIntelligence => "artificial-intelligence",
            Self::MachineLearning => "machine-learning",
            Self::WebDevelopment => "web-development",
            Self::MobileDevelopment => "mobile-development",
            Self::CloudComputing => "cloud-computing",
            Self::Cybersecurity => "cybersecurity",
            Self::Blockchain => "blockchain",
            Self::DataScience => "data-science",
            Self::Devops => "devops",
            Self::ProgrammingLanguages => "programming-languages",
        }
    }

    /// Human label, used as the scoping hint sent to providers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ArtificialIntelligence => "Artificial Intelligence",
            Self::MachineLearning => "Machine Learning",
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::CloudComputing => "Cloud Computing",
            Self::Cybersecurity => "Cybersecurity",
            Self::Blockchain => "Blockchain",
            Self::DataScience => "Data Science",
            Self::Devops => "DevOps",
            Self::ProgrammingLanguages => "Programming Languages",
        }
    }

    pub fn all() -> &'static [TechDomain] {
        &[
            Self::ArtificialIntelligence,
            Self::MachineLearning,
            Self::WebDevelopment,
            Self::MobileDevelopment,
            Self::CloudComputing,
            Self::Cybersecurity,
            Self::Blockchain,
            Self::DataScience,
            Self::Devops,
            Self::ProgrammingLanguages,
        ]
    }
}

impl fmt::Display for TechDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TechDomain {
    type Err = String;

    /// Accepts the slug or the label (`"DevOps"`, `"devops"`, `"Data Science"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Self::all()
            .iter()
            .copied()
            .find(|d| d.slug() == wanted)
            .ok_or_else(|| format!("unknown domain: {}", s.trim()))
    }
}
