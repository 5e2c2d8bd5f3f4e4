use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CwrError;

/// Model identifiers served by the OpenAI bridge.
pub const OPENAI_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o"];

/// Model identifiers served by the Google bridge.
pub const GOOGLE_MODELS: &[&str] = &["gemini-1.5-pro-latest", "gemini-1.5-flash"];

/// Model identifiers served by the Groq bridge.
pub const GROQ_MODELS: &[&str] = &[
    "gemma2-9b-it",
    "llama3-groq-70b-8192-tool-use-preview",
    "llama3-groq-8b-8192-tool-use-preview",
];

/// Model identifiers served by the Anthropic bridge.
pub const ANTHROPIC_MODELS: &[&str] = &["claude-3-5-sonnet-20240620"];

/// Vendor family a model identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Google,
    Groq,
    Anthropic,
}

impl Provider {
    /// Resolve a model identifier against the fixed catalog.
    ///
    /// Unknown identifiers are rejected here, before any request is built.
    pub fn for_model(model: &str) -> Result<Self, CwrError> {
        if OPENAI_MODELS.contains(&model) {
            Ok(Self::OpenAi)
        } else if GOOGLE_MODELS.contains(&model) {
            Ok(Self::Google)
        } else if GROQ_MODELS.contains(&model) {
            Ok(Self::Groq)
        } else if ANTHROPIC_MODELS.contains(&model) {
            Ok(Self::Anthropic)
        } else {
            Err(CwrError::UnknownModel(model.to_string()))
        }
    }

    /// Models this provider serves, in catalog order.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => OPENAI_MODELS,
            Self::Google => GOOGLE_MODELS,
            Self::Groq => GROQ_MODELS,
            Self::Anthropic => ANTHROPIC_MODELS,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Google => "GOOGLE_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Google => "google",
            Self::Groq => "groq",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Every model identifier in the catalog, grouped by provider order.
pub fn all_models() -> Vec<&'static str> {
    OPENAI_MODELS
        .iter()
        .chain(GOOGLE_MODELS)
        .chain(GROQ_MODELS)
        .chain(ANTHROPIC_MODELS)
        .copied()
        .collect()
}

/// Output format for CLI responses
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
