//! Strict parsing of the model's structured code reply.
//!
//! The assistant is instructed to answer with a JSON object
//! `{"code": "...", "language": "python" | "sh"}` plus an optional free-text
//! `response` field. Parsing fails closed: anything that does not validate
//! against that schema aborts the interaction instead of being guessed at.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::CwrError;

const PREVIEW_MAX_CHARS: usize = 200;

/// Models often wrap the JSON object in a markdown code fence even when asked
/// not to. Tolerate exactly that wrapper, nothing else.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:json)?\s*(.*?)\s*```$").expect("fence regex is valid")
});

/// Snippet language tag accepted from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Sh,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Sh => "sh",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = CwrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Self::Python),
            "sh" => Ok(Self::Sh),
            other => Err(CwrError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Validated structured reply from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeReply {
    pub code: String,
    pub language: Language,
    /// Free-text commentary for the user, when the model supplies one.
    pub response: Option<String>,
}

#[derive(Deserialize)]
struct RawReply {
    code: String,
    language: String,
    #[serde(default)]
    response: Option<String>,
}

impl CodeReply {
    /// Parse a raw assistant reply into a validated code reply.
    ///
    /// A single surrounding markdown fence is stripped first. Malformed JSON
    /// and schema violations yield [`CwrError::MalformedReply`]; a language
    /// tag outside `python`/`sh` yields [`CwrError::UnsupportedLanguage`].
    pub fn parse(reply: &str) -> Result<Self, CwrError> {
        let stripped = strip_fence(reply);

        let raw: RawReply =
            serde_json::from_str(stripped).map_err(|_| CwrError::MalformedReply {
                preview: preview(reply),
            })?;

        let language: Language = raw.language.parse()?;

        Ok(Self {
            code: raw.code,
            language,
            response: raw.response,
        })
    }
}

fn strip_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match FENCE_RE.captures(trimmed) {
        Some(captures) => captures.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    }
}

fn preview(reply: &str) -> String {
    let trimmed = reply.trim();
    if trimmed.chars().nth(PREVIEW_MAX_CHARS).is_none() {
        trimmed.to_string()
    } else {
        let truncated: String = trimmed.chars().take(PREVIEW_MAX_CHARS - 3).collect();
        format!("{}...", truncated)
    }
}
