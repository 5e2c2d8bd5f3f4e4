use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;
use crate::prompt::builtin_system_prompt;

/// Language of the built-in system prompt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub repair: RepairConfig,
    pub exec: ExecConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Default model identifier, overridable per invocation with `--model`.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request JSON-object responses from providers that support it.
    pub json_mode: bool,
    /// Override for the system prompt. Empty selects the built-in coding
    /// prompt in `language`.
    pub system_prompt: String,
    pub language: PromptLanguage,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 8192,
            json_mode: true,
            system_prompt: String::new(),
            language: PromptLanguage::En,
        }
    }
}

impl ChatConfig {
    /// Effective system prompt: the override when set, the built-in prompt
    /// otherwise.
    pub fn effective_system_prompt(&self) -> String {
        if self.system_prompt.trim().is_empty() {
            builtin_system_prompt(self.language)
        } else {
            self.system_prompt.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Maximum model-call/execute/repair cycles per user request.
    pub max_attempts: u32,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Wall-clock limit for one snippet. 0 disables the limit.
    pub timeout_seconds: u64,
    /// Master switch for local execution. When false, `cwr ask` behaves as if
    /// `--no-exec` were always passed.
    pub enabled: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 300,
            enabled: true,
        }
    }
}

impl ExecConfig {
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_seconds > 0).then(|| std::time::Duration::from_secs(self.timeout_seconds))
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Root directory for session storage. Empty selects the XDG state dir.
    pub root: String,
}

impl SessionConfig {
    pub fn sessions_root(&self) -> PathBuf {
        if self.root.trim().is_empty() {
            paths::default_sessions_root()
        } else {
            PathBuf::from(&self.root)
        }
    }
}

impl Config {
    /// Load the global config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        match paths::config_file() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a config file from an explicit path. A missing file is an error
    /// here; a malformed file always is.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
