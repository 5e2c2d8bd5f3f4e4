//! Configuration: XDG-resolved `config.toml`, defaults, and the built-in
//! system prompts.

pub mod config;
pub mod paths;
pub mod prompt;

pub use config::{
    ChatConfig, Config, ExecConfig, PromptLanguage, RepairConfig, SessionConfig,
};
pub use prompt::builtin_system_prompt;
