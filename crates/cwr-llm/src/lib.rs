//! Model dispatch: resolve a model identifier to one of four vendor HTTP
//! bridges, each translating the conversation log into that vendor's wire
//! shape.

use async_trait::async_trait;

use cwr_core::{CwrError, Provider, Transcript};

mod anthropic;
mod google;
mod http;
mod mock;
mod openai;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use mock::MockChatClient;
pub use openai::OpenAiCompatClient;

/// Request knobs shared by every bridge, sourced from config.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask for a JSON-object response where the vendor supports it
    /// (OpenAI-compatible endpoints only).
    pub json_mode: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 8192,
            json_mode: true,
        }
    }
}

/// One chat completion round-trip against a hosted model.
#[async_trait]
pub trait ChatClient: Send + Sync + std::fmt::Debug {
    /// The model identifier this client was built for.
    fn model(&self) -> &str;

    /// Send the whole transcript and return the assistant's raw reply text.
    async fn complete(&self, transcript: &Transcript) -> Result<String, CwrError>;
}

/// Resolve a model identifier to a ready client.
///
/// Unknown models are rejected before any key lookup; a missing API key is a
/// typed error naming the environment variable.
pub fn client_for_model(
    model: &str,
    options: ChatOptions,
) -> Result<Box<dyn ChatClient>, CwrError> {
    let provider = Provider::for_model(model)?;
    let api_key = api_key_from_env(provider)?;

    Ok(match provider {
        Provider::OpenAi => Box::new(OpenAiCompatClient::openai(api_key, model, options)),
        Provider::Groq => Box::new(OpenAiCompatClient::groq(api_key, model, options)),
        Provider::Google => Box::new(GoogleClient::new(api_key, model, options)),
        Provider::Anthropic => Box::new(AnthropicClient::new(api_key, model, options)),
    })
}

fn api_key_from_env(provider: Provider) -> Result<String, CwrError> {
    let var = provider.api_key_var();
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CwrError::MissingApiKey {
            provider,
            var: var.to_string(),
        })
}
