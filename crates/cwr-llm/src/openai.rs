//! Bridge for OpenAI-compatible `chat/completions` endpoints.
//!
//! OpenAI and Groq share this wire shape; they differ in base URL, key, and
//! in that Groq only accepts plain-string message content.

use serde_json::{Value, json};
use tracing::debug;

use cwr_core::{Content, CwrError, Provider, Role, Transcript};

use crate::http::{read_error, request_failed};
use crate::{ChatClient, ChatOptions};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    provider: Provider,
    base_url: String,
    api_key: String,
    model: String,
    options: ChatOptions,
    /// Groq rejects part-list content; flatten every turn to plain text.
    flatten_content: bool,
}

impl OpenAiCompatClient {
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: Provider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            options,
            flatten_content: false,
        }
    }

    pub fn groq(api_key: impl Into<String>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider: Provider::Groq,
            base_url: GROQ_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            options,
            flatten_content: true,
        }
    }

    /// Override the endpoint base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_messages(&self, transcript: &Transcript) -> Vec<Value> {
        transcript
            .iter()
            .map(|message| {
                let role = wire_role(message.role);
                let content = if self.flatten_content {
                    Value::String(message.content.as_text())
                } else {
                    content_parts(&message.content)
                };
                json!({"role": role, "content": content})
            })
            .collect()
    }

    fn build_body(&self, transcript: &Transcript) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.build_messages(transcript),
            "temperature": self.options.temperature,
            "max_tokens": self.options.max_tokens,
            "top_p": 1,
            "frequency_penalty": 0,
            "presence_penalty": 0,
        });
        if self.options.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User | Role::Environment => "user",
        Role::Assistant => "assistant",
    }
}

/// Plain-text content becomes a single text part; part lists already match
/// the OpenAI content-part schema and pass through as-is.
fn content_parts(content: &Content) -> Value {
    match content {
        Content::Text(text) => json!([{"type": "text", "text": text}]),
        Content::Parts(_) => serde_json::to_value(content).expect("content serializes"),
    }
}

fn parse_completion(provider: Provider, body: &Value) -> Result<String, CwrError> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CwrError::Api {
            provider,
            status: None,
            message: "missing choices[0].message.content in completion response".to_string(),
            retryable: false,
            retry_after: None,
        })
}

#[async_trait::async_trait]
impl ChatClient for OpenAiCompatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, transcript: &Transcript) -> Result<String, CwrError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(transcript);
        debug!(provider = %self.provider, model = %self.model, turns = transcript.len(), "chat request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| request_failed(self.provider, err))?;

        if !response.status().is_success() {
            return Err(read_error(self.provider, response).await);
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|err| request_failed(self.provider, err))?;

        parse_completion(self.provider, &parsed)
    }
}
