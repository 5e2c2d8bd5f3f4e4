//! Bridge for the Google Generative Language `generateContent` endpoint.
//!
//! The system message is lifted into `system_instruction`; user and
//! environment turns map to `user` parts, assistant turns to `model` parts.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use cwr_core::{CwrError, Provider, Role, Transcript};

use crate::http::{read_error, request_failed};
use crate::{ChatClient, ChatOptions};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
pub struct GoogleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    options: ChatOptions,
}

impl GoogleClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            options,
        }
    }

    /// Override the endpoint base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_body(&self, transcript: &Transcript) -> Value {
        let mut contents = Vec::new();
        for (index, message) in transcript.iter().enumerate() {
            // The leading system message becomes system_instruction below.
            if index == 0 && message.role == Role::System {
                continue;
            }
            let role = match message.role {
                Role::Assistant => "model",
                Role::System | Role::User | Role::Environment => "user",
            };
            contents.push(json!({
                "role": role,
                "parts": [{"text": message.content.as_text()}],
            }));
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": self.options.temperature,
                "topP": 0.95,
                "topK": 64,
                "maxOutputTokens": self.options.max_tokens,
                "responseMimeType": "text/plain",
            },
        });

        if let Some(system) = transcript.system_prompt() {
            body["system_instruction"] = json!({"parts": [{"text": system}]});
        }

        body
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, CwrError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CwrError::Api {
            provider: Provider::Google,
            status: None,
            message: "generateContent response contained no candidate text".to_string(),
            retryable: false,
            retry_after: None,
        });
    }
    Ok(text)
}

#[async_trait::async_trait]
impl ChatClient for GoogleClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, transcript: &Transcript) -> Result<String, CwrError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = self.build_body(transcript);
        debug!(model = %self.model, turns = transcript.len(), "generateContent request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| request_failed(Provider::Google, err))?;

        if !response.status().is_success() {
            return Err(read_error(Provider::Google, response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| request_failed(Provider::Google, err))?;

        extract_text(parsed)
    }
}
