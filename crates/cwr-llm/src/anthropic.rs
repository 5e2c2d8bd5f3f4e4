//! Bridge for the Anthropic Messages API.
//!
//! The system prompt is lifted out of the message array into the `system`
//! field; the endpoint requires the transcript to start with one. Messages
//! must alternate user/assistant, so consecutive same-role turns (user
//! request followed by an environment report, say) are merged into one
//! message with multiple content blocks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use cwr_core::{Content, CwrError, Part, Provider, Role, Transcript};

use crate::http::{read_error, request_failed};
use crate::{ChatClient, ChatOptions};

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    options: ChatOptions,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            options,
        }
    }

    /// Override the endpoint URL (tests, proxies).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn build_request(&self, transcript: &Transcript) -> Result<CreateMessageRequest, CwrError> {
        let system = transcript.system_prompt().ok_or_else(|| CwrError::Api {
            provider: Provider::Anthropic,
            status: None,
            message: "the first message must be a system message".to_string(),
            retryable: false,
            retry_after: None,
        })?;

        let mut messages: Vec<WireMessage> = Vec::new();
        for message in transcript.iter().skip(1) {
            let role = match message.role {
                Role::Assistant => "assistant",
                Role::User | Role::Environment => "user",
                Role::System => continue,
            };
            let blocks = content_blocks(&message.content);
            if blocks.is_empty() {
                continue;
            }
            match messages.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => messages.push(WireMessage {
                    role,
                    content: blocks,
                }),
            }
        }

        Ok(CreateMessageRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
            system: system.to_string(),
        })
    }
}

fn content_blocks(content: &Content) -> Vec<ContentBlock> {
    match content {
        Content::Text(text) => vec![ContentBlock::Text { text: text.clone() }],
        Content::Parts(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(ContentBlock::Text { text: text.clone() }),
                Part::ImageUrl { image_url } => data_url_to_image_block(&image_url.url),
            })
            .collect(),
    }
}

/// Convert a `data:<media>;base64,<data>` URL into an Anthropic image
/// source block. Non-data URLs are dropped: the Messages API does not fetch
/// remote images.
fn data_url_to_image_block(url: &str) -> Option<ContentBlock> {
    let rest = url.strip_prefix("data:")?;
    let (media_type, data) = rest.split_once(";base64,")?;
    Some(ContentBlock::Image {
        source: ImageSource {
            r#type: "base64".to_string(),
            media_type: media_type.to_string(),
            data: data.to_string(),
        },
    })
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
    system: String,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Serialize)]
struct ImageSource {
    r#type: String,
    media_type: String,
    data: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

fn extract_text(response: CreateMessageResponse) -> Result<String, CwrError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .ok_or_else(|| CwrError::Api {
            provider: Provider::Anthropic,
            status: None,
            message: "response contained no text content block".to_string(),
            retryable: false,
            retry_after: None,
        })
}

#[async_trait::async_trait]
impl ChatClient for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, transcript: &Transcript) -> Result<String, CwrError> {
        let request = self.build_request(transcript)?;
        debug!(model = %self.model, turns = transcript.len(), "messages request");

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|err| request_failed(Provider::Anthropic, err))?;

        if !response.status().is_success() {
            return Err(read_error(Provider::Anthropic, response).await);
        }

        let parsed: CreateMessageResponse = response
            .json()
            .await
            .map_err(|err| request_failed(Provider::Anthropic, err))?;

        extract_text(parsed)
    }
}
