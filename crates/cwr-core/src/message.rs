//! Conversation records: roles, message content, and the append-only
//! transcript persisted to `history.json`.

use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
///
/// `Environment` marks captured output of locally executed code, distinct
/// from user and assistant turns. Serialized as `"env"` in session files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(rename = "env")]
    Environment,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Environment => "env",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One part of a multi-part message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

/// URL wrapper for image parts. The URL is normally a base64 data URL built
/// from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Message body: either plain text or an ordered list of parts.
///
/// The untagged representation matches the session-file schema: a JSON
/// string, or a JSON array of `{type, ...}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<Part>),
}

impl Content {
    /// Concatenated text of all textual parts. Image parts are skipped.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text.as_str()),
                    Part::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Whether any part carries an image.
    pub fn has_images(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Parts(parts) => parts
                .iter()
                .any(|part| matches!(part, Part::ImageUrl { .. })),
        }
    }
}

/// A single conversation turn. Immutable once created; appended to the
/// transcript, persisted verbatim, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text(text.into()),
        }
    }

    pub fn environment(text: impl Into<String>) -> Self {
        Self {
            role: Role::Environment,
            content: Content::Text(text.into()),
        }
    }

    /// User turn carrying text plus attached images as data URLs.
    pub fn user_with_images(text: impl Into<String>, image_urls: Vec<String>) -> Self {
        let mut parts = vec![Part::Text { text: text.into() }];
        parts.extend(
            image_urls
                .into_iter()
                .map(|url| Part::ImageUrl {
                    image_url: ImageRef { url },
                }),
        );
        Self {
            role: Role::User,
            content: Content::Parts(parts),
        }
    }
}

/// Ordered, append-only conversation log for one session.
///
/// Reloaded wholesale from storage at session start, overwritten wholesale at
/// session end. The first message is the system prompt when created through
/// [`Transcript::new`]; the invariant is not otherwise enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Fresh transcript seeded with a system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Transcript from already-persisted messages, as-is.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The system prompt, when the log starts with one.
    pub fn system_prompt(&self) -> Option<&str> {
        match self.messages.first() {
            Some(Message {
                role: Role::System,
                content,
            }) => match content {
                Content::Text(text) => Some(text),
                Content::Parts(_) => None,
            },
            _ => None,
        }
    }

    /// Whether any user turn in the log already carries an image part.
    pub fn has_image_turn(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.role == Role::User && m.content.has_images())
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_env_as_short_form() {
        let json = serde_json::to_string(&Role::Environment).unwrap();
        assert_eq!(json, "\"env\"");
        let back: Role = serde_json::from_str("\"env\"").unwrap();
        assert_eq!(back, Role::Environment);
    }

    #[test]
    fn test_plain_text_message_wire_shape() {
        let msg = Message::user("hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"role": "user", "content": "hello"})
        );
    }

    #[test]
    fn test_image_message_wire_shape() {
        let msg = Message::user_with_images("read this", vec!["data:image/png;base64,AAA".into()]);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "read this"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAA"}}
                ]
            })
        );
    }

    #[test]
    fn test_content_roundtrip_string_stays_string() {
        let content: Content = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(content, Content::Text("plain".into()));
        assert_eq!(serde_json::to_string(&content).unwrap(), "\"plain\"");
    }

    #[test]
    fn test_as_text_skips_images() {
        let msg = Message::user_with_images("caption", vec!["data:image/png;base64,AAA".into()]);
        assert_eq!(msg.content.as_text(), "caption");
        assert!(msg.content.has_images());
    }

    #[test]
    fn test_transcript_new_seeds_system_prompt() {
        let transcript = Transcript::new("be helpful");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.system_prompt(), Some("be helpful"));
    }

    #[test]
    fn test_transcript_roundtrip_identity() {
        let mut transcript = Transcript::new("sys");
        transcript.push(Message::user("run something"));
        transcript.push(Message::assistant("{\"code\":\"echo hi\",\"language\":\"sh\"}"));
        transcript.push(Message::environment("hi\n"));

        let json = serde_json::to_string(&transcript).unwrap();
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transcript);
    }

    #[test]
    fn test_transcript_serializes_as_bare_array() {
        let transcript = Transcript::new("sys");
        let value = serde_json::to_value(&transcript).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_has_image_turn() {
        let mut transcript = Transcript::new("sys");
        assert!(!transcript.has_image_turn());
        transcript.push(Message::user_with_images("x", vec!["data:image/png;base64,A".into()]));
        assert!(transcript.has_image_turn());
    }
}
