use crate::types::Provider;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum CwrError {
    #[error("Unknown model '{0}': not in the supported catalog (see `cwr models`)")]
    UnknownModel(String),

    #[error("Missing API key for {provider}: set the {var} environment variable")]
    MissingApiKey { provider: Provider, var: String },

    #[error("Model reply is not a valid code reply: {preview}")]
    MalformedReply { preview: String },

    #[error("Unsupported snippet language '{0}': expected 'python' or 'sh'")]
    UnsupportedLanguage(String),

    #[error("Interpreter '{0}' is not installed or not in PATH")]
    InterpreterMissing(String),

    #[error("{provider} API request failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Api {
        provider: Provider,
        status: Option<u16>,
        message: String,
        /// Rate-limit / transient-failure classification. Informational only:
        /// no network-layer retry is performed.
        retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("Invalid session name '{0}': use a non-empty name without path separators")]
    InvalidSessionName(String),

    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Corrupt session history at {path}: {source}")]
    CorruptHistory {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
