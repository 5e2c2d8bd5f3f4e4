//! Shared HTTP error mapping for the vendor bridges.
//!
//! Rate-limit and transient-failure classification is informational only:
//! transient vendor failures are never retried at this layer, the flag and
//! any `Retry-After` delay are just surfaced in the error.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use tracing::debug;

use cwr_core::{CwrError, Provider};

/// Error for a request that never produced a response.
pub(crate) fn request_failed(provider: Provider, err: reqwest::Error) -> CwrError {
    CwrError::Api {
        provider,
        status: None,
        message: err.to_string(),
        retryable: err.is_connect() || err.is_timeout(),
        retry_after: None,
    }
}

/// Map a non-success response to a typed API error, consuming the body.
pub(crate) async fn read_error(provider: Provider, response: reqwest::Response) -> CwrError {
    let status = response.status();
    let retry_after = parse_retry_after(response.headers());
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());

    let message = extract_error_message(&body).unwrap_or(body);
    let retryable = is_retryable(status);

    debug!(%provider, status = status.as_u16(), retryable, "api error response");

    CwrError::Api {
        provider,
        status: Some(status.as_u16()),
        message,
        retryable,
        retry_after,
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// All four vendors wrap errors as `{"error": {"message": ...}}` or
/// `{"error": "..."}`; fall back to the raw body otherwise.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    if let Some(message) = error.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }
    error.as_str().map(str::to_string)
}

/// Parse `Retry-After` as delta-seconds or an HTTP date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let retry_at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    let seconds = (retry_at - Utc::now()).num_seconds().max(0) as u64;
    Some(Duration::from_secs(seconds))
}
