//! Error taxonomy for API calls.
//!
//! # Layers
//! - Transport produces `Network` and `Timeout`
//! - The client turns non-2xx responses into `Http`
//! - Decoding failures become `Validation`
//! - Cancellation and deadlines produce `Cancelled`
//!
//! The retry layer never invents a new kind; it wraps the last failure in
//! `ClientError` together with the number of attempts made.

use std::time::Duration;
use thiserror::Error;

/// A classified failure of a single API call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset, or any other I/O problem.
    #[error("Network error: {0}")]
    Network(String),

    /// The attempt exceeded its deadline.
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", summarize_body(.body))]
    Http {
        status: u16,
        body: String,
        /// Parsed `Retry-After` header, if the server sent one.
        retry_after: Option<Duration>,
    },

    /// Cancelled by the caller or by the caller's deadline.
    #[error("Request cancelled")]
    Cancelled,

    /// The payload did not match the expected shape.
    #[error("Unexpected payload: {0}")]
    Validation(String),

    /// The request could not be built (bad URL, unserializable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of HTTP failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    Server,
    Client,
}

impl ApiError {
    /// Build an `Http` error from a status and raw body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            body: body.into(),
            retry_after: None,
        }
    }

    /// HTTP status code, if this is an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify an `Http` error by status. Other kinds have no class.
    pub fn class(&self) -> Option<ErrorClass> {
        let status = self.status()?;
        Some(match status {
            401 => ErrorClass::Unauthorized,
            403 => ErrorClass::Forbidden,
            404 => ErrorClass::NotFound,
            409 => ErrorClass::Conflict,
            422 => ErrorClass::Unprocessable,
            429 => ErrorClass::RateLimited,
            s if s >= 500 => ErrorClass::Server,
            _ => ErrorClass::Client,
        })
    }

    /// Server-provided message from a `{"message": ...}` body.
    pub fn message(&self) -> Option<String> {
        match self {
            ApiError::Http { body, .. } => extract_message(body),
            _ => None,
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) => Some(s.clone()),
        // NestJS validation pipes answer with an array of messages
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    }
}

fn summarize_body(body: &str) -> String {
    if let Some(message) = extract_message(body) {
        return message;
    }
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Terminal failure of a call, tagged with the number of transport attempts.
#[derive(Debug, Error)]
#[error("{kind} (attempts: {attempts})")]
pub struct ClientError {
    #[source]
    pub kind: ApiError,
    pub attempts: u32,
}

impl ClientError {
    pub fn new(kind: ApiError, attempts: u32) -> Self {
        Self { kind, attempts }
    }

    pub fn kind(&self) -> &ApiError {
        &self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }

    pub fn class(&self) -> Option<ErrorClass> {
        self.kind.class()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ApiError::Cancelled)
    }
}

/// Result type for client calls.
pub type ApiResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(ApiError::http(401, "").class(), Some(ErrorClass::Unauthorized));
        assert_eq!(ApiError::http(403, "").class(), Some(ErrorClass::Forbidden));
        assert_eq!(ApiError::http(404, "").class(), Some(ErrorClass::NotFound));
        assert_eq!(ApiError::http(409, "").class(), Some(ErrorClass::Conflict));
        assert_eq!(ApiError::http(422, "").class(), Some(ErrorClass::Unprocessable));
        assert_eq!(ApiError::http(429, "").class(), Some(ErrorClass::RateLimited));
        assert_eq!(ApiError::http(503, "").class(), Some(ErrorClass::Server));
        assert_eq!(ApiError::http(418, "").class(), Some(ErrorClass::Client));
        assert_eq!(ApiError::Network("refused".into()).class(), None);
    }

    #[test]
    fn test_server_message_extraction() {
        let err = ApiError::http(404, r#"{"message":"Conta não encontrada"}"#);
        assert_eq!(err.message().as_deref(), Some("Conta não encontrada"));
        assert_eq!(err.to_string(), "HTTP 404: Conta não encontrada");

        let err = ApiError::http(400, r#"{"message":["name is required","amount must be positive"]}"#);
        assert_eq!(
            err.message().as_deref(),
            Some("name is required; amount must be positive")
        );

        let err = ApiError::http(502, "<html>bad gateway</html>");
        assert!(err.message().is_none());
        assert_eq!(err.to_string(), "HTTP 502: <html>bad gateway</html>");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Request timed out after 1500ms");

        let err = ClientError::new(ApiError::http(503, ""), 3);
        assert_eq!(err.to_string(), "HTTP 503:  (attempts: 3)");
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_cancelled());
    }
}
