//! Client error types.
//!
//! Every non-2xx response from the service is mapped onto exactly one
//! [`Error`] variant by [`map_error`]. The variant tells the caller what
//! happened (bad key, out of credits, rate limited, ...); the attached
//! [`ApiError`] carries what the server said about it.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Retry hint applied to rate limit errors when the server sends none.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Fields shared by every error the service can report.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Server request id, empty when the server did not send one.
    pub request_id: String,
    /// Extra structured information, passed through untouched.
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}, code {})", self.message, self.status, self.code)?;
        if !self.request_id.is_empty() {
            write!(f, " [request {}]", self.request_id)?;
        }
        Ok(())
    }
}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// API key missing, revoked or invalid (401).
    #[error("authentication failed: {0}")]
    Auth(ApiError),

    /// The account has no credits left (402).
    #[error("credits exhausted: {0}")]
    Credit(ApiError),

    /// Too many requests (429).
    #[error("rate limited: {error}, retry after {retry_after}s")]
    RateLimit {
        /// Server-reported error.
        error: ApiError,
        /// Seconds to wait before trying again.
        retry_after: u64,
    },

    /// The request was rejected as malformed (400).
    #[error("invalid input: {0}")]
    Validation(ApiError),

    /// The service could not parse the message (422).
    #[error("parse failed: {0}")]
    Parse(ApiError),

    /// Unknown session or resource (404).
    #[error("not found: {0}")]
    NotFound(ApiError),

    /// The session has already been ended (409).
    #[error("session ended: {0}")]
    SessionEnded(ApiError),

    /// The request did not complete within the configured timeout (504).
    #[error("timed out: {0}")]
    Timeout(ApiError),

    /// Any other failure reported by the service.
    #[error("server error: {0}")]
    Server(ApiError),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced an HTTP response (connection, DNS, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Discriminant of [`Error`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Credit,
    RateLimit,
    Validation,
    Parse,
    NotFound,
    SessionEnded,
    Timeout,
    Server,
    Config,
    InvalidUrl,
    Http,
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::Auth,
            Error::Credit(_) => ErrorKind::Credit,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Parse(_) => ErrorKind::Parse,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::SessionEnded(_) => ErrorKind::SessionEnded,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Server(_) => ErrorKind::Server,
            Error::Config(_) => ErrorKind::Config,
            Error::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Error::Http(_) => ErrorKind::Http,
        }
    }

    /// The server-reported fields, for errors that came from (or stand in
    /// for) an HTTP response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Auth(e)
            | Error::Credit(e)
            | Error::RateLimit { error: e, .. }
            | Error::Validation(e)
            | Error::Parse(e)
            | Error::NotFound(e)
            | Error::SessionEnded(e)
            | Error::Timeout(e)
            | Error::Server(e) => Some(e),
            Error::Config(_) | Error::InvalidUrl(_) | Error::Http(_) => None,
        }
    }

    /// HTTP status carried by the error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            other => other.api_error().map(|e| e.status),
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> Option<&str> {
        self.api_error().map(|e| e.code.as_str())
    }

    /// Server request id, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.api_error()
            .map(|e| e.request_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// How long to wait before retrying a rate-limited call.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. } => Some(Duration::from_secs(*retry_after)),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }

    /// Check if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error response body sent by the service.
///
/// Every field is optional: whatever is missing or has an unexpected type
/// falls back to the defaults of the status it is mapped under.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<ErrorDetail>,
}

/// The `error` object inside an [`ErrorBody`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<u16>,
    #[serde(default, deserialize_with = "lenient")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub details: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Accept any JSON for a field, keeping it only if it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl ErrorBody {
    /// Read an error body out of any JSON value. Fields of the wrong type
    /// are dropped one by one; a value that is not an object yields an
    /// empty body.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// A body carrying only a message, used when the server's own body is
    /// unreadable.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorDetail {
                message: Some(message.into()),
                ..Default::default()
            }),
        }
    }

    /// A body carrying a code and a message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorDetail {
                code: Some(code.into()),
                message: Some(message.into()),
                ..Default::default()
            }),
        }
    }
}

/// Map an HTTP status and error body onto a typed [`Error`].
///
/// Total over all statuses: anything not listed below becomes
/// [`Error::Server`], whose status may be overridden by `error.status` in
/// the body.
pub fn map_error(status: u16, body: &ErrorBody, retry_after: Option<u64>) -> Error {
    let api = |status: u16, code: &str, message: &str| build_api_error(status, body, code, message);

    match status {
        401 => Error::Auth(api(401, "invalid_api_key", "Invalid or revoked API key.")),
        402 => Error::Credit(api(402, "credits_exhausted", "Credits exhausted.")),
        429 => Error::RateLimit {
            error: api(429, "rate_limited", "Rate limit exceeded."),
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        400 => Error::Validation(api(400, "invalid_input", "Invalid input.")),
        422 => Error::Parse(api(422, "parse_failed", "Parse failed.")),
        404 => Error::NotFound(api(404, "session_not_found", "Session not found.")),
        409 => Error::SessionEnded(api(409, "session_ended", "Session already ended.")),
        504 => Error::Timeout(api(504, "timeout", "Request timed out.")),
        other => {
            let status = body
                .error
                .as_ref()
                .and_then(|e| e.status)
                .unwrap_or(other);
            Error::Server(api(status, "internal_error", "Internal server error."))
        }
    }
}

fn build_api_error(status: u16, body: &ErrorBody, code: &str, message: &str) -> ApiError {
    let detail = body.error.as_ref();
    ApiError {
        status,
        code: detail
            .and_then(|e| e.code.clone())
            .unwrap_or_else(|| code.to_string()),
        message: detail
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| message.to_string()),
        request_id: detail
            .and_then(|e| e.request_id.clone())
            .unwrap_or_default(),
        details: detail.and_then(|e| e.details.clone()),
    }
}

/// Parse a `Retry-After` header value given in seconds.
///
/// Reads the leading run of digits, so `"12abc"` is 12 and `"1.5"` is 1.
/// Values with no leading digits (HTTP dates, negatives) yield `None`.
pub(crate) fn parse_retry_after(value: &str) -> Option<u64> {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse::<u64>().ok()
}
