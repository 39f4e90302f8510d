// src/error.rs

//! Unified error handling for the content client.
//!
//! Transport failures are produced as closed variants at the HTTP boundary
//! (`Network`, `Timeout`, `Http`), so callers classify them with
//! [`AppError::kind`] instead of inspecting messages.

use std::fmt;

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Connection could not be established or was dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    /// Transport gave up waiting without reporting its deadline
    #[error("Request to {path} timed out")]
    TransportTimeout { path: String },

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        correlation_id: Option<String>,
    },

    /// Missing or malformed input, raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(String),
}

/// User-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Authentication,
    Authorization,
    NotFound,
    RateLimit,
    Server,
    Client,
    Unknown,
}

impl ErrorKind {
    /// Stable identifier used in telemetry.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Server => "server",
            ErrorKind::Client => "client",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Human-readable message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Network => "Unable to connect. Please check your internet connection.",
            ErrorKind::Timeout => "The request took too long. Please try again.",
            ErrorKind::Validation => "Some of the provided information is invalid.",
            ErrorKind::Authentication => "Please sign in to continue.",
            ErrorKind::Authorization => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested content could not be found.",
            ErrorKind::RateLimit => "Too many requests. Please wait a moment and try again.",
            ErrorKind::Server => "The server encountered an error. Please try again later.",
            ErrorKind::Client => "The request could not be processed.",
            ErrorKind::Unknown => "An unexpected error occurred.",
        }
    }

    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            429 => ErrorKind::RateLimit,
            500..=599 => ErrorKind::Server,
            400..=499 => ErrorKind::Client,
            _ => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Create a network error.
    pub fn network(message: impl fmt::Display) -> Self {
        Self::Network(message.to_string())
    }

    /// Create a timeout error for a request path.
    pub fn timeout(path: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            path: path.into(),
            timeout_ms,
        }
    }

    /// Create a timeout error when the elapsed deadline is unknown.
    pub fn transport_timeout(path: impl Into<String>) -> Self {
        Self::TransportTimeout { path: path.into() }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            correlation_id: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a decode error.
    pub fn decode(message: impl fmt::Display) -> Self {
        Self::Decode(message.to_string())
    }

    /// Classify this error into a user-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Network(_) => ErrorKind::Network,
            AppError::Timeout { .. } | AppError::TransportTimeout { .. } => ErrorKind::Timeout,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Http { status, .. } => ErrorKind::from_status(*status),
            AppError::Decode(_) | AppError::Config(_) | AppError::Io(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status code, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Server
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(e: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {e}"))
    }
}

impl From<serde_urlencoded::ser::Error> for AppError {
    fn from(e: serde_urlencoded::ser::Error) -> Self {
        Self::Validation(format!("unencodable query parameters: {e}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            let path = e.url().map(|u| u.path().to_string()).unwrap_or_default();
            return Self::transport_timeout(path);
        }
        if e.is_decode() {
            return Self::decode(e);
        }
        if let Some(status) = e.status() {
            return Self::http(status.as_u16(), e.to_string());
        }
        Self::network(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(AppError::http(401, "x").kind(), ErrorKind::Authentication);
        assert_eq!(AppError::http(403, "x").kind(), ErrorKind::Authorization);
        assert_eq!(AppError::http(404, "x").kind(), ErrorKind::NotFound);
        assert_eq!(AppError::http(429, "x").kind(), ErrorKind::RateLimit);
        assert_eq!(AppError::http(503, "x").kind(), ErrorKind::Server);
        assert_eq!(AppError::http(422, "x").kind(), ErrorKind::Client);
        assert_eq!(AppError::http(302, "x").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_transport_classification() {
        assert_eq!(AppError::network("reset").kind(), ErrorKind::Network);
        assert_eq!(AppError::timeout("/api", 100).kind(), ErrorKind::Timeout);
        assert_eq!(AppError::validation("slug").kind(), ErrorKind::Validation);
        assert_eq!(AppError::decode("eof").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::network("reset").is_retryable());
        assert!(AppError::timeout("/api", 100).is_retryable());
        assert!(AppError::http(502, "bad gateway").is_retryable());
        assert!(!AppError::http(404, "missing").is_retryable());
        assert!(!AppError::validation("slug").is_retryable());
    }

    #[test]
    fn test_transport_timeout_omits_duration() {
        let err = AppError::transport_timeout("/api/v1/events");
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Request to /api/v1/events timed out");
    }

    #[test]
    fn test_http_display_is_backend_message() {
        let err = AppError::http(500, "Failed to fetch events");
        assert_eq!(err.to_string(), "Failed to fetch events");
    }
}
