//! Error types for OpenAI API operations.
//!
//! [`Error`] separates the failure modes a caller needs to tell apart:
//! - request construction (bad configuration, never sent)
//! - transport failure (no response at all)
//! - HTTP error responses, structured ([`ApiError`]) or not
//! - responses that arrived fine but did not decode
//! - mid-stream frame and connection failures

use serde::{Deserialize, Serialize};

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The structured error payload returned by the provider.
///
/// Sent as `{"error": {...}}`, either with a non-2xx status or, for some chat
/// deployments, embedded in a `200 OK` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Error category, e.g. `invalid_request_error`.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// The request parameter that caused the error, if any.
    #[serde(default)]
    pub param: Option<String>,
    /// Machine readable code, e.g. `invalid_api_key`.
    #[serde(default, deserialize_with = "code_as_string")]
    pub code: Option<String>,
}

/// Wire wrapper around [`ApiError`].
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    /// The payload.
    pub error: ApiError,
}

impl ApiErrorEnvelope {
    /// Attempts to read a structured error from a response body.
    pub(crate) fn parse(body: &[u8]) -> Option<ApiError> {
        serde_json::from_slice::<Self>(body).ok().map(|e| e.error)
    }
}

// Some gateways send numeric codes.
fn code_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Error type for every relay operation.
///
/// Each variant is one failure class, so callers can pattern-match instead of
/// inspecting messages.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be constructed. Nothing was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No response was received (DNS, TLS, timeout, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a structured error payload.
    ///
    /// `status` is `None` when the error arrived inside a successful response.
    #[error("API error{}: {}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default(), error.message)]
    Api {
        /// HTTP status code, if the error came with one.
        status: Option<u16>,
        /// Decoded error payload.
        error: ApiError,
    },

    /// Non-2xx response whose body was empty or not a structured error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response status was successful but the body did not match.
    #[error("Expected {expected}, got {message}")]
    Decode {
        /// Description of the expected shape.
        expected: String,
        /// Decoder message.
        message: String,
    },

    /// One event frame in a stream could not be decoded.
    ///
    /// The stream keeps going after this error.
    #[error("Malformed stream event: {0}")]
    StreamDecode(String),

    /// The streaming connection failed before the end-of-stream sentinel.
    #[error("Stream connection failed: {0}")]
    StreamTransport(String),

    /// A stream decoder was asked to connect while not idle.
    #[error("Stream decoder is already connected or completed")]
    StreamBusy,
}

impl Error {
    /// Create a request construction error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(expected: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            expected: expected.into(),
            message: message.into(),
        }
    }

    /// Create a stream frame decode error.
    #[must_use]
    pub fn stream_decode(message: impl Into<String>) -> Self {
        Self::StreamDecode(message.into())
    }

    /// Create a stream connection error.
    #[must_use]
    pub fn stream_transport(message: impl Into<String>) -> Self {
        Self::StreamTransport(message.into())
    }

    /// Classify a non-2xx response.
    ///
    /// The structured `{"error": {...}}` payload wins; anything else keeps the
    /// raw status and body.
    #[must_use]
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        ApiErrorEnvelope::parse(body).map_or_else(
            || Self::HttpStatus {
                status,
                body: String::from_utf8_lossy(body).into_owned(),
            },
            |error| Self::Api {
                status: Some(status),
                error,
            },
        )
    }

    /// HTTP status attached to this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The structured provider error, if one was decoded.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Check if this is a retryable error.
    ///
    /// The client itself never retries; this only classifies.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::StreamTransport(_) => true,
            Self::Api { .. } | Self::HttpStatus { .. } => {
                self.status().is_some_and(|s| s == 429 || s >= 500)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_builder() {
            Self::invalid_request(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod from_status {
        use super::*;

        #[test]
        fn structured_body_becomes_api_error() {
            let body = br#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;
            let err = Error::from_status(401, body);

            let Error::Api { status, error } = err else {
                panic!("expected Error::Api");
            };
            assert_eq!(status, Some(401));
            assert_eq!(error.message, "Incorrect API key provided");
            assert_eq!(error.error_type.as_deref(), Some("invalid_request_error"));
            assert!(error.param.is_none());
            assert_eq!(error.code.as_deref(), Some("invalid_api_key"));
        }

        #[test]
        fn empty_body_becomes_http_status() {
            let err = Error::from_status(500, b"");
            assert!(matches!(err, Error::HttpStatus { status: 500, ref body } if body.is_empty()));
            assert!(err.api_error().is_none());
        }

        #[test]
        fn html_body_is_kept_verbatim() {
            let err = Error::from_status(502, b"<html>Bad Gateway</html>");
            assert!(matches!(err, Error::HttpStatus { status: 502, ref body } if body.contains("Bad Gateway")));
        }

        #[test]
        fn numeric_code_is_stringified() {
            let body = br#"{"error":{"message":"slow down","type":"requests","code":429}}"#;
            let err = Error::from_status(429, body);
            assert_eq!(err.api_error().unwrap().code.as_deref(), Some("429"));
        }
    }

    mod retryable {
        use super::*;

        #[test]
        fn network_is_retryable() {
            assert!(Error::network("reset").is_retryable());
            assert!(Error::stream_transport("reset").is_retryable());
        }

        #[test]
        fn rate_limit_and_server_errors_are_retryable() {
            assert!(Error::from_status(429, b"").is_retryable());
            assert!(Error::from_status(503, b"").is_retryable());
        }

        #[test]
        fn client_errors_are_not() {
            assert!(!Error::from_status(401, b"").is_retryable());
            assert!(!Error::invalid_request("bad url").is_retryable());
            assert!(!Error::decode("json", "eof").is_retryable());
            assert!(!Error::StreamBusy.is_retryable());
        }
    }

    mod display {
        use super::*;

        #[test]
        fn api_error_with_status() {
            let err = Error::Api {
                status: Some(401),
                error: ApiError {
                    message: "bad key".into(),
                    ..ApiError::default()
                },
            };
            assert_eq!(err.to_string(), "API error (HTTP 401): bad key");
        }

        #[test]
        fn embedded_api_error_has_no_status() {
            let err = Error::Api {
                status: None,
                error: ApiError {
                    message: "overloaded".into(),
                    ..ApiError::default()
                },
            };
            assert_eq!(err.to_string(), "API error: overloaded");
            assert_eq!(err.status(), None);
        }

        #[test]
        fn decode_error() {
            let err = Error::decode("completion envelope", "missing field");
            assert!(err.to_string().contains("completion envelope"));
        }
    }
}
