use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `openmotics-api` crate.
///
/// Covers every failure mode of both API surfaces: transport, HTTP status,
/// gateway authentication, and response validation. Only [`Error::Connection`]
/// is considered transient by the retry layer.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The call did not complete within the configured request timeout.
    #[error("Timeout occurred while connecting to OpenMotics API (after {timeout_secs}s)")]
    ConnectionTimeout { timeout_secs: u64 },

    /// Socket, DNS, or protocol failure while talking to the API.
    #[error("Error occurred while communicating with OpenMotics API: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Request could not be built, or redirect handling or body decoding
    /// failed. Never retried.
    #[error("Request to OpenMotics API failed: {message}")]
    Request {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response from the cloud API. Never retried.
    #[error("HTTP status {status} returned by OpenMotics API")]
    HttpStatus {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client construction or certificate loading failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// Gateway rejected the session token or login credentials,
    /// or the OAuth2 token endpoint refused the client credentials.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body did not match the expected shape.
    #[error("Validation error: {message}")]
    Validation { message: String, body: String },

    /// An installation-scoped call was made before an installation id was set.
    #[error("No installation id configured -- call set_installation_id first")]
    MissingInstallationId,
}

impl Error {
    /// Translate a `reqwest::Error` into the crate taxonomy.
    ///
    /// `timeout` is the per-call timeout, reported back on
    /// [`Error::ConnectionTimeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return Self::ConnectionTimeout {
                timeout_secs: timeout.as_secs(),
            };
        }
        if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            return Self::HttpStatus {
                status,
                source: err,
            };
        }
        if err.is_connect() || err.is_request() || err.is_body() {
            return Self::Connection {
                message: err.to_string(),
                source: Some(err),
            };
        }
        Self::Request {
            message: err.to_string(),
            source: err,
        }
    }

    pub(crate) fn validation(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            body: body.into(),
        }
    }

    /// Returns `true` if the retry layer should try this call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectionTimeout { .. })
    }

    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
            || matches!(self, Self::HttpStatus { status: 401 | 403, .. })
    }

    /// The HTTP status code, for [`Error::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_errors_are_retryable() {
        let connection = Error::Connection {
            message: "connection reset".into(),
            source: None,
        };
        assert!(connection.is_retryable());
        assert!(!Error::ConnectionTimeout { timeout_secs: 8 }.is_retryable());
        assert!(!Error::MissingInstallationId.is_retryable());
        assert!(
            !Error::Authentication {
                message: "expired".into()
            }
            .is_retryable()
        );
        assert!(!Error::validation("bad shape", "{}").is_retryable());
    }

    #[test]
    fn timeout_message_mentions_seconds() {
        let err = Error::ConnectionTimeout { timeout_secs: 8 };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("8s"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn builder_errors_are_not_retried() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(err.is_builder());

        let mapped = Error::from_reqwest(err, Duration::from_secs(8));
        assert!(matches!(mapped, Error::Request { .. }), "got {mapped:?}");
        assert!(!mapped.is_retryable());
    }
}
