// Shared transport plumbing for the cloud and local gateway clients.
//
// Owns the HTTP session slot (lazily created, closed only when owned),
// request option normalization, and JSON-or-text response decoding.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;

/// `User-Agent` sent on every request.
pub const USER_AGENT: &str = concat!("openmotics-rs/", env!("CARGO_PKG_VERSION"));

/// Per-call timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

// ── TLS / client construction ────────────────────────────────────────

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for gateways with self-signed certs).
    DangerAcceptInvalid,
}

/// Settings used when the client has to build its own `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Session slot ─────────────────────────────────────────────────────

/// Holds the HTTP session shared by every call of one client.
///
/// A caller-supplied client is never released. A client built here on
/// first use is owned and dropped again by [`SessionSlot::close`].
#[derive(Debug)]
pub(crate) struct SessionSlot {
    client: Mutex<Option<reqwest::Client>>,
    owned: AtomicBool,
    config: TransportConfig,
}

impl SessionSlot {
    pub(crate) fn external(client: reqwest::Client, config: TransportConfig) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            owned: AtomicBool::new(false),
            config,
        }
    }

    pub(crate) fn lazy(config: TransportConfig) -> Self {
        Self {
            client: Mutex::new(None),
            owned: AtomicBool::new(false),
            config,
        }
    }

    pub(crate) fn new(client: Option<reqwest::Client>, config: TransportConfig) -> Self {
        match client {
            Some(client) => Self::external(client, config),
            None => Self::lazy(config),
        }
    }

    /// Current session, creating one if none exists yet.
    pub(crate) async fn client(&self) -> Result<reqwest::Client, Error> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        debug!("creating HTTP session");
        let client = self.config.build_client()?;
        *slot = Some(client.clone());
        self.owned.store(true, Ordering::Release);
        Ok(client)
    }

    /// Release the session if this slot created it.
    pub(crate) async fn close(&self) {
        let mut slot = self.client.lock().await;
        if self.owned.swap(false, Ordering::AcqRel) {
            debug!("closing owned HTTP session");
            slot.take();
        }
    }

    pub(crate) async fn is_open(&self) -> bool {
        self.client.lock().await.is_some()
    }

    pub(crate) fn is_owned(&self) -> bool {
        self.owned.load(Ordering::Acquire)
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.config.timeout
    }
}

// ── Request options ──────────────────────────────────────────────────

/// A scalar query or form parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Query parameters and optional JSON body for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, ParamValue)>,
    pub json: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a query parameter only when `value` is `Some`.
    #[must_use]
    pub fn param_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    /// Set the JSON request body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Parameters rendered to their wire form.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

// ── Responses ────────────────────────────────────────────────────────

/// Decoded response body: JSON when the server says so, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(serde_json::Value),
    Text(String),
}

impl ApiResponse {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Json(_) => None,
        }
    }

    /// The JSON value, or [`Error::Validation`] for a text body.
    pub fn into_json(self) -> Result<serde_json::Value, Error> {
        match self {
            Self::Json(v) => Ok(v),
            Self::Text(t) => Err(Error::validation("expected a JSON response", t)),
        }
    }

    /// The body as text. JSON bodies are re-serialized.
    pub fn into_text(self) -> String {
        match self {
            Self::Json(v) => v.to_string(),
            Self::Text(t) => t,
        }
    }

    /// Deserialize the whole body.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.into_json()?;
        serde_json::from_value(value.clone())
            .map_err(|e| Error::validation(e.to_string(), value.to_string()))
    }

    /// Deserialize the `data` envelope field of a cloud response.
    pub(crate) fn data<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.into_json()?;
        let Some(data) = value.get("data") else {
            return Err(Error::validation(
                "response has no `data` field",
                value.to_string(),
            ));
        };
        serde_json::from_value(data.clone())
            .map_err(|e| Error::validation(e.to_string(), value.to_string()))
    }
}

/// Read the response body and pick JSON or text by `Content-Type`.
pub(crate) async fn decode_response(
    resp: reqwest::Response,
    timeout: Duration,
) -> Result<ApiResponse, Error> {
    let is_json = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let body = resp
        .text()
        .await
        .map_err(|e| Error::from_reqwest(e, timeout))?;

    if !is_json {
        return Ok(ApiResponse::Text(body));
    }

    serde_json::from_str(&body)
        .map(ApiResponse::Json)
        .map_err(|e| {
            let preview = body_preview(&body, 200);
            Error::validation(format!("{e} (body preview: {preview:?})"), body.clone())
        })
}

/// The first `max_chars` characters of `body`.
fn body_preview(body: &str, max_chars: usize) -> &str {
    body.char_indices()
        .nth(max_chars)
        .map_or(body, |(end, _)| &body[..end])
}

/// Run one request future under the per-call timeout.
pub(crate) async fn with_timeout<F>(timeout: Duration, call: F) -> Result<ApiResponse, Error>
where
    F: Future<Output = Result<ApiResponse, Error>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::ConnectionTimeout {
            timeout_secs: timeout.as_secs(),
        }),
    }
}
