// Bearer-token HTTP transport for the OpenMotics cloud REST API.
//
// Base path: /api/v1.1
// Auth: `Authorization: Bearer <token>` on every request

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue, USER_AGENT as USER_AGENT_HEADER};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::Error;
use crate::retry::{RetryPolicy, retry};
use crate::transport::{
    ApiResponse, RequestOptions, SessionSlot, TransportConfig, USER_AGENT, decode_response,
    with_timeout,
};

/// Low-level cloud transport: token injection, per-call timeout, retry on
/// connection failures, and JSON-or-text decoding.
///
/// Paths are appended verbatim to the base URL, which carries the
/// `/api/v1.1` prefix.
pub struct CloudClient {
    base_url: String,
    token: RwLock<SecretString>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    session: SessionSlot,
    retry: RetryPolicy,
}

impl std::fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudClient")
            .field("base_url", &self.base_url)
            .field("has_token_provider", &self.token_provider.is_some())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl CloudClient {
    pub(crate) fn new(
        base_url: &str,
        token: SecretString,
        token_provider: Option<Arc<dyn TokenProvider>>,
        http: Option<reqwest::Client>,
        transport: TransportConfig,
        retry: RetryPolicy,
    ) -> Result<Self, Error> {
        // Validate once up front; per-call URLs are built by concatenation.
        let base = Url::parse(base_url)?;
        let base_url = base.as_str().trim_end_matches('/').to_owned();

        Ok(Self {
            base_url,
            token: RwLock::new(token),
            token_provider,
            session: SessionSlot::new(http, transport),
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.session.timeout()
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, Error> {
        self.request(Method::GET, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, Error> {
        self.request(Method::POST, path, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, Error> {
        self.request(Method::DELETE, path, options).await
    }

    /// Issue a request, retrying connection failures per the retry policy.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let options = &options;
        retry(&self.retry, || self.request_once(method.clone(), path, options)).await
    }

    async fn request_once(
        &self,
        method: Method,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let token = self.current_token().await?;
        let url = Url::parse(&format!("{}{path}", self.base_url))?;
        let http = self.session.client().await?;
        let timeout = self.timeout();

        debug!("{method} {url}");

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth.set_sensitive(true);

        let mut req = http
            .request(method, url)
            .header(AUTHORIZATION, auth)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, "application/json");

        let query = options.query_pairs();
        if !query.is_empty() {
            req = req.query(&query);
        }
        if let Some(body) = &options.json {
            req = req.json(body);
        }

        with_timeout(timeout, async move {
            let resp = req
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| Error::from_reqwest(e, timeout))?;
            decode_response(resp, timeout).await
        })
        .await
    }

    // ── Token / session ──────────────────────────────────────────────

    /// Token for the next call, refreshed from the provider when one is set.
    async fn current_token(&self) -> Result<SecretString, Error> {
        if let Some(provider) = &self.token_provider {
            let fresh = provider.token().await?;
            *self.token.write().unwrap_or_else(|e| e.into_inner()) = fresh.clone();
            return Ok(fresh);
        }
        Ok(self
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    /// Release the HTTP session if this client created it.
    pub async fn close(&self) {
        self.session.close().await;
    }

    /// Whether an HTTP session is currently held.
    pub async fn is_open(&self) -> bool {
        self.session.is_open().await
    }

    pub fn owns_session(&self) -> bool {
        self.session.is_owned()
    }
}
