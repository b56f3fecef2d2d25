// Local gateway HTTP client.
//
// Every call is a POST of form data to `scheme://host:port/<action>`.
// A `login` action yields a session token that is sent back as the
// `token` form field on every subsequent call.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::FutureExt;
use reqwest::header::{ACCEPT, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::{LocalGroupActions, LocalOutputs, LocalSensors};
use crate::auth::LocalCredentials;
use crate::error::Error;
use crate::retry::{RetryPolicy, retry};
use crate::transport::{
    ApiResponse, DEFAULT_TIMEOUT, ParamValue, SessionSlot, TlsMode, TransportConfig, USER_AGENT,
    decode_response, with_timeout,
};

/// Event types requested by the gateway `subscribe_webhook`.
pub const LOCAL_WEBHOOK_EVENT_TYPES: [&str; 4] = [
    "OUTPUT_CHANGE",
    "SHUTTER_CHANGE",
    "THERMOSTAT_CHANGE",
    "THERMOSTAT_GROUP_CHANGE",
];

const LOCAL_ACCEPT: &str = "application/json, text/plain, */*";

enum LocalBody {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
    Empty,
}

struct Inner {
    base_url: String,
    credentials: LocalCredentials,
    token: RwLock<Option<SecretString>>,
    session: SessionSlot,
    retry: RetryPolicy,
}

/// Async client for an OpenMotics gateway on the local network.
///
/// Cheap to clone; clones share the session token and HTTP session.
#[derive(Clone)]
pub struct LocalGateway {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LocalGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalGateway")
            .field("base_url", &self.inner.base_url)
            .field("username", &self.inner.credentials.username)
            .field("logged_in", &self.has_token())
            .finish()
    }
}

impl LocalGateway {
    pub fn builder(host: impl Into<String>, credentials: LocalCredentials) -> LocalGatewayBuilder {
        LocalGatewayBuilder::new(host, credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn outputs(&self) -> LocalOutputs<'_> {
        LocalOutputs::new(self)
    }

    pub fn sensors(&self) -> LocalSensors<'_> {
        LocalSensors::new(self)
    }

    pub fn groupactions(&self) -> LocalGroupActions<'_> {
        LocalGroupActions::new(self)
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// POST `params` as form data to `path`, adding the session token.
    pub async fn request(
        &self,
        path: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<ApiResponse, Error> {
        let mut form: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.to_string()))
            .collect();
        if let Some(token) = self.current_token() {
            form.push(("token".to_owned(), token.expose_secret().to_owned()));
        }
        self.send(Method::POST, path, LocalBody::Form(form)).await
    }

    /// Log in and store the session token.
    pub async fn login(&self) -> Result<(), Error> {
        info!(username = %self.inner.credentials.username, "logging in to local gateway");
        let params = [
            ("username", ParamValue::from(self.inner.credentials.username.as_str())),
            (
                "password",
                ParamValue::from(self.inner.credentials.password.expose_secret()),
            ),
        ];
        let value = self.request("login", &params).await?.into_json()?;

        let Some(token) = value.get("token").and_then(serde_json::Value::as_str) else {
            return Err(Error::validation(
                "login response has no `token` field",
                value.to_string(),
            ));
        };
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) =
            Some(SecretString::from(token.to_owned()));
        Ok(())
    }

    /// Run a gateway action, logging in first when needed.
    ///
    /// An authentication failure triggers one fresh login and one retry.
    pub async fn exec_action(
        &self,
        action: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<ApiResponse, Error> {
        if !self.has_token() {
            self.login().await?;
        }

        match self.request(action, params).await {
            Err(Error::Authentication { message }) => {
                debug!("{action} rejected ({message}), logging in again");
                self.login().await?;
                self.request(action, params).await
            }
            other => other,
        }
    }

    // ── Webhooks ─────────────────────────────────────────────────────

    pub async fn subscribe_webhook(&self, installation_id: u64) -> Result<ApiResponse, Error> {
        let body = json!({
            "action": "set_subscription",
            "types": LOCAL_WEBHOOK_EVENT_TYPES,
            "installation_ids": [installation_id],
        });
        self.send(Method::POST, "/ws/events", LocalBody::Json(body))
            .await
    }

    pub async fn unsubscribe_webhook(&self) -> Result<ApiResponse, Error> {
        self.send(Method::DELETE, "/ws/events", LocalBody::Empty)
            .await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Release the HTTP session if this client created it.
    pub async fn close(&self) {
        self.inner.session.close().await;
    }

    pub async fn is_open(&self) -> bool {
        self.inner.session.is_open().await
    }

    /// Run `f` and close the session afterwards, whatever `f` returned.
    ///
    /// The session is also closed if `f` panics; the panic is resumed after.
    pub async fn scoped<T, F, Fut>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(LocalGateway) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let outcome = AssertUnwindSafe(f(self.clone())).catch_unwind().await;
        self.close().await;
        outcome.unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }

    // ── Transport ────────────────────────────────────────────────────

    fn current_token(&self) -> Option<SecretString> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn send(&self, method: Method, path: &str, body: LocalBody) -> Result<ApiResponse, Error> {
        let body = &body;
        retry(&self.inner.retry, || self.send_once(method.clone(), path, body)).await
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: &LocalBody,
    ) -> Result<ApiResponse, Error> {
        let url = Url::parse(&format!(
            "{}/{}",
            self.inner.base_url,
            path.trim_start_matches('/')
        ))?;
        let http = self.inner.session.client().await?;
        let timeout = self.inner.session.timeout();

        debug!("{method} {url}");

        let mut req = http
            .request(method, url)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .header(ACCEPT, LOCAL_ACCEPT);
        req = match body {
            LocalBody::Form(form) => req.form(form),
            LocalBody::Json(value) => req.json(value),
            LocalBody::Empty => req,
        };

        with_timeout(timeout, async move {
            let resp = req
                .send()
                .await
                .map_err(|e| Error::from_reqwest(e, timeout))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(Error::Authentication {
                    message: format!("gateway returned HTTP {status}"),
                });
            }
            match resp.error_for_status() {
                Ok(resp) => decode_response(resp, timeout).await,
                Err(e) => Err(Error::Connection {
                    message: format!("gateway returned HTTP {status}"),
                    source: Some(e),
                }),
            }
        })
        .await
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Configures and builds a [`LocalGateway`].
pub struct LocalGatewayBuilder {
    host: String,
    credentials: LocalCredentials,
    port: u16,
    tls: bool,
    tls_mode: TlsMode,
    timeout: Duration,
    http: Option<reqwest::Client>,
    retry: RetryPolicy,
}

impl LocalGatewayBuilder {
    fn new(host: impl Into<String>, credentials: LocalCredentials) -> Self {
        Self {
            host: host.into(),
            credentials,
            port: 443,
            tls: true,
            tls_mode: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            http: None,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `https` when true (the default), plain `http` otherwise.
    #[must_use]
    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn tls_mode(mut self, tls_mode: TlsMode) -> Self {
        self.tls_mode = tls_mode;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<LocalGateway, Error> {
        let scheme = if self.tls { "https" } else { "http" };
        let base = Url::parse(&format!("{scheme}://{}:{}", self.host, self.port))?;
        let base_url = base.as_str().trim_end_matches('/').to_owned();

        let transport = TransportConfig {
            tls: self.tls_mode,
            timeout: self.timeout,
        };

        Ok(LocalGateway {
            inner: Arc::new(Inner {
                base_url,
                credentials: self.credentials,
                token: RwLock::new(None),
                session: SessionSlot::new(self.http, transport),
                retry: self.retry,
            }),
        })
    }
}
