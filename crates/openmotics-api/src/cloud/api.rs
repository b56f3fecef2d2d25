// Cloud facade: transport + installation id + accessors.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::FutureExt;
use secrecy::SecretString;
use serde_json::json;

use super::client::CloudClient;
use super::{
    CLOUD_BASE_URL, GroupActions, Installations, Lights, Outputs, Sensors, Shutters, Thermostats,
    WEBHOOK_EVENT_TYPES,
};
use crate::auth::TokenProvider;
use crate::error::Error;
use crate::retry::RetryPolicy;
use crate::transport::{ApiResponse, DEFAULT_TIMEOUT, RequestOptions, TlsMode, TransportConfig};

struct Inner {
    client: CloudClient,
    installation_id: RwLock<Option<u64>>,
}

/// Async client for the OpenMotics cloud API.
///
/// Cheap to clone: clones share the transport, the HTTP session and the
/// installation id.
///
/// ```no_run
/// # async fn demo() -> Result<(), openmotics_api::Error> {
/// use openmotics_api::OpenMoticsCloud;
///
/// let cloud = OpenMoticsCloud::builder("my-token").installation_id(21).build()?;
/// for output in cloud.outputs().get_all(None).await? {
///     println!("{} {}", output.id, output.name);
/// }
/// cloud.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenMoticsCloud {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for OpenMoticsCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenMoticsCloud")
            .field("client", &self.inner.client)
            .field("installation_id", &self.installation_id())
            .finish()
    }
}

impl OpenMoticsCloud {
    pub fn builder(token: impl Into<String>) -> OpenMoticsCloudBuilder {
        OpenMoticsCloudBuilder::new(token)
    }

    /// The underlying transport, for endpoints without a typed accessor.
    pub fn client(&self) -> &CloudClient {
        &self.inner.client
    }

    // ── Installation scope ───────────────────────────────────────────

    pub fn installation_id(&self) -> Option<u64> {
        *self
            .inner
            .installation_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Change the installation every scoped accessor call targets.
    pub fn set_installation_id(&self, installation_id: Option<u64>) {
        *self
            .inner
            .installation_id
            .write()
            .unwrap_or_else(|e| e.into_inner()) = installation_id;
    }

    pub(crate) fn require_installation_id(&self) -> Result<u64, Error> {
        self.installation_id().ok_or(Error::MissingInstallationId)
    }

    /// `/base/installations/{id}{suffix}` for the current installation.
    pub(crate) fn installation_path(&self, suffix: &str) -> Result<String, Error> {
        let id = self.require_installation_id()?;
        Ok(format!("/base/installations/{id}{suffix}"))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn installations(&self) -> Installations<'_> {
        Installations::new(self)
    }

    pub fn outputs(&self) -> Outputs<'_> {
        Outputs::new(self)
    }

    pub fn lights(&self) -> Lights<'_> {
        Lights::new(self)
    }

    pub fn sensors(&self) -> Sensors<'_> {
        Sensors::new(self)
    }

    pub fn shutters(&self) -> Shutters<'_> {
        Shutters::new(self)
    }

    pub fn groupactions(&self) -> GroupActions<'_> {
        GroupActions::new(self)
    }

    pub fn thermostats(&self) -> Thermostats<'_> {
        Thermostats::new(self)
    }

    // ── Transport shortcuts ──────────────────────────────────────────

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, Error> {
        self.inner.client.get(path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, Error> {
        self.inner.client.post(path, options).await
    }

    // ── Webhooks ─────────────────────────────────────────────────────

    /// Register for change events on the current installation.
    pub async fn subscribe_webhook(&self) -> Result<ApiResponse, Error> {
        let installation_id = self.require_installation_id()?;
        let body = json!({
            "type": "ACTION",
            "data": {
                "action": "set_subscription",
                "types": WEBHOOK_EVENT_TYPES,
                "installation_ids": [installation_id],
            },
        });
        self.inner
            .client
            .post("/ws/events", RequestOptions::new().json(body))
            .await
    }

    /// Drop every webhook registered for this application.
    pub async fn unsubscribe_webhook(&self) -> Result<ApiResponse, Error> {
        self.inner
            .client
            .delete("/ws/events", RequestOptions::new())
            .await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Release the HTTP session if this client created it.
    ///
    /// A later request opens a fresh session.
    pub async fn close(&self) {
        self.inner.client.close().await;
    }

    /// Run `f` and close the session afterwards, whatever `f` returned.
    ///
    /// The session is also closed if `f` panics; the panic is resumed after.
    pub async fn scoped<T, F, Fut>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(OpenMoticsCloud) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let outcome = AssertUnwindSafe(f(self.clone())).catch_unwind().await;
        self.close().await;
        outcome.unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Configures and builds an [`OpenMoticsCloud`].
pub struct OpenMoticsCloudBuilder {
    token: String,
    base_url: String,
    timeout: Duration,
    tls: TlsMode,
    http: Option<reqwest::Client>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    installation_id: Option<u64>,
    retry: RetryPolicy,
}

impl OpenMoticsCloudBuilder {
    fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into().trim().to_owned(),
            base_url: CLOUD_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            tls: TlsMode::System,
            http: None,
            token_provider: None,
            installation_id: None,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// Use a caller-owned HTTP client. It is never closed by this crate.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Fetch a fresh token before every request.
    #[must_use]
    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn installation_id(mut self, installation_id: u64) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<OpenMoticsCloud, Error> {
        let transport = TransportConfig {
            tls: self.tls,
            timeout: self.timeout,
        };
        let client = CloudClient::new(
            &self.base_url,
            SecretString::from(self.token),
            self.token_provider,
            self.http,
            transport,
            self.retry,
        )?;

        Ok(OpenMoticsCloud {
            inner: Arc::new(Inner {
                client,
                installation_id: RwLock::new(self.installation_id),
            }),
        })
    }
}
