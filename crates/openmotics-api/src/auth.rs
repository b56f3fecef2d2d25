// Token sources for the cloud API, plus local gateway login credentials.

use std::fmt;
use std::time::Duration;

use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{DEFAULT_TIMEOUT, USER_AGENT};

/// OAuth2 scope requested by [`ClientCredentials`].
pub const OAUTH2_SCOPE: &str = "control view configure";

/// Token endpoint path relative to the cloud base URL.
pub const OAUTH2_TOKEN_PATH: &str = "/authentication/oauth2/token";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

// ── TokenProvider ────────────────────────────────────────────────────

/// Supplies a bearer token before every cloud request.
///
/// Implemented for `StaticToken`, [`ClientCredentials`], and any
/// `Fn() -> impl Future<Output = Result<SecretString, Error>>`.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> BoxFuture<'_, Result<SecretString, Error>>;
}

impl<F, Fut> TokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<SecretString, Error>> + Send + 'static,
{
    fn token(&self) -> BoxFuture<'_, Result<SecretString, Error>> {
        Box::pin(self())
    }
}

/// A fixed token that never changes.
#[derive(Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> BoxFuture<'_, Result<SecretString, Error>> {
        let token = self.0.clone();
        Box::pin(async move { Ok(token) })
    }
}

// ── OAuth2 client credentials ────────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: SecretString,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .is_none_or(|at| Instant::now() + REFRESH_MARGIN < at)
    }
}

/// OAuth2 client-credentials grant against the cloud token endpoint.
///
/// The last token is cached and reused until it is within 30 seconds of
/// expiry.
pub struct ClientCredentials {
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl ClientCredentials {
    /// `base_url` is the cloud API root, e.g. `https://cloud.openmotics.com/api/v1.1`.
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(base_url, client_id, client_secret, http)
    }

    pub fn with_client(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let token_url = Url::parse(&format!(
            "{}{OAUTH2_TOKEN_PATH}",
            base_url.trim_end_matches('/')
        ))?;
        Ok(Self {
            token_url,
            client_id: client_id.into(),
            client_secret,
            http,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<CachedToken, Error> {
        debug!("POST {} (client_credentials)", self.token_url);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", OAUTH2_SCOPE),
        ];

        let resp = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, DEFAULT_TIMEOUT))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::BAD_REQUEST
        {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("token request rejected (HTTP {status}): {body}"),
            });
        }
        let resp = resp
            .error_for_status()
            .map_err(|e| Error::from_reqwest(e, DEFAULT_TIMEOUT))?;

        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, DEFAULT_TIMEOUT))?;
        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::validation(format!("invalid token response: {e}"), body))?;

        Ok(CachedToken {
            token: SecretString::from(parsed.access_token),
            expires_at: parsed
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        })
    }
}

impl TokenProvider for ClientCredentials {
    fn token(&self) -> BoxFuture<'_, Result<SecretString, Error>> {
        Box::pin(async move {
            let mut cached = self.cached.lock().await;
            if let Some(current) = cached.as_ref().filter(|c| c.is_fresh()) {
                return Ok(current.token.clone());
            }
            let fresh = self.fetch().await?;
            let token = fresh.token.clone();
            *cached = Some(fresh);
            Ok(token)
        })
    }
}

// ── Local gateway credentials ────────────────────────────────────────

/// Username/password pair for the local gateway `login` action.
#[derive(Clone)]
pub struct LocalCredentials {
    pub username: String,
    pub password: SecretString,
}

impl LocalCredentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for LocalCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
