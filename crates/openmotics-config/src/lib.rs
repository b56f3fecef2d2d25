//! Shared configuration for OpenMotics tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `openmotics_api` clients. The CLI layers its flag
//! overrides on top of this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use openmotics_api::{
    CLOUD_BASE_URL, ClientCredentials, LocalCredentials, LocalGateway, OpenMoticsCloud, TlsMode,
};

/// Keyring service name under which secrets are stored.
pub const KEYRING_SERVICE: &str = "openmotics";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] openmotics_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named cloud or gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { profile: name })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    8
}

/// Which API a profile talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    #[default]
    Cloud,
    Local,
}

/// A named profile: either cloud credentials or a local gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub mode: ProfileMode,

    // ── Cloud ──
    /// Cloud API root (defaults to the production cloud).
    pub base_url: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// OAuth2 client id for the client-credentials grant.
    pub client_id: Option<String>,

    /// OAuth2 client secret (plaintext; prefer keyring).
    pub client_secret: Option<String>,

    pub installation_id: Option<u64>,

    // ── Local gateway ──
    pub host: Option<String>,
    pub port: Option<u16>,
    /// `https` when true (default).
    pub tls: Option<bool>,
    pub username: Option<String>,
    /// Gateway password (plaintext; prefer keyring).
    pub password: Option<String>,
    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
    /// Accept self-signed gateway certificates.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "openmotics", "openmotics").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("openmotics");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, then apply `OPENMOTICS_`-prefixed env overrides.
///
/// Nested keys use a double underscore:
/// `OPENMOTICS_PROFILES__HOME__INSTALLATION_ID=21`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OPENMOTICS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// How a cloud profile authenticates.
#[derive(Debug)]
pub enum CloudAuth {
    Token(SecretString),
    ClientCredentials {
        client_id: String,
        client_secret: SecretString,
    },
}

fn keyring_secret(profile_name: &str, key: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{key}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Resolve a bearer token: `token_env` var → `OPENMOTICS_TOKEN` → keyring → plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("OPENMOTICS_TOKEN") {
        return Ok(SecretString::from(val));
    }

    if let Some(secret) = keyring_secret(profile_name, "token") {
        return Ok(secret);
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Prefer OAuth2 client credentials when a client id is configured.
pub fn resolve_cloud_auth(profile: &Profile, profile_name: &str) -> Result<CloudAuth, ConfigError> {
    if let Some(ref client_id) = profile.client_id {
        let client_secret = std::env::var("OPENMOTICS_CLIENT_SECRET")
            .ok()
            .map(SecretString::from)
            .or_else(|| keyring_secret(profile_name, "client-secret"))
            .or_else(|| profile.client_secret.clone().map(SecretString::from))
            .ok_or_else(|| ConfigError::NoCredentials {
                profile: profile_name.into(),
            })?;
        return Ok(CloudAuth::ClientCredentials {
            client_id: client_id.clone(),
            client_secret,
        });
    }

    resolve_token(profile, profile_name).map(CloudAuth::Token)
}

/// Resolve gateway login credentials: env → keyring → plaintext.
pub fn resolve_local_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<LocalCredentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("OPENMOTICS_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(pw) = std::env::var("OPENMOTICS_PASSWORD") {
        return Ok(LocalCredentials::new(username, SecretString::from(pw)));
    }

    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Ok(LocalCredentials::new(username, pw));
    }

    if let Some(ref pw) = profile.password {
        return Ok(LocalCredentials::new(username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Client construction ─────────────────────────────────────────────

fn profile_timeout(profile: &Profile, defaults: &Defaults) -> Duration {
    Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout))
}

fn profile_tls(profile: &Profile) -> TlsMode {
    if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build an `OpenMoticsCloud` from a cloud profile.
pub fn profile_to_cloud(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<OpenMoticsCloud, ConfigError> {
    let auth = resolve_cloud_auth(profile, profile_name)?;
    profile_to_cloud_with(profile, auth, defaults)
}

/// Build an `OpenMoticsCloud` from a profile and already-resolved auth.
pub fn profile_to_cloud_with(
    profile: &Profile,
    auth: CloudAuth,
    defaults: &Defaults,
) -> Result<OpenMoticsCloud, ConfigError> {
    let base_url = profile.base_url.as_deref().unwrap_or(CLOUD_BASE_URL);
    url::Url::parse(base_url).map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL '{base_url}': {e}"),
    })?;

    let mut builder = match auth {
        CloudAuth::Token(token) => OpenMoticsCloud::builder(token.expose_secret()),
        CloudAuth::ClientCredentials {
            client_id,
            client_secret,
        } => {
            let provider = ClientCredentials::new(base_url, client_id, client_secret)?;
            OpenMoticsCloud::builder("").token_provider(provider)
        }
    };

    builder = builder
        .base_url(base_url)
        .timeout(profile_timeout(profile, defaults))
        .tls(profile_tls(profile));
    if let Some(id) = profile.installation_id {
        builder = builder.installation_id(id);
    }

    Ok(builder.build()?)
}

/// Build a `LocalGateway` from a local profile.
pub fn profile_to_local(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<LocalGateway, ConfigError> {
    let credentials = resolve_local_credentials(profile, profile_name)?;
    profile_to_local_with(profile, profile_name, credentials, defaults)
}

/// Build a `LocalGateway` from a profile and already-resolved credentials.
pub fn profile_to_local_with(
    profile: &Profile,
    profile_name: &str,
    credentials: LocalCredentials,
    defaults: &Defaults,
) -> Result<LocalGateway, ConfigError> {
    let host = profile
        .host
        .clone()
        .ok_or_else(|| ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no gateway host"),
        })?;

    let gateway = LocalGateway::builder(host, credentials)
        .port(profile.port.unwrap_or(443))
        .tls(profile.tls.unwrap_or(true))
        .tls_mode(profile_tls(profile))
        .timeout(profile_timeout(profile, defaults))
        .build()?;
    Ok(gateway)
}
