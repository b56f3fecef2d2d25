//! CLI error types with miette diagnostics.
//!
//! Maps `openmotics_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use openmotics_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {target}")]
    #[diagnostic(
        code(openmotics::connection_failed),
        help(
            "Check the network connection and the configured URL or gateway host.\n\
             Run with -vv to see each request."
        )
    )]
    ConnectionFailed {
        target: String,
        #[source]
        source: openmotics_api::Error,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(openmotics::tls_error),
        help(
            "Gateways usually run with a self-signed certificate.\n\
             Use --insecure (-k) to accept it, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(openmotics::timeout),
        help("Increase timeout with --timeout or check that the service is responsive.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(openmotics::auth_failed),
        help(
            "Verify your token or client credentials, or the gateway username and password.\n\
             Tokens can be supplied with --token or OPENMOTICS_TOKEN."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(openmotics::no_credentials),
        help(
            "Pass --token (or set OPENMOTICS_TOKEN) for the cloud API.\n\
             For a local gateway pass --username and --password, or add them to the profile."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API returned HTTP {status}")]
    #[diagnostic(code(openmotics::http_status))]
    HttpStatus { status: u16 },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(openmotics::not_found),
        help("Run: openmotics {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(openmotics::unexpected_response), help("Response body: {body}"))]
    UnexpectedResponse { message: String, body: String },

    #[error("No installation selected")]
    #[diagnostic(
        code(openmotics::no_installation),
        help(
            "Pass --installation-id (-i), set OPENMOTICS_INSTALLATION_ID, \
             or set installation_id in your profile.\n\
             Run: openmotics installations list"
        )
    )]
    NoInstallation,

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(openmotics::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(openmotics::profile_not_found),
        help("Expected a [profiles.{name}] table in {path}")
    )]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(openmotics::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(openmotics::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoInstallation | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            Self::HttpStatus { status } => match status {
                401 | 403 => exit_code::AUTH,
                404 => exit_code::NOT_FOUND,
                _ => exit_code::GENERAL,
            },
            _ => exit_code::GENERAL,
        }
    }
}

// ── openmotics_api::Error → CliError mapping ─────────────────────────

impl From<openmotics_api::Error> for CliError {
    fn from(err: openmotics_api::Error) -> Self {
        use openmotics_api::Error;

        match err {
            Error::ConnectionTimeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            Error::HttpStatus { status, .. } => CliError::HttpStatus { status },
            Error::Authentication { message } => CliError::AuthFailed { message },
            Error::Validation { message, body } => CliError::UnexpectedResponse { message, body },
            Error::MissingInstallationId => CliError::NoInstallation,
            Error::InvalidUrl(e) => CliError::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            Error::Tls(message) => CliError::TlsError { message },
            other @ (Error::Connection { .. } | Error::Request { .. }) => {
                CliError::ConnectionFailed {
                    target: "the OpenMotics API".into(),
                    source: other,
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                path: openmotics_config::config_path().display().to_string(),
            },
            ConfigError::Api(api) => api.into(),
            other => CliError::Config(other),
        }
    }
}
