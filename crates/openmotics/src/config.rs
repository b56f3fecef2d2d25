//! CLI configuration: thin wrapper around `openmotics_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--token,
//! --base-url, --host, ...). Flags win over profile values.

use secrecy::SecretString;

use openmotics_api::{LocalCredentials, LocalGateway, OpenMoticsCloud};
use openmotics_config::{
    CloudAuth, Config, Profile, ProfileMode, config_path, load_config_from,
    load_config_or_default, profile_to_cloud_with, profile_to_local_with, resolve_cloud_auth,
    resolve_local_credentials,
};

use crate::cli::{GlobalOpts, LocalArgs};
use crate::error::CliError;

/// Load the config file named by `--config`, or the default one.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    match global.config {
        Some(ref path) => Ok(load_config_from(path)?),
        None => Ok(load_config_or_default()),
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with flag overrides applied.
///
/// An explicitly requested profile must exist; otherwise an empty profile
/// is used so that flags and env vars alone are enough.
fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    let mut profile = match config.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                path: global
                    .config
                    .clone()
                    .unwrap_or_else(config_path)
                    .display()
                    .to_string(),
            });
        }
        None => Profile::default(),
    };

    if let Some(ref url) = global.base_url {
        profile.base_url = Some(url.clone());
    }
    if let Some(id) = global.installation_id {
        profile.installation_id = Some(id);
    }
    if let Some(ref host) = global.host {
        profile.host = Some(host.clone());
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if global.no_tls {
        profile.tls = Some(false);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok((name, profile))
}

/// Build the cloud client for the active profile.
pub fn build_cloud(global: &GlobalOpts) -> Result<OpenMoticsCloud, CliError> {
    let config = load(global)?;
    let (name, profile) = effective_profile(global, &config)?;

    if profile.mode == ProfileMode::Local {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("'{name}' is a local gateway profile; use `openmotics local ...`"),
        });
    }

    // --token wins over every stored credential
    let auth = match global.token {
        Some(ref token) => CloudAuth::Token(SecretString::from(token.clone())),
        None => resolve_cloud_auth(&profile, &name)?,
    };

    tracing::debug!(profile = %name, "building cloud client");
    Ok(profile_to_cloud_with(&profile, auth, &config.defaults)?)
}

/// Build the local gateway client for the active profile.
pub fn build_local(global: &GlobalOpts, local: &LocalArgs) -> Result<LocalGateway, CliError> {
    let config = load(global)?;
    let (name, mut profile) = effective_profile(global, &config)?;

    if let Some(ref username) = local.username {
        profile.username = Some(username.clone());
    }

    let credentials = match local.password {
        Some(ref password) => {
            let username = profile
                .username
                .clone()
                .ok_or_else(|| CliError::NoCredentials {
                    profile: name.clone(),
                })?;
            LocalCredentials::new(username, SecretString::from(password.clone()))
        }
        None => resolve_local_credentials(&profile, &name)?,
    };

    tracing::debug!(profile = %name, "building local gateway client");
    Ok(profile_to_local_with(
        &profile,
        &name,
        credentials,
        &config.defaults,
    )?)
}
