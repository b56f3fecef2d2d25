// Config file round-trips and client construction from profiles.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use openmotics_config::{
    Config, ConfigError, Defaults, Profile, ProfileMode, load_config_from, profile_to_cloud,
    profile_to_local, save_config_to,
};

#[test]
fn test_load_profiles_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 12

[profiles.home]
token = "plain-token"
installation_id = 21

[profiles.gateway]
mode = "local"
host = "192.168.1.10"
username = "admin"
password = "hunter2"
tls = false
port = 8088
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.timeout, 12);

    let (name, home) = cfg.profile(None).unwrap();
    assert_eq!(name, "home");
    assert_eq!(home.mode, ProfileMode::Cloud);
    assert_eq!(home.installation_id, Some(21));

    let (_, gateway) = cfg.profile(Some("gateway")).unwrap();
    assert_eq!(gateway.mode, ProfileMode::Local);
    assert_eq!(gateway.port, Some(8088));
    assert_eq!(gateway.tls, Some(false));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.defaults.timeout, 8);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut profiles = HashMap::new();
    profiles.insert(
        "office".to_owned(),
        Profile {
            token: Some("t".into()),
            installation_id: Some(7),
            ..Profile::default()
        },
    );
    let cfg = Config {
        default_profile: Some("office".into()),
        defaults: Defaults::default(),
        profiles,
    };
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let (_, office) = loaded.profile(None).unwrap();
    assert_eq!(office.installation_id, Some(7));
}

#[test]
fn test_cloud_profile_builds_client() {
    let profile = Profile {
        token: Some("plain-token".into()),
        installation_id: Some(21),
        base_url: Some("http://127.0.0.1:9/api/v1.1".into()),
        ..Profile::default()
    };
    let cloud = profile_to_cloud(&profile, "no-such-keyring-profile", &Defaults::default()).unwrap();
    assert_eq!(cloud.installation_id(), Some(21));
    assert_eq!(cloud.client().base_url(), "http://127.0.0.1:9/api/v1.1");
}

#[test]
fn test_cloud_profile_rejects_bad_url() {
    let profile = Profile {
        token: Some("plain-token".into()),
        base_url: Some("not a url".into()),
        ..Profile::default()
    };
    let err = profile_to_cloud(&profile, "p", &Defaults::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}

#[test]
fn test_local_profile_builds_gateway() {
    let profile = Profile {
        mode: ProfileMode::Local,
        host: Some("gateway.lan".into()),
        username: Some("admin".into()),
        password: Some("pw".into()),
        tls: Some(false),
        port: Some(8088),
        ..Profile::default()
    };
    let gateway = profile_to_local(&profile, "no-such-keyring-profile", &Defaults::default()).unwrap();
    assert_eq!(gateway.base_url(), "http://gateway.lan:8088");
}
