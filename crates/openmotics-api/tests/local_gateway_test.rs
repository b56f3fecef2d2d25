// Integration tests for `LocalGateway` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openmotics_api::local::models::OutputType;
use openmotics_api::{Error, LocalCredentials, LocalGateway, RetryPolicy};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LocalGateway) {
    let server = MockServer::start().await;
    let gateway = LocalGateway::builder(
        "127.0.0.1",
        LocalCredentials::new("admin", SecretString::from("hunter2")),
    )
    .port(server.address().port())
    .tls(false)
    .retry_policy(RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
    })
    .build()
    .unwrap();
    (server, gateway)
}

async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=admin"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "token": token})),
        )
        .expect(times)
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exec_action_logs_in_first() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/do_group_action"))
        .and(body_string_contains("group_action_id=4"))
        .and(body_string_contains("token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    gateway.groupactions().trigger(4).await.unwrap();
    assert!(gateway.has_token());
}

#[tokio::test]
async fn test_expired_token_triggers_one_relogin() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 2).await;

    Mock::given(method("POST"))
        .and(path("/set_output"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/set_output"))
        .and(body_string_contains("id=3"))
        .and(body_string_contains("is_on=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    gateway.outputs().turn_off(3).await.unwrap();
}

#[tokio::test]
async fn test_rejected_login_is_not_retried() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = gateway.login().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_login_without_token_is_validation_error() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let err = gateway.login().await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }), "got {err:?}");
    assert!(!gateway.has_token());
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = gateway.login().await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }), "got {err:?}");
}

// ── Accessors ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_outputs_merge_config_and_status() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/get_output_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "config": [
                {"name": "Vijver", "room": 255, "module_type": "O", "id": 0, "type": 0},
                {"name": "Boom", "room": 2, "module_type": "D", "id": 1, "type": 255}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_output_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": [
                {"status": 0, "dimmer": 100, "ctimer": 0, "id": 0, "locked": false},
                {"status": 1, "dimmer": 40, "ctimer": 0, "id": 1, "locked": true}
            ]
        })))
        .mount(&server)
        .await;

    let outputs = gateway.outputs().get_all().await.unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].output_type, OutputType::Outlet);
    assert!(!outputs[0].is_on());
    assert_eq!(outputs[1].output_type, OutputType::Light);
    assert!(outputs[1].is_dimmable());
    let status = outputs[1].status.as_ref().unwrap();
    assert!(status.on);
    assert_eq!(status.value, Some(40));
    assert_eq!(status.locked, Some(true));
}

#[tokio::test]
async fn test_toggle_turns_on_output_that_is_off() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/get_output_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "config": [{"name": "Vijver", "module_type": "O", "id": 0, "type": 0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get_output_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": [{"status": 0, "dimmer": 0, "id": 0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/set_output"))
        .and(body_string_contains("is_on=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    gateway.outputs().toggle(0).await.unwrap();
}

#[tokio::test]
async fn test_turn_on_clamps_dimmer() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/set_output"))
        .and(body_string_contains("is_on=true"))
        .and(body_string_contains("dimmer=100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    gateway.outputs().turn_on(1, Some(300)).await.unwrap();
}

#[tokio::test]
async fn test_sensors_keep_each_reading() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/get_sensor_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "config": [{"id": 0, "name": "Living", "room": 1}, {"id": 1, "name": "Attic"}]
        })))
        .mount(&server)
        .await;
    for (action, values) in [
        ("get_sensor_brightness_status", json!([55.0, null])),
        ("get_sensor_humidity_status", json!([41.5, 60.0])),
        ("get_sensor_temperature_status", json!([21.5, 12.0])),
    ] {
        Mock::given(method("POST"))
            .and(path(format!("/{action}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "status": values})),
            )
            .mount(&server)
            .await;
    }

    let sensors = gateway.sensors().get_all().await.unwrap();
    assert_eq!(sensors.len(), 2);
    assert_eq!(sensors[0].brightness, Some(55.0));
    assert_eq!(sensors[0].humidity, Some(41.5));
    assert_eq!(sensors[0].temperature, Some(21.5));
    assert_eq!(sensors[1].brightness, None);

    let attic = gateway.sensors().get_by_id(1).await.unwrap().unwrap();
    assert_eq!(attic.name, "Attic");
}

#[tokio::test]
async fn test_groupactions_by_usage_matches_name() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    Mock::given(method("POST"))
        .and(path("/get_group_action_configurations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "config": [
                {"id": 0, "name": "SCENE", "actions": "2,0"},
                {"id": 1, "name": "All off", "actions": "164,0"}
            ]
        })))
        .mount(&server)
        .await;

    let scenes = gateway.groupactions().scenes().await.unwrap();
    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].id, 0);
    assert_eq!(scenes[0].actions, vec![2, 0]);

    assert!(gateway.groupactions().get_by_id(9).await.unwrap().is_none());
}

// ── Webhooks / sessions ─────────────────────────────────────────────

#[tokio::test]
async fn test_webhook_subscription() {
    let (server, gateway) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ws/events"))
        .and(body_json(json!({
            "action": "set_subscription",
            "types": ["OUTPUT_CHANGE", "SHUTTER_CHANGE", "THERMOSTAT_CHANGE", "THERMOSTAT_GROUP_CHANGE"],
            "installation_ids": [21]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/ws/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    gateway.subscribe_webhook(21).await.unwrap();
    gateway.unsubscribe_webhook().await.unwrap();
}

#[tokio::test]
async fn test_scoped_closes_internal_session() {
    let (server, gateway) = setup().await;
    mount_login(&server, "tok-1", 1).await;

    gateway
        .scoped(|gw| async move { gw.login().await })
        .await
        .unwrap();
    assert!(!gateway.is_open().await);
}

#[tokio::test]
async fn test_scoped_closes_internal_session_on_error() {
    let (server, gateway) = setup().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway.scoped(|gw| async move { gw.login().await }).await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
    assert!(!gateway.is_open().await);
}
