// OpenMotics local gateway API
//
// `LocalGateway` talks directly to a gateway on the LAN using its
// action-style API (`login`, `get_output_status`, `set_output`, ...).

pub mod models;

mod client;
mod groupactions;
mod outputs;
mod sensors;

pub use client::{LOCAL_WEBHOOK_EVENT_TYPES, LocalGateway, LocalGatewayBuilder};
pub use groupactions::LocalGroupActions;
pub use outputs::LocalOutputs;
pub use sensors::LocalSensors;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::transport::ApiResponse;

/// Extract `key` from a gateway action response.
///
/// Responses carry `"success": true|false`; a `false` is reported as
/// [`Error::Validation`] with the full body.
pub(crate) fn action_field<T: DeserializeOwned>(resp: ApiResponse, key: &str) -> Result<T, Error> {
    let value = resp.into_json()?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let msg = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("gateway reported failure")
            .to_owned();
        return Err(Error::validation(msg, value.to_string()));
    }
    let Some(field) = value.get(key) else {
        return Err(Error::validation(
            format!("response has no `{key}` field"),
            value.to_string(),
        ));
    };
    serde_json::from_value(field.clone())
        .map_err(|e| Error::validation(format!("{key}: {e}"), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_action_is_validation_error() {
        let resp = ApiResponse::Json(json!({"success": false, "msg": "invalid_token"}));
        let err = action_field::<Value>(resp, "config").unwrap_err();
        assert!(err.to_string().contains("invalid_token"));
    }

    #[test]
    fn field_is_extracted() {
        let resp = ApiResponse::Json(json!({"success": true, "status": [1, 2]}));
        let status: Vec<u8> = action_field(resp, "status").unwrap();
        assert_eq!(status, vec![1, 2]);
    }
}
