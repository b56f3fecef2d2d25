// Cloud API response types
//
// Records returned inside the `data` envelope of the cloud REST API. Almost
// every field is optional on the wire, so `#[serde(default)]` is used
// throughout and undocumented fields land in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

// ── Shared ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorCoordinates {
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
}

/// Where a device lives inside an installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub floor_coordinates: Option<FloorCoordinates>,
    #[serde(default)]
    pub installation_id: Option<u64>,
    #[serde(default)]
    pub gateway_id: Option<u64>,
    #[serde(default)]
    pub floor_id: Option<u64>,
    #[serde(default)]
    pub room_id: Option<u64>,
}

/// Convert a fractional epoch-seconds timestamp.
fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    let whole = secs.trunc() as i64;
    let nanos = (secs.fract() * 1e9).round() as u32;
    DateTime::from_timestamp(whole, nanos.min(999_999_999))
}

// ── Installation ─────────────────────────────────────────────────────

/// An installation (site) visible to the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub gateway_model: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub user_role: Option<Value>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub flags: Option<Value>,
    #[serde(default)]
    pub features: Option<Value>,
    #[serde(default)]
    pub acl: Option<Value>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Outputs / Lights ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputStatus {
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub manual_override: Option<bool>,
    /// Dimmer level 0-100, present for `RANGE` capable outputs.
    #[serde(default)]
    pub value: Option<u8>,
}

/// A switchable (optionally dimmable) output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub id: u64,
    #[serde(default)]
    pub local_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    /// `OUTLET`, `LIGHT`, `VALVE`, `PUMP`, ...
    #[serde(default, rename = "type")]
    pub output_type: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub status: Option<OutputStatus>,
    /// Epoch seconds.
    #[serde(default)]
    pub last_state_change: Option<f64>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Output {
    pub fn is_on(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.on)
    }

    pub fn is_dimmable(&self) -> bool {
        self.capabilities.iter().any(|c| c == "RANGE")
    }

    pub fn last_state_change_at(&self) -> Option<DateTime<Utc>> {
        self.last_state_change.and_then(epoch_to_datetime)
    }
}

/// Lights are outputs served from the `/lights` collection.
pub type Light = Output;

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorStatus {
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub id: u64,
    #[serde(default)]
    pub local_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    /// `temperature`, `humidity`, `brightness`, ...
    #[serde(default)]
    pub physical_quantity: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub status: Option<SensorStatus>,
    #[serde(default)]
    pub last_state_change: Option<f64>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sensor {
    pub fn value(&self) -> Option<f64> {
        self.status.as_ref().and_then(|s| s.value)
    }
}

// ── Shutters ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShutterStatus {
    /// `UP`, `DOWN`, `STOPPED`, `GOING_UP`, `GOING_DOWN`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub manual_override: Option<bool>,
    #[serde(default)]
    pub last_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shutter {
    pub id: u64,
    #[serde(default)]
    pub local_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub status: Option<ShutterStatus>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Group actions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAction {
    pub id: u64,
    #[serde(default)]
    pub local_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    /// Flat list of `<action type>, <action number>` pairs.
    #[serde(default)]
    pub actions: Vec<i64>,
    /// `SCENE` for group actions meant to be used as scenes.
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Thermostats ──────────────────────────────────────────────────────

/// Installation-wide thermostat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatMode {
    Heating,
    Cooling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatPreset {
    Auto,
    Away,
    Party,
    Vacation,
}

/// Per-preset setpoints for one direction (heating or cooling).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetTemperatures {
    #[serde(rename = "AWAY")]
    pub away: f64,
    #[serde(rename = "VACATION")]
    pub vacation: f64,
    #[serde(rename = "PARTY")]
    pub party: f64,
}

/// Payload of `thermostats/units/{id}/preset/config`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub heating: PresetTemperatures,
    pub cooling: PresetTemperatures,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermostatGroupStatus {
    #[serde(default)]
    pub mode: Option<ThermostatMode>,
    #[serde(default)]
    pub state: Option<ThermostatState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermostatGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub status: Option<ThermostatGroupStatus>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermostatUnitStatus {
    #[serde(default)]
    pub state: Option<ThermostatState>,
    #[serde(default)]
    pub preset: Option<ThermostatPreset>,
    #[serde(default)]
    pub current_setpoint: Option<f64>,
    #[serde(default)]
    pub actual_temperature: Option<f64>,
    #[serde(default)]
    pub output_0: Option<f64>,
    #[serde(default)]
    pub output_1: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermostatUnit {
    pub id: u64,
    #[serde(default)]
    pub local_id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub status: Option<ThermostatUnitStatus>,
    #[serde(default, rename = "_version")]
    pub record_version: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn output_keeps_unknown_fields() {
        let output: Output = serde_json::from_value(json!({
            "name": "Kitchen",
            "type": "OUTLET",
            "capabilities": ["ON_OFF"],
            "location": {
                "floor_coordinates": {"x": null, "y": null},
                "installation_id": 21,
                "gateway_id": 408,
                "floor_id": null,
                "room_id": null
            },
            "metadata": null,
            "status": {"on": false, "locked": false, "manual_override": false},
            "last_state_change": 1633099611.275243,
            "id": 18,
            "_version": 1.0,
            "custom": "kept"
        }))
        .unwrap();

        assert_eq!(output.id, 18);
        assert_eq!(output.output_type.as_deref(), Some("OUTLET"));
        assert!(!output.is_on());
        assert!(!output.is_dimmable());
        assert_eq!(output.location.as_ref().unwrap().installation_id, Some(21));
        assert_eq!(output.extra.get("custom"), Some(&json!("kept")));
        assert_eq!(output.last_state_change_at().unwrap().timestamp(), 1633099611);
    }

    #[test]
    fn sparse_records_parse() {
        let sensor: Sensor = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(sensor.name, "");
        assert_eq!(sensor.value(), None);
    }

    #[test]
    fn thermostat_enums_use_uppercase() {
        assert_eq!(ThermostatMode::Heating.to_string(), "HEATING");
        assert_eq!(ThermostatPreset::Vacation.to_string(), "VACATION");
        assert_eq!("off".parse::<ThermostatState>().unwrap(), ThermostatState::Off);
        assert_eq!(serde_json::to_value(ThermostatMode::Cooling).unwrap(), json!("COOLING"));
    }

    #[test]
    fn preset_config_wire_shape() {
        let cfg = PresetConfig {
            heating: PresetTemperatures {
                away: 16.0,
                vacation: 12.0,
                party: 22.0,
            },
            cooling: PresetTemperatures {
                away: 26.0,
                vacation: 30.0,
                party: 23.0,
            },
        };
        assert_eq!(
            serde_json::to_value(cfg).unwrap(),
            json!({
                "heating": {"AWAY": 16.0, "VACATION": 12.0, "PARTY": 22.0},
                "cooling": {"AWAY": 26.0, "VACATION": 30.0, "PARTY": 23.0}
            })
        );
    }
}
