// Local gateway records
//
// The gateway reports configuration and live status through separate
// actions. Configurations and status lists are index-aligned: entry N of
// a status list belongs to entry N of the configuration list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::Display;

// ── Output type ──────────────────────────────────────────────────────

/// Output kind, decoded from the gateway's numeric `type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputType {
    Outlet,
    Valve,
    Alarm,
    Appliance,
    Pump,
    Hvac,
    Generic,
    Motor,
    Ventilation,
    Heater,
    Light,
    Unknown,
}

impl OutputType {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Outlet,
            1 => Self::Valve,
            2 => Self::Alarm,
            3 => Self::Appliance,
            4 => Self::Pump,
            5 => Self::Hvac,
            6 => Self::Generic,
            7 => Self::Motor,
            8 => Self::Ventilation,
            9 => Self::Heater,
            255 => Self::Light,
            _ => Self::Unknown,
        }
    }
}

// ── Outputs ──────────────────────────────────────────────────────────

/// One entry of `get_output_configurations`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OutputConfig {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_code: Option<u8>,
    /// `O` for plain outputs, `D` for dimmers.
    #[serde(default)]
    pub module_type: Option<String>,
    #[serde(default)]
    pub room: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `get_output_status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OutputStatusEntry {
    /// 1 when on.
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub dimmer: Option<u8>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub manual_override: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOutputStatus {
    pub on: bool,
    pub locked: Option<bool>,
    pub manual_override: Option<bool>,
    pub value: Option<u8>,
}

impl From<OutputStatusEntry> for LocalOutputStatus {
    fn from(raw: OutputStatusEntry) -> Self {
        Self {
            on: raw.status == 1,
            locked: raw.locked,
            manual_override: raw.manual_override,
            value: raw.dimmer,
        }
    }
}

/// An output as seen by the local gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalOutput {
    pub id: u64,
    pub name: String,
    pub output_type: OutputType,
    /// Always `ON_OFF`; dimmer modules add `RANGE`.
    pub capabilities: Vec<String>,
    pub room: Option<u64>,
    pub status: Option<LocalOutputStatus>,
    pub extra: Map<String, Value>,
}

impl LocalOutput {
    pub(crate) fn from_parts(config: OutputConfig, status: Option<OutputStatusEntry>) -> Self {
        let mut capabilities = vec!["ON_OFF".to_owned()];
        if config.module_type.as_deref() == Some("D") {
            capabilities.push("RANGE".to_owned());
        }
        Self {
            id: config.id,
            name: config.name,
            output_type: config
                .type_code
                .map_or(OutputType::Unknown, OutputType::from_code),
            capabilities,
            room: config.room,
            status: status.map(LocalOutputStatus::from),
            extra: config.extra,
        }
    }

    pub fn is_on(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.on)
    }

    pub fn is_dimmable(&self) -> bool {
        self.capabilities.iter().any(|c| c == "RANGE")
    }
}

// ── Sensors ──────────────────────────────────────────────────────────

/// One entry of `get_sensor_configurations`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SensorConfig {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub room: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A sensor with its latest brightness, humidity and temperature readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSensor {
    pub id: u64,
    pub name: String,
    pub room: Option<u64>,
    pub brightness: Option<f64>,
    pub humidity: Option<f64>,
    pub temperature: Option<f64>,
    pub extra: Map<String, Value>,
}

impl LocalSensor {
    pub(crate) fn from_parts(
        config: SensorConfig,
        brightness: Option<f64>,
        humidity: Option<f64>,
        temperature: Option<f64>,
    ) -> Self {
        Self {
            id: config.id,
            name: config.name,
            room: config.room,
            brightness,
            humidity,
            temperature,
            extra: config.extra,
        }
    }
}

// ── Group actions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalGroupAction {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Flat `<action type>, <action number>` pairs.
    #[serde(default, deserialize_with = "actions_list")]
    pub actions: Vec<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The gateway encodes actions as `"2,5,3,1"`; accept a JSON list as well.
fn actions_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Csv(String),
        List(Vec<i64>),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::List(list) => Ok(list),
        Raw::Null => Ok(Vec::new()),
        Raw::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(serde::de::Error::custom))
            .collect(),
    }
}

// ── Merging ──────────────────────────────────────────────────────────

/// Pair each configuration with the status entry at the same index.
///
/// Configurations beyond the end of `statuses` get `None`.
pub(crate) fn merge_status<C, S>(configs: Vec<C>, statuses: Vec<S>) -> Vec<(C, Option<S>)> {
    let mut statuses = statuses.into_iter();
    configs
        .into_iter()
        .map(|config| (config, statuses.next()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn output_type_codes() {
        assert_eq!(OutputType::from_code(0), OutputType::Outlet);
        assert_eq!(OutputType::from_code(255), OutputType::Light);
        assert_eq!(OutputType::from_code(42), OutputType::Unknown);
        assert_eq!(OutputType::Hvac.to_string(), "HVAC");
    }

    #[test]
    fn dimmer_output_from_parts() {
        let config: OutputConfig = serde_json::from_value(json!({
            "name": "Vijver", "room": 255, "module_type": "D", "id": 0, "type": 255
        }))
        .unwrap();
        let status: OutputStatusEntry = serde_json::from_value(json!({
            "status": 1, "dimmer": 60, "ctimer": 0, "id": 0, "locked": false
        }))
        .unwrap();

        let output = LocalOutput::from_parts(config, Some(status));
        assert_eq!(output.output_type, OutputType::Light);
        assert_eq!(output.capabilities, vec!["ON_OFF", "RANGE"]);
        assert!(output.is_on());
        assert_eq!(output.status.unwrap().value, Some(60));
    }

    #[test]
    fn merge_is_positional() {
        let merged = merge_status(vec!["a", "b", "c"], vec![1, 2]);
        assert_eq!(merged, vec![("a", Some(1)), ("b", Some(2)), ("c", None)]);
    }

    #[test]
    fn group_action_csv_actions() {
        let ga: LocalGroupAction =
            serde_json::from_value(json!({"id": 3, "name": "SCENE", "actions": "2,5, 3,1"}))
                .unwrap();
        assert_eq!(ga.actions, vec![2, 5, 3, 1]);

        let ga: LocalGroupAction =
            serde_json::from_value(json!({"id": 4, "name": "x", "actions": [1, 2]})).unwrap();
        assert_eq!(ga.actions, vec![1, 2]);
    }
}
