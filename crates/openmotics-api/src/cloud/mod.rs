// OpenMotics cloud API
//
// `OpenMoticsCloud` is the entry point. It owns a `CloudClient` transport
// and the current installation id, and hands out one borrowed accessor
// per resource kind.

pub mod client;
pub mod models;

mod api;
mod groupactions;
mod installations;
mod lights;
mod outputs;
mod sensors;
mod shutters;
mod thermostats;

pub use api::{OpenMoticsCloud, OpenMoticsCloudBuilder};
pub use client::CloudClient;
pub use groupactions::GroupActions;
pub use installations::Installations;
pub use lights::Lights;
pub use outputs::Outputs;
pub use sensors::Sensors;
pub use shutters::Shutters;
pub use thermostats::{ThermostatGroups, ThermostatUnits, Thermostats};

/// Production cloud API root.
pub const CLOUD_BASE_URL: &str = "https://cloud.openmotics.com/api/v1.1";

/// Event types requested by `subscribe_webhook`.
pub const WEBHOOK_EVENT_TYPES: [&str; 6] = [
    "OUTPUT_CHANGE",
    "SENSOR_CHANGE",
    "SHUTTER_CHANGE",
    "THERMOSTAT_CHANGE",
    "THERMOSTAT_GROUP_CHANGE",
    "VENTILATION_CHANGE",
];

/// Clamp a dimmer level to the 0-100 range the API accepts.
pub(crate) fn clamp_percent(value: i64) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimmer_values_are_clamped() {
        assert_eq!(clamp_percent(-5), 0);
        assert_eq!(clamp_percent(42), 42);
        assert_eq!(clamp_percent(250), 100);
    }
}
