// Thermostat endpoints: installation-wide mode/state, groups, and units.

use serde_json::json;

use super::OpenMoticsCloud;
use super::models::{
    PresetConfig, ThermostatGroup, ThermostatMode, ThermostatPreset, ThermostatState,
    ThermostatUnit,
};
use crate::error::Error;
use crate::transport::{ApiResponse, RequestOptions};

// ── Installation-wide ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Thermostats<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Thermostats<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    pub fn groups(&self) -> ThermostatGroups<'a> {
        ThermostatGroups { cloud: self.cloud }
    }

    pub fn units(&self) -> ThermostatUnits<'a> {
        ThermostatUnits { cloud: self.cloud }
    }

    /// `POST .../thermostats/mode` with `{"mode": "HEATING" | "COOLING"}`
    pub async fn set_mode(&self, mode: ThermostatMode) -> Result<ApiResponse, Error> {
        let path = self.cloud.installation_path("/thermostats/mode")?;
        let options = RequestOptions::new().json(json!({ "mode": mode.to_string() }));
        self.cloud.post(&path, options).await
    }

    /// `POST .../thermostats/state` with `{"state": "ON" | "OFF"}`
    pub async fn set_state(&self, state: ThermostatState) -> Result<ApiResponse, Error> {
        let path = self.cloud.installation_path("/thermostats/state")?;
        let options = RequestOptions::new().json(json!({ "state": state.to_string() }));
        self.cloud.post(&path, options).await
    }
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ThermostatGroups<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl ThermostatGroups<'_> {
    pub async fn get_all(&self) -> Result<Vec<ThermostatGroup>, Error> {
        let path = self.cloud.installation_path("/thermostats/groups")?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn get_by_id(&self, group_id: u64) -> Result<ThermostatGroup, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/thermostats/groups/{group_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn set_mode(&self, group_id: u64, mode: ThermostatMode) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/thermostats/groups/{group_id}/mode"))?;
        let options = RequestOptions::new().json(json!({ "mode": mode.to_string() }));
        self.cloud.post(&path, options).await
    }
}

// ── Units ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ThermostatUnits<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl ThermostatUnits<'_> {
    pub async fn get_all(&self) -> Result<Vec<ThermostatUnit>, Error> {
        let path = self.cloud.installation_path("/thermostats/units")?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn get_by_id(&self, unit_id: u64) -> Result<ThermostatUnit, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/thermostats/units/{unit_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn set_state(&self, unit_id: u64, state: ThermostatState) -> Result<ApiResponse, Error> {
        let options = RequestOptions::new().json(json!({ "state": state.to_string() }));
        self.post(unit_id, "state", options).await
    }

    /// Set the target temperature in degrees Celsius.
    pub async fn set_temperature(&self, unit_id: u64, temperature: f64) -> Result<ApiResponse, Error> {
        let options = RequestOptions::new().json(json!({ "temperature": temperature }));
        self.post(unit_id, "setpoint", options).await
    }

    pub async fn set_preset(&self, unit_id: u64, preset: ThermostatPreset) -> Result<ApiResponse, Error> {
        let options = RequestOptions::new().json(json!({ "preset": preset.to_string() }));
        self.post(unit_id, "preset", options).await
    }

    /// Setpoints used by the AWAY, VACATION and PARTY presets.
    pub async fn set_preset_config(
        &self,
        unit_id: u64,
        config: PresetConfig,
    ) -> Result<ApiResponse, Error> {
        let body = serde_json::to_value(config)
            .map_err(|e| Error::validation(format!("invalid preset config: {e}"), String::new()))?;
        self.post(unit_id, "preset/config", RequestOptions::new().json(body))
            .await
    }

    async fn post(
        &self,
        unit_id: u64,
        action: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/thermostats/units/{unit_id}/{action}"))?;
        self.cloud.post(&path, options).await
    }
}
