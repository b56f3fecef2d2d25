// Local sensors: configuration plus brightness/humidity/temperature status.

use super::models::{LocalSensor, SensorConfig, merge_status};
use super::{LocalGateway, action_field};
use crate::error::Error;

#[derive(Debug, Clone, Copy)]
pub struct LocalSensors<'a> {
    gateway: &'a LocalGateway,
}

impl<'a> LocalSensors<'a> {
    pub(crate) fn new(gateway: &'a LocalGateway) -> Self {
        Self { gateway }
    }

    async fn status_list(&self, action: &str) -> Result<Vec<Option<f64>>, Error> {
        action_field(self.gateway.exec_action(action, &[]).await?, "status")
    }

    pub async fn get_all(&self) -> Result<Vec<LocalSensor>, Error> {
        let configs: Vec<SensorConfig> = action_field(
            self.gateway
                .exec_action("get_sensor_configurations", &[])
                .await?,
            "config",
        )?;
        let brightness = self.status_list("get_sensor_brightness_status").await?;
        let humidity = self.status_list("get_sensor_humidity_status").await?;
        let temperature = self.status_list("get_sensor_temperature_status").await?;

        let merged = merge_status(configs, brightness);
        let merged = merge_status(merged, humidity);
        let merged = merge_status(merged, temperature);

        Ok(merged
            .into_iter()
            .map(|(((config, b), h), t)| {
                LocalSensor::from_parts(config, b.flatten(), h.flatten(), t.flatten())
            })
            .collect())
    }

    pub async fn get_by_id(&self, sensor_id: u64) -> Result<Option<LocalSensor>, Error> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|s| s.id == sensor_id))
    }
}
