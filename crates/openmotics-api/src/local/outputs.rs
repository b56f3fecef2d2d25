// Local outputs: configuration merged with live status.

use tracing::debug;

use super::models::{LocalOutput, OutputConfig, OutputStatusEntry, merge_status};
use super::{LocalGateway, action_field};
use crate::cloud::clamp_percent;
use crate::error::Error;
use crate::transport::{ApiResponse, ParamValue};

#[derive(Debug, Clone, Copy)]
pub struct LocalOutputs<'a> {
    gateway: &'a LocalGateway,
}

impl<'a> LocalOutputs<'a> {
    pub(crate) fn new(gateway: &'a LocalGateway) -> Self {
        Self { gateway }
    }

    /// Every output with its current status.
    pub async fn get_all(&self) -> Result<Vec<LocalOutput>, Error> {
        let configs: Vec<OutputConfig> = action_field(
            self.gateway
                .exec_action("get_output_configurations", &[])
                .await?,
            "config",
        )?;
        let statuses: Vec<OutputStatusEntry> = action_field(
            self.gateway.exec_action("get_output_status", &[]).await?,
            "status",
        )?;
        debug!(outputs = configs.len(), statuses = statuses.len(), "merging output status");

        Ok(merge_status(configs, statuses)
            .into_iter()
            .map(|(config, status)| LocalOutput::from_parts(config, status))
            .collect())
    }

    pub async fn get_by_id(&self, output_id: u64) -> Result<Option<LocalOutput>, Error> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|o| o.id == output_id))
    }

    /// Switch off when on, on when off.
    pub async fn toggle(&self, output_id: u64) -> Result<ApiResponse, Error> {
        let Some(output) = self.get_by_id(output_id).await? else {
            return Err(Error::validation(
                format!("no output with id {output_id}"),
                String::new(),
            ));
        };
        if output.is_on() {
            self.turn_off(output_id).await
        } else {
            self.turn_on(output_id, None).await
        }
    }

    /// Turn on, optionally at dimmer level `value` (clamped to 0-100).
    pub async fn turn_on(&self, output_id: u64, value: Option<i64>) -> Result<ApiResponse, Error> {
        let mut params = vec![
            ("id", ParamValue::from(output_id)),
            ("is_on", ParamValue::from(true)),
        ];
        if let Some(v) = value {
            params.push(("dimmer", ParamValue::from(u64::from(clamp_percent(v)))));
        }
        self.gateway.exec_action("set_output", &params).await
    }

    pub async fn turn_off(&self, output_id: u64) -> Result<ApiResponse, Error> {
        let params = [
            ("id", ParamValue::from(output_id)),
            ("is_on", ParamValue::from(false)),
        ];
        self.gateway.exec_action("set_output", &params).await
    }
}
