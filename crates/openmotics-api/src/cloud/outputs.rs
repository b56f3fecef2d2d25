// Output endpoints: `/base/installations/{id}/outputs`

use serde_json::json;

use super::models::Output;
use super::{OpenMoticsCloud, clamp_percent};
use crate::error::Error;
use crate::transport::{ApiResponse, RequestOptions};

/// Switchable outputs of the current installation.
#[derive(Debug, Clone, Copy)]
pub struct Outputs<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Outputs<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<Output>, Error> {
        let path = self.cloud.installation_path("/outputs")?;
        let options = RequestOptions::new().param_opt("filter", filter);
        self.cloud.get(&path, options).await?.data()
    }

    pub async fn get_by_id(&self, output_id: u64) -> Result<Output, Error> {
        let path = self.cloud.installation_path(&format!("/outputs/{output_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn toggle(&self, output_id: u64) -> Result<ApiResponse, Error> {
        self.action(output_id, "toggle", RequestOptions::new()).await
    }

    /// Turn on, optionally at dimmer level `value` (clamped to 0-100).
    pub async fn turn_on(&self, output_id: u64, value: Option<i64>) -> Result<ApiResponse, Error> {
        let mut options = RequestOptions::new();
        if let Some(v) = value {
            options = options.json(json!({ "value": clamp_percent(v) }));
        }
        self.action(output_id, "turn_on", options).await
    }

    pub async fn turn_off(&self, output_id: u64) -> Result<ApiResponse, Error> {
        self.action(output_id, "turn_off", RequestOptions::new()).await
    }

    async fn action(
        &self,
        output_id: u64,
        action: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/outputs/{output_id}/{action}"))?;
        self.cloud.post(&path, options).await
    }
}
