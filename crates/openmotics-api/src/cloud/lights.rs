// Light endpoints: `/base/installations/{id}/lights`

use serde_json::json;

use super::models::Light;
use super::{OpenMoticsCloud, clamp_percent};
use crate::error::Error;
use crate::transport::{ApiResponse, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Lights<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Lights<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<Light>, Error> {
        let path = self.cloud.installation_path("/lights")?;
        let options = RequestOptions::new().param_opt("filter", filter);
        self.cloud.get(&path, options).await?.data()
    }

    pub async fn get_by_id(&self, light_id: u64) -> Result<Light, Error> {
        let path = self.cloud.installation_path(&format!("/lights/{light_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn toggle(&self, light_id: u64) -> Result<ApiResponse, Error> {
        self.action(light_id, "toggle", RequestOptions::new()).await
    }

    /// Turn on, optionally at `brightness` percent (clamped to 0-100).
    pub async fn turn_on(
        &self,
        light_id: u64,
        brightness: Option<i64>,
    ) -> Result<ApiResponse, Error> {
        let mut options = RequestOptions::new();
        if let Some(v) = brightness {
            options = options.json(json!({ "value": clamp_percent(v) }));
        }
        self.action(light_id, "turn_on", options).await
    }

    pub async fn turn_off(&self, light_id: u64) -> Result<ApiResponse, Error> {
        self.action(light_id, "turn_off", RequestOptions::new()).await
    }

    async fn action(
        &self,
        light_id: u64,
        action: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/lights/{light_id}/{action}"))?;
        self.cloud.post(&path, options).await
    }
}
