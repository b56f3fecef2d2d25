// Sensor endpoints (read-only).

use super::OpenMoticsCloud;
use super::models::Sensor;
use crate::error::Error;
use crate::transport::RequestOptions;

#[derive(Debug, Clone, Copy)]
pub struct Sensors<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Sensors<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    /// `GET /base/installations/{id}/sensors`
    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<Sensor>, Error> {
        let path = self.cloud.installation_path("/sensors")?;
        let options = RequestOptions::new().param_opt("filter", filter);
        self.cloud.get(&path, options).await?.data()
    }

    /// `GET /base/installations/{id}/sensors/{sensor_id}`
    pub async fn get_by_id(&self, sensor_id: u64) -> Result<Sensor, Error> {
        let path = self.cloud.installation_path(&format!("/sensors/{sensor_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }
}
