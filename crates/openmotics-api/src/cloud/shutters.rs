// Shutter endpoints: `/base/installations/{id}/shutters`

use serde_json::json;

use super::OpenMoticsCloud;
use super::models::Shutter;
use crate::error::Error;
use crate::transport::{ApiResponse, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct Shutters<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Shutters<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<Shutter>, Error> {
        let path = self.cloud.installation_path("/shutters")?;
        let options = RequestOptions::new().param_opt("filter", filter);
        self.cloud.get(&path, options).await?.data()
    }

    pub async fn get_by_id(&self, shutter_id: u64) -> Result<Shutter, Error> {
        let path = self.cloud.installation_path(&format!("/shutters/{shutter_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    pub async fn move_up(&self, shutter_id: u64) -> Result<ApiResponse, Error> {
        self.action(shutter_id, "up", RequestOptions::new()).await
    }

    pub async fn move_down(&self, shutter_id: u64) -> Result<ApiResponse, Error> {
        self.action(shutter_id, "down", RequestOptions::new()).await
    }

    pub async fn stop(&self, shutter_id: u64) -> Result<ApiResponse, Error> {
        self.action(shutter_id, "stop", RequestOptions::new()).await
    }

    /// Move to `position`, in the shutter's own step units.
    pub async fn change_position(
        &self,
        shutter_id: u64,
        position: i64,
    ) -> Result<ApiResponse, Error> {
        let options = RequestOptions::new().json(json!({ "position": position }));
        self.action(shutter_id, "change_position", options).await
    }

    pub async fn lock(&self, shutter_id: u64) -> Result<ApiResponse, Error> {
        self.action(shutter_id, "lock", RequestOptions::new()).await
    }

    pub async fn unlock(&self, shutter_id: u64) -> Result<ApiResponse, Error> {
        self.action(shutter_id, "unlock", RequestOptions::new()).await
    }

    async fn action(
        &self,
        shutter_id: u64,
        action: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/shutters/{shutter_id}/{action}"))?;
        self.cloud.post(&path, options).await
    }
}
