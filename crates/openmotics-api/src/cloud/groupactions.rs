// Group action (scene) endpoints.

use serde_json::json;

use super::OpenMoticsCloud;
use super::models::GroupAction;
use crate::error::Error;
use crate::transport::{ApiResponse, RequestOptions};

#[derive(Debug, Clone, Copy)]
pub struct GroupActions<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> GroupActions<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<GroupAction>, Error> {
        let path = self.cloud.installation_path("/groupactions")?;
        let options = RequestOptions::new().param_opt("filter", filter);
        self.cloud.get(&path, options).await?.data()
    }

    pub async fn get_by_id(&self, groupaction_id: u64) -> Result<GroupAction, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/groupactions/{groupaction_id}"))?;
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }

    /// `POST .../groupactions/{id}/trigger`
    pub async fn trigger(&self, groupaction_id: u64) -> Result<ApiResponse, Error> {
        let path = self
            .cloud
            .installation_path(&format!("/groupactions/{groupaction_id}/trigger"))?;
        self.cloud.post(&path, RequestOptions::new()).await
    }

    /// Group actions whose intended usage matches, e.g. `SCENE`.
    pub async fn by_usage(&self, usage: &str) -> Result<Vec<GroupAction>, Error> {
        let filter = json!({ "usage": usage }).to_string();
        self.get_all(Some(&filter)).await
    }

    /// Group actions meant to be used as scenes.
    pub async fn scenes(&self) -> Result<Vec<GroupAction>, Error> {
        self.by_usage("SCENE").await
    }
}
