// Installation listing. Not scoped to the current installation id.

use super::OpenMoticsCloud;
use super::models::Installation;
use crate::error::Error;
use crate::transport::RequestOptions;

/// Installations visible to the authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct Installations<'a> {
    cloud: &'a OpenMoticsCloud,
}

impl<'a> Installations<'a> {
    pub(crate) fn new(cloud: &'a OpenMoticsCloud) -> Self {
        Self { cloud }
    }

    /// `GET /base/installations`
    ///
    /// `filter` is URL-encoded JSON, e.g. `{"openmotics":{"platform":"CLASSIC"}}`.
    pub async fn get_all(&self, filter: Option<&str>) -> Result<Vec<Installation>, Error> {
        let options = RequestOptions::new().param_opt("filter", filter.filter(|f| !f.is_empty()));
        self.cloud.get("/base/installations", options).await?.data()
    }

    /// `GET /base/installations/{id}`
    pub async fn get_by_id(&self, installation_id: u64) -> Result<Installation, Error> {
        let path = format!("/base/installations/{installation_id}");
        self.cloud.get(&path, RequestOptions::new()).await?.data()
    }
}
