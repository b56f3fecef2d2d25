// Local group actions.

use super::models::LocalGroupAction;
use super::{LocalGateway, action_field};
use crate::error::Error;
use crate::transport::{ApiResponse, ParamValue};

#[derive(Debug, Clone, Copy)]
pub struct LocalGroupActions<'a> {
    gateway: &'a LocalGateway,
}

impl<'a> LocalGroupActions<'a> {
    pub(crate) fn new(gateway: &'a LocalGateway) -> Self {
        Self { gateway }
    }

    pub async fn get_all(&self) -> Result<Vec<LocalGroupAction>, Error> {
        action_field(
            self.gateway
                .exec_action("get_group_action_configurations", &[])
                .await?,
            "config",
        )
    }

    pub async fn get_by_id(&self, groupaction_id: u64) -> Result<Option<LocalGroupAction>, Error> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .find(|g| g.id == groupaction_id))
    }

    pub async fn trigger(&self, groupaction_id: u64) -> Result<ApiResponse, Error> {
        let params = [("group_action_id", ParamValue::from(groupaction_id))];
        self.gateway.exec_action("do_group_action", &params).await
    }

    /// The gateway has no usage field; group actions are matched by name.
    pub async fn by_usage(&self, usage: &str) -> Result<Vec<LocalGroupAction>, Error> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|g| g.name == usage)
            .collect())
    }

    pub async fn scenes(&self) -> Result<Vec<LocalGroupAction>, Error> {
        self.by_usage("SCENE").await
    }
}
