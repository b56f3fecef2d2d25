//! Cloud webhook subscription handlers.

use openmotics_api::OpenMoticsCloud;

use crate::cli::{GlobalOpts, WebhookArgs, WebhookCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: WebhookArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WebhookCommand::Subscribe => {
            let resp = cloud.subscribe_webhook().await?;
            util::report_action(&resp, global, "Subscribed to change events")
        }
        WebhookCommand::Unsubscribe => {
            let resp = cloud.unsubscribe_webhook().await?;
            util::report_action(&resp, global, "Event subscription removed")
        }
    }
}
