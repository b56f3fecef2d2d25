//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod groupactions;
pub mod installations;
pub mod local;
pub mod outputs;
pub mod sensors;
pub mod shutters;
pub mod thermostats;
pub mod util;
pub mod webhook;

use openmotics_api::OpenMoticsCloud;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a cloud command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cloud: &OpenMoticsCloud,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Installations(args) => installations::handle(cloud, args, global).await,
        Command::Outputs(args) => outputs::handle(cloud, args, global).await,
        Command::Lights(args) => outputs::handle_lights(cloud, args, global).await,
        Command::Sensors(args) => sensors::handle(cloud, args, global).await,
        Command::Shutters(args) => shutters::handle(cloud, args, global).await,
        Command::Groupactions(args) => groupactions::handle(cloud, args, global).await,
        Command::Thermostats(args) => thermostats::handle(cloud, args, global).await,
        Command::Webhook(args) => webhook::handle(cloud, args, global).await,
        Command::Local(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "not a cloud command".into(),
        }),
    }
}
