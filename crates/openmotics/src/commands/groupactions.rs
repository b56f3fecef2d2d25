//! Group action command handlers.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::GroupAction;

use crate::cli::{GlobalOpts, GroupActionsArgs, GroupActionsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

#[derive(Tabled)]
struct GroupActionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Actions")]
    actions: usize,
}

impl From<&GroupAction> for GroupActionRow {
    fn from(g: &GroupAction) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
            usage: or_dash(g.usage.as_deref()),
            actions: g.actions.len() / 2,
        }
    }
}

fn detail(g: &GroupAction) -> String {
    let actions = g
        .actions
        .chunks(2)
        .map(|pair| pair.iter().map(ToString::to_string).collect::<Vec<_>>().join(":"))
        .collect::<Vec<_>>()
        .join(" ");
    [
        format!("ID:      {}", g.id),
        format!("Name:    {}", g.name),
        format!("Usage:   {}", g.usage.as_deref().unwrap_or("-")),
        format!("Actions: {actions}"),
    ]
    .join("\n")
}

fn print_list(all: &[GroupAction], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, all, GroupActionRow::from, |g| {
        g.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: GroupActionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let groupactions = cloud.groupactions();
    match args.command {
        GroupActionsCommand::List(list) => {
            print_list(&groupactions.get_all(list.filter.as_deref()).await?, global)
        }
        GroupActionsCommand::Usage { usage } => {
            print_list(&groupactions.by_usage(&usage).await?, global)
        }
        GroupActionsCommand::Scenes => print_list(&groupactions.scenes().await?, global),

        GroupActionsCommand::Get { id } => {
            let ga = groupactions.get_by_id(id).await?;
            let out = output::render_single(&global.output, &ga, detail, |g| g.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupActionsCommand::Trigger { id } => {
            let resp = groupactions.trigger(id).await?;
            util::report_action(&resp, global, &format!("Group action {id} triggered"))
        }
    }
}
