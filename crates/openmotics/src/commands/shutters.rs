//! Shutter command handlers.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::Shutter;

use crate::cli::{GlobalOpts, ShuttersArgs, ShuttersCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

#[derive(Tabled)]
struct ShutterRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Locked")]
    locked: String,
}

impl From<&Shutter> for ShutterRow {
    fn from(s: &Shutter) -> Self {
        let status = s.status.as_ref();
        Self {
            id: s.id,
            name: s.name.clone(),
            state: or_dash(status.and_then(|st| st.state.as_deref())),
            position: or_dash(status.and_then(|st| st.position)),
            locked: or_dash(status.and_then(|st| st.locked)),
        }
    }
}

fn detail(s: &Shutter) -> String {
    let status = s.status.as_ref();
    [
        format!("ID:           {}", s.id),
        format!("Name:         {}", s.name),
        format!("State:        {}", or_dash(status.and_then(|st| st.state.as_deref()))),
        format!("Position:     {}", or_dash(status.and_then(|st| st.position))),
        format!("Locked:       {}", or_dash(status.and_then(|st| st.locked))),
        format!("Capabilities: {}", s.capabilities.join(", ")),
        format!("Room:         {}", util::room(s.location.as_ref())),
    ]
    .join("\n")
}

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: ShuttersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let shutters = cloud.shutters();
    match args.command {
        ShuttersCommand::List(list) => {
            let all = shutters.get_all(list.filter.as_deref()).await?;
            let out =
                output::render_list(&global.output, &all, ShutterRow::from, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShuttersCommand::Get { id } => {
            let shutter = shutters.get_by_id(id).await?;
            let out =
                output::render_single(&global.output, &shutter, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShuttersCommand::Up { id } => {
            let resp = shutters.move_up(id).await?;
            util::report_action(&resp, global, &format!("Shutter {id} moving up"))
        }
        ShuttersCommand::Down { id } => {
            let resp = shutters.move_down(id).await?;
            util::report_action(&resp, global, &format!("Shutter {id} moving down"))
        }
        ShuttersCommand::Stop { id } => {
            let resp = shutters.stop(id).await?;
            util::report_action(&resp, global, &format!("Shutter {id} stopped"))
        }
        ShuttersCommand::Position { id, position } => {
            let resp = shutters.change_position(id, position).await?;
            util::report_action(
                &resp,
                global,
                &format!("Shutter {id} moving to position {position}"),
            )
        }
        ShuttersCommand::Lock { id } => {
            let resp = shutters.lock(id).await?;
            util::report_action(&resp, global, &format!("Shutter {id} locked"))
        }
        ShuttersCommand::Unlock { id } => {
            let resp = shutters.unlock(id).await?;
            util::report_action(&resp, global, &format!("Shutter {id} unlocked"))
        }
    }
}
