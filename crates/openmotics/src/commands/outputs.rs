//! Output and light command handlers.
//!
//! Lights are outputs filtered server-side, so both share rows and detail
//! views.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::Output;

use crate::cli::{GlobalOpts, OutputsArgs, OutputsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutputRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "State")]
    state: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Room")]
    room: String,
}

impl From<&Output> for OutputRow {
    fn from(o: &Output) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
            kind: or_dash(o.output_type.as_deref()),
            state: if o.is_on() { "on" } else { "off" },
            value: or_dash(o.status.as_ref().and_then(|s| s.value)),
            room: util::room(o.location.as_ref()),
        }
    }
}

fn detail(o: &Output) -> String {
    let mut lines = vec![
        format!("ID:           {}", o.id),
        format!("Name:         {}", o.name),
        format!("Type:         {}", o.output_type.as_deref().unwrap_or("-")),
        format!("State:        {}", if o.is_on() { "on" } else { "off" }),
        format!("Capabilities: {}", o.capabilities.join(", ")),
        format!("Room:         {}", util::room(o.location.as_ref())),
    ];
    if o.is_dimmable() {
        lines.push(format!(
            "Value:        {}",
            or_dash(o.status.as_ref().and_then(|s| s.value))
        ));
    }
    if let Some(changed) = o.last_state_change_at() {
        lines.push(format!("Changed:      {}", changed.to_rfc3339()));
    }
    lines.join("\n")
}

fn print_list(outputs: &[Output], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, outputs, OutputRow::from, |o| o.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_one(o: &Output, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, o, detail, |o| o.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: OutputsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outputs = cloud.outputs();
    match args.command {
        OutputsCommand::List(list) => print_list(&outputs.get_all(list.filter.as_deref()).await?, global),
        OutputsCommand::Get { id } => print_one(&outputs.get_by_id(id).await?, global),
        OutputsCommand::Toggle { id } => {
            let resp = outputs.toggle(id).await?;
            util::report_action(&resp, global, &format!("Output {id} toggled"))
        }
        OutputsCommand::On { id, value } => {
            let resp = outputs.turn_on(id, value).await?;
            util::report_action(&resp, global, &format!("Output {id} on"))
        }
        OutputsCommand::Off { id } => {
            let resp = outputs.turn_off(id).await?;
            util::report_action(&resp, global, &format!("Output {id} off"))
        }
    }
}

pub async fn handle_lights(
    cloud: &OpenMoticsCloud,
    args: OutputsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let lights = cloud.lights();
    match args.command {
        OutputsCommand::List(list) => print_list(&lights.get_all(list.filter.as_deref()).await?, global),
        OutputsCommand::Get { id } => print_one(&lights.get_by_id(id).await?, global),
        OutputsCommand::Toggle { id } => {
            let resp = lights.toggle(id).await?;
            util::report_action(&resp, global, &format!("Light {id} toggled"))
        }
        OutputsCommand::On { id, value } => {
            let resp = lights.turn_on(id, value).await?;
            util::report_action(&resp, global, &format!("Light {id} on"))
        }
        OutputsCommand::Off { id } => {
            let resp = lights.turn_off(id).await?;
            util::report_action(&resp, global, &format!("Light {id} off"))
        }
    }
}
