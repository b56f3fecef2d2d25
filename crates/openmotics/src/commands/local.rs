//! Local gateway command handlers.

use tabled::Tabled;

use openmotics_api::LocalGateway;
use openmotics_api::local::models::{LocalGroupAction, LocalOutput, LocalSensor};

use crate::cli::{
    GlobalOpts, LocalArgs, LocalCommand, LocalGroupActionsCommand, LocalOutputsCommand,
    LocalSensorsCommand, LocalWebhookCommand,
};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

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
    #[tabled(rename = "Dimmer")]
    dimmer: String,
}

impl From<&LocalOutput> for OutputRow {
    fn from(o: &LocalOutput) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
            kind: o.output_type.to_string(),
            state: if o.is_on() { "on" } else { "off" },
            dimmer: if o.is_dimmable() {
                or_dash(o.status.as_ref().and_then(|s| s.value))
            } else {
                "-".into()
            },
        }
    }
}

fn output_detail(o: &LocalOutput) -> String {
    [
        format!("ID:           {}", o.id),
        format!("Name:         {}", o.name),
        format!("Type:         {}", o.output_type),
        format!("State:        {}", if o.is_on() { "on" } else { "off" }),
        format!("Capabilities: {}", o.capabilities.join(", ")),
        format!("Room:         {}", or_dash(o.room)),
    ]
    .join("\n")
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Temperature")]
    temperature: String,
    #[tabled(rename = "Humidity")]
    humidity: String,
    #[tabled(rename = "Brightness")]
    brightness: String,
}

impl From<&LocalSensor> for SensorRow {
    fn from(s: &LocalSensor) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            temperature: or_dash(s.temperature),
            humidity: or_dash(s.humidity),
            brightness: or_dash(s.brightness),
        }
    }
}

fn sensor_detail(s: &LocalSensor) -> String {
    [
        format!("ID:          {}", s.id),
        format!("Name:        {}", s.name),
        format!("Temperature: {}", or_dash(s.temperature)),
        format!("Humidity:    {}", or_dash(s.humidity)),
        format!("Brightness:  {}", or_dash(s.brightness)),
        format!("Room:        {}", or_dash(s.room)),
    ]
    .join("\n")
}

#[derive(Tabled)]
struct GroupActionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Actions")]
    actions: usize,
}

impl From<&LocalGroupAction> for GroupActionRow {
    fn from(g: &LocalGroupAction) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
            actions: g.actions.len() / 2,
        }
    }
}

fn groupaction_detail(g: &LocalGroupAction) -> String {
    let actions = g
        .actions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    [
        format!("ID:      {}", g.id),
        format!("Name:    {}", g.name),
        format!("Actions: {actions}"),
    ]
    .join("\n")
}

fn print_groupactions(all: &[LocalGroupAction], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, all, GroupActionRow::from, |g| {
        g.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    gateway: &LocalGateway,
    args: LocalArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LocalCommand::Login => {
            gateway.login().await?;
            if !global.quiet {
                eprintln!("Logged in to {}", gateway.base_url());
            }
            Ok(())
        }

        LocalCommand::Outputs(outputs_args) => {
            let outputs = gateway.outputs();
            match outputs_args.command {
                LocalOutputsCommand::List => {
                    let all = outputs.get_all().await?;
                    let out = output::render_list(&global.output, &all, OutputRow::from, |o| {
                        o.id.to_string()
                    })?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                LocalOutputsCommand::Get { id } => {
                    let found = outputs
                        .get_by_id(id)
                        .await?
                        .ok_or_else(|| util::not_found("output", id, "local outputs list"))?;
                    let out = output::render_single(&global.output, &found, output_detail, |o| {
                        o.id.to_string()
                    })?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                LocalOutputsCommand::Toggle { id } => {
                    let resp = outputs.toggle(id).await?;
                    util::report_action(&resp, global, &format!("Output {id} toggled"))
                }
                LocalOutputsCommand::On { id, value } => {
                    let resp = outputs.turn_on(id, value).await?;
                    util::report_action(&resp, global, &format!("Output {id} on"))
                }
                LocalOutputsCommand::Off { id } => {
                    let resp = outputs.turn_off(id).await?;
                    util::report_action(&resp, global, &format!("Output {id} off"))
                }
            }
        }

        LocalCommand::Sensors(sensors_args) => {
            let sensors = gateway.sensors();
            match sensors_args.command {
                LocalSensorsCommand::List => {
                    let all = sensors.get_all().await?;
                    let out = output::render_list(&global.output, &all, SensorRow::from, |s| {
                        s.id.to_string()
                    })?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                LocalSensorsCommand::Get { id } => {
                    let found = sensors
                        .get_by_id(id)
                        .await?
                        .ok_or_else(|| util::not_found("sensor", id, "local sensors list"))?;
                    let out = output::render_single(&global.output, &found, sensor_detail, |s| {
                        s.id.to_string()
                    })?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
            }
        }

        LocalCommand::Groupactions(ga_args) => {
            let groupactions = gateway.groupactions();
            match ga_args.command {
                LocalGroupActionsCommand::List => {
                    print_groupactions(&groupactions.get_all().await?, global)
                }
                LocalGroupActionsCommand::Usage { usage } => {
                    print_groupactions(&groupactions.by_usage(&usage).await?, global)
                }
                LocalGroupActionsCommand::Scenes => {
                    print_groupactions(&groupactions.scenes().await?, global)
                }
                LocalGroupActionsCommand::Get { id } => {
                    let found = groupactions.get_by_id(id).await?.ok_or_else(|| {
                        util::not_found("group action", id, "local groupactions list")
                    })?;
                    let out =
                        output::render_single(&global.output, &found, groupaction_detail, |g| {
                            g.id.to_string()
                        })?;
                    output::print_output(&out, global.quiet);
                    Ok(())
                }
                LocalGroupActionsCommand::Trigger { id } => {
                    let resp = groupactions.trigger(id).await?;
                    util::report_action(&resp, global, &format!("Group action {id} triggered"))
                }
            }
        }

        LocalCommand::Webhook(webhook_args) => match webhook_args.command {
            LocalWebhookCommand::Subscribe { installation_id } => {
                let resp = gateway.subscribe_webhook(installation_id).await?;
                util::report_action(&resp, global, "Subscribed to change events")
            }
            LocalWebhookCommand::Unsubscribe => {
                let resp = gateway.unsubscribe_webhook().await?;
                util::report_action(&resp, global, "Event subscription removed")
            }
        },
    }
}
