//! Thermostat command handlers.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::{
    PresetConfig, PresetTemperatures, ThermostatGroup, ThermostatUnit,
};

use crate::cli::{
    GlobalOpts, ThermostatGroupsArgs, ThermostatGroupsCommand, ThermostatUnitsArgs,
    ThermostatUnitsCommand, ThermostatsArgs, ThermostatsCommand,
};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&ThermostatGroup> for GroupRow {
    fn from(g: &ThermostatGroup) -> Self {
        let status = g.status.as_ref();
        Self {
            id: g.id,
            name: g.name.clone(),
            mode: or_dash(status.and_then(|s| s.mode)),
            state: or_dash(status.and_then(|s| s.state)),
        }
    }
}

fn group_detail(g: &ThermostatGroup) -> String {
    let status = g.status.as_ref();
    [
        format!("ID:           {}", g.id),
        format!("Name:         {}", g.name),
        format!("Mode:         {}", or_dash(status.and_then(|s| s.mode))),
        format!("State:        {}", or_dash(status.and_then(|s| s.state))),
        format!("Capabilities: {}", g.capabilities.join(", ")),
    ]
    .join("\n")
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Preset")]
    preset: String,
    #[tabled(rename = "Setpoint")]
    setpoint: String,
    #[tabled(rename = "Actual")]
    actual: String,
}

impl From<&ThermostatUnit> for UnitRow {
    fn from(u: &ThermostatUnit) -> Self {
        let status = u.status.as_ref();
        Self {
            id: u.id,
            name: u.name.clone(),
            state: or_dash(status.and_then(|s| s.state)),
            preset: or_dash(status.and_then(|s| s.preset)),
            setpoint: or_dash(status.and_then(|s| s.current_setpoint)),
            actual: or_dash(status.and_then(|s| s.actual_temperature)),
        }
    }
}

fn unit_detail(u: &ThermostatUnit) -> String {
    let status = u.status.as_ref();
    [
        format!("ID:       {}", u.id),
        format!("Name:     {}", u.name),
        format!("State:    {}", or_dash(status.and_then(|s| s.state))),
        format!("Preset:   {}", or_dash(status.and_then(|s| s.preset))),
        format!("Setpoint: {}", or_dash(status.and_then(|s| s.current_setpoint))),
        format!("Actual:   {}", or_dash(status.and_then(|s| s.actual_temperature))),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: ThermostatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ThermostatsCommand::Mode { mode } => {
            let resp = cloud.thermostats().set_mode(mode).await?;
            util::report_action(&resp, global, &format!("Thermostat mode set to {mode}"))
        }
        ThermostatsCommand::State { state } => {
            let resp = cloud.thermostats().set_state(state).await?;
            util::report_action(&resp, global, &format!("Thermostats switched {state}"))
        }
        ThermostatsCommand::Groups(args) => handle_groups(cloud, args, global).await,
        ThermostatsCommand::Units(args) => handle_units(cloud, args, global).await,
    }
}

async fn handle_groups(
    cloud: &OpenMoticsCloud,
    args: ThermostatGroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let groups = cloud.thermostats().groups();
    match args.command {
        ThermostatGroupsCommand::List => {
            let all = groups.get_all().await?;
            let out =
                output::render_list(&global.output, &all, GroupRow::from, |g| g.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ThermostatGroupsCommand::Get { id } => {
            let group = groups.get_by_id(id).await?;
            let out =
                output::render_single(&global.output, &group, group_detail, |g| g.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ThermostatGroupsCommand::Mode { id, mode } => {
            let resp = groups.set_mode(id, mode).await?;
            util::report_action(&resp, global, &format!("Group {id} mode set to {mode}"))
        }
    }
}

async fn handle_units(
    cloud: &OpenMoticsCloud,
    args: ThermostatUnitsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let units = cloud.thermostats().units();
    match args.command {
        ThermostatUnitsCommand::List => {
            let all = units.get_all().await?;
            let out =
                output::render_list(&global.output, &all, UnitRow::from, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ThermostatUnitsCommand::Get { id } => {
            let unit = units.get_by_id(id).await?;
            let out =
                output::render_single(&global.output, &unit, unit_detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        ThermostatUnitsCommand::State { id, state } => {
            let resp = units.set_state(id, state).await?;
            util::report_action(&resp, global, &format!("Unit {id} switched {state}"))
        }
        ThermostatUnitsCommand::Temperature { id, temperature } => {
            let resp = units.set_temperature(id, temperature).await?;
            util::report_action(&resp, global, &format!("Unit {id} setpoint {temperature}"))
        }
        ThermostatUnitsCommand::Preset { id, preset } => {
            let resp = units.set_preset(id, preset).await?;
            util::report_action(&resp, global, &format!("Unit {id} preset {preset}"))
        }
        ThermostatUnitsCommand::PresetConfig {
            id,
            heating_away,
            heating_vacation,
            heating_party,
            cooling_away,
            cooling_vacation,
            cooling_party,
        } => {
            let config = PresetConfig {
                heating: PresetTemperatures {
                    away: heating_away,
                    vacation: heating_vacation,
                    party: heating_party,
                },
                cooling: PresetTemperatures {
                    away: cooling_away,
                    vacation: cooling_vacation,
                    party: cooling_party,
                },
            };
            let resp = units.set_preset_config(id, config).await?;
            util::report_action(&resp, global, &format!("Unit {id} presets updated"))
        }
    }
}
