//! Clap derive structures for the `openmotics` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use openmotics_api::cloud::models::{ThermostatMode, ThermostatPreset, ThermostatState};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// openmotics -- control OpenMotics installations from the command line
#[derive(Debug, Parser)]
#[command(
    name = "openmotics",
    version,
    about = "Control OpenMotics home automation from the command line",
    long_about = "Talks to the OpenMotics cloud API (bearer token or OAuth2 client\n\
        credentials) or directly to a local gateway (username/password).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "OPENMOTICS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "OPENMOTICS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Cloud API root (overrides profile)
    #[arg(long, env = "OPENMOTICS_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Cloud bearer token
    #[arg(long, env = "OPENMOTICS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Installation id for installation-scoped commands
    #[arg(long, short = 'i', env = "OPENMOTICS_INSTALLATION_ID", global = true)]
    pub installation_id: Option<u64>,

    /// Local gateway host (overrides profile)
    #[arg(long, env = "OPENMOTICS_HOST", global = true)]
    pub host: Option<String>,

    /// Local gateway port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Talk to the local gateway over plain http
    #[arg(long, global = true)]
    pub no_tls: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OPENMOTICS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "OPENMOTICS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "OPENMOTICS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect installations
    #[command(alias = "inst")]
    Installations(InstallationsArgs),

    /// Control outputs
    #[command(alias = "out")]
    Outputs(OutputsArgs),

    /// Control lights
    Lights(OutputsArgs),

    /// Read sensors
    Sensors(SensorsArgs),

    /// Control shutters
    Shutters(ShuttersArgs),

    /// List and trigger group actions
    #[command(alias = "ga")]
    Groupactions(GroupActionsArgs),

    /// Manage thermostat groups and units
    #[command(alias = "th")]
    Thermostats(ThermostatsArgs),

    /// Manage the cloud webhook subscription
    Webhook(WebhookArgs),

    /// Talk directly to a local gateway
    Local(LocalArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Opaque JSON filter passed through to the API
    #[arg(long, short = 'f')]
    pub filter: Option<String>,
}

// ── Installations ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstallationsArgs {
    #[command(subcommand)]
    pub command: InstallationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstallationsCommand {
    /// List installations visible to the token
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one installation
    Get { id: u64 },
}

// ── Outputs / Lights ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OutputsArgs {
    #[command(subcommand)]
    pub command: OutputsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OutputsCommand {
    /// List outputs
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one output
    Get { id: u64 },

    /// Toggle an output
    Toggle { id: u64 },

    /// Turn an output on
    On {
        id: u64,

        /// Dimmer level, clamped to 0-100
        #[arg(long, allow_negative_numbers = true)]
        value: Option<i64>,
    },

    /// Turn an output off
    Off { id: u64 },
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    #[command(subcommand)]
    pub command: SensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorsCommand {
    /// List sensors
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one sensor
    Get { id: u64 },
}

// ── Shutters ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShuttersArgs {
    #[command(subcommand)]
    pub command: ShuttersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShuttersCommand {
    /// List shutters
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one shutter
    Get { id: u64 },

    /// Move a shutter up
    Up { id: u64 },

    /// Move a shutter down
    Down { id: u64 },

    /// Stop a moving shutter
    Stop { id: u64 },

    /// Move a shutter to a position
    Position {
        id: u64,
        #[arg(allow_negative_numbers = true)]
        position: i64,
    },

    /// Lock a shutter
    Lock { id: u64 },

    /// Unlock a shutter
    Unlock { id: u64 },
}

// ── Group actions ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupActionsArgs {
    #[command(subcommand)]
    pub command: GroupActionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupActionsCommand {
    /// List group actions
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one group action
    Get { id: u64 },

    /// Trigger a group action
    Trigger { id: u64 },

    /// List group actions with a given usage
    Usage { usage: String },

    /// List scenes
    Scenes,
}

// ── Thermostats ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ThermostatsArgs {
    #[command(subcommand)]
    pub command: ThermostatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThermostatsCommand {
    /// Set the installation-wide mode
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: ThermostatMode,
    },

    /// Switch all thermostats on or off
    State {
        #[arg(value_parser = parse_state)]
        state: ThermostatState,
    },

    /// Thermostat groups
    Groups(ThermostatGroupsArgs),

    /// Thermostat units
    Units(ThermostatUnitsArgs),
}

#[derive(Debug, Args)]
pub struct ThermostatGroupsArgs {
    #[command(subcommand)]
    pub command: ThermostatGroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThermostatGroupsCommand {
    /// List thermostat groups
    #[command(alias = "ls")]
    List,

    /// Show one thermostat group
    Get { id: u64 },

    /// Set a group's mode
    Mode {
        id: u64,
        #[arg(value_parser = parse_mode)]
        mode: ThermostatMode,
    },
}

#[derive(Debug, Args)]
pub struct ThermostatUnitsArgs {
    #[command(subcommand)]
    pub command: ThermostatUnitsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThermostatUnitsCommand {
    /// List thermostat units
    #[command(alias = "ls")]
    List,

    /// Show one thermostat unit
    Get { id: u64 },

    /// Switch a unit on or off
    State {
        id: u64,
        #[arg(value_parser = parse_state)]
        state: ThermostatState,
    },

    /// Set a unit's setpoint
    Temperature { id: u64, temperature: f64 },

    /// Select a unit's preset
    Preset {
        id: u64,
        #[arg(value_parser = parse_preset)]
        preset: ThermostatPreset,
    },

    /// Configure preset temperatures for heating and cooling
    PresetConfig {
        id: u64,
        #[arg(long)]
        heating_away: f64,
        #[arg(long)]
        heating_vacation: f64,
        #[arg(long)]
        heating_party: f64,
        #[arg(long)]
        cooling_away: f64,
        #[arg(long)]
        cooling_vacation: f64,
        #[arg(long)]
        cooling_party: f64,
    },
}

fn parse_mode(s: &str) -> Result<ThermostatMode, String> {
    s.parse()
        .map_err(|_| format!("expected heating or cooling, got '{s}'"))
}

fn parse_state(s: &str) -> Result<ThermostatState, String> {
    s.parse().map_err(|_| format!("expected on or off, got '{s}'"))
}

fn parse_preset(s: &str) -> Result<ThermostatPreset, String> {
    s.parse()
        .map_err(|_| format!("expected auto, away, party or vacation, got '{s}'"))
}

// ── Webhooks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WebhookArgs {
    #[command(subcommand)]
    pub command: WebhookCommand,
}

#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Subscribe to change events
    Subscribe,

    /// Drop the event subscription
    Unsubscribe,
}

// ── Local gateway ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LocalArgs {
    /// Gateway username (overrides profile)
    #[arg(long, env = "OPENMOTICS_USERNAME")]
    pub username: Option<String>,

    /// Gateway password
    #[arg(long, env = "OPENMOTICS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: LocalCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocalCommand {
    /// Check the gateway credentials
    Login,

    /// Control gateway outputs
    Outputs(LocalOutputsArgs),

    /// Read gateway sensors
    Sensors(LocalSensorsArgs),

    /// List and trigger gateway group actions
    #[command(alias = "ga")]
    Groupactions(LocalGroupActionsArgs),

    /// Manage the gateway event subscription
    Webhook(LocalWebhookArgs),
}

#[derive(Debug, Args)]
pub struct LocalOutputsArgs {
    #[command(subcommand)]
    pub command: LocalOutputsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocalOutputsCommand {
    /// List outputs with their live status
    #[command(alias = "ls")]
    List,

    /// Show one output
    Get { id: u64 },

    /// Toggle an output
    Toggle { id: u64 },

    /// Turn an output on
    On {
        id: u64,

        /// Dimmer level, clamped to 0-100
        #[arg(long, allow_negative_numbers = true)]
        value: Option<i64>,
    },

    /// Turn an output off
    Off { id: u64 },
}

#[derive(Debug, Args)]
pub struct LocalSensorsArgs {
    #[command(subcommand)]
    pub command: LocalSensorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocalSensorsCommand {
    /// List sensors with their latest readings
    #[command(alias = "ls")]
    List,

    /// Show one sensor
    Get { id: u64 },
}

#[derive(Debug, Args)]
pub struct LocalGroupActionsArgs {
    #[command(subcommand)]
    pub command: LocalGroupActionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocalGroupActionsCommand {
    /// List group actions
    #[command(alias = "ls")]
    List,

    /// Show one group action
    Get { id: u64 },

    /// Trigger a group action
    Trigger { id: u64 },

    /// List group actions whose name matches a usage
    Usage { usage: String },

    /// List scenes
    Scenes,
}

#[derive(Debug, Args)]
pub struct LocalWebhookArgs {
    #[command(subcommand)]
    pub command: LocalWebhookCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocalWebhookCommand {
    /// Subscribe to change events for an installation
    Subscribe { installation_id: u64 },

    /// Drop the event subscription
    Unsubscribe,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn thermostat_values_are_case_insensitive() {
        assert_eq!(parse_mode("heating"), Ok(ThermostatMode::Heating));
        assert_eq!(parse_state("OFF"), Ok(ThermostatState::Off));
        assert_eq!(parse_preset("Vacation"), Ok(ThermostatPreset::Vacation));
        assert!(parse_mode("warm").is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "openmotics",
            "outputs",
            "on",
            "3",
            "--value",
            "150",
            "-i",
            "21",
            "-o",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.global.installation_id, Some(21));
        assert!(matches!(cli.global.output, OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::Outputs(OutputsArgs {
                command: OutputsCommand::On { id: 3, value: Some(150) }
            })
        ));
    }
}
