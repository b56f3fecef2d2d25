//! Installation command handlers.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::Installation;

use crate::cli::{GlobalOpts, InstallationsArgs, InstallationsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InstallationRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
}

impl From<&Installation> for InstallationRow {
    fn from(i: &Installation) -> Self {
        Self {
            id: i.id,
            name: i.name.clone(),
            model: or_dash(i.gateway_model.as_deref()),
            version: or_dash(i.version.as_deref()),
        }
    }
}

fn detail(i: &Installation) -> String {
    [
        format!("ID:          {}", i.id),
        format!("Name:        {}", i.name),
        format!("Description: {}", i.description.as_deref().unwrap_or("-")),
        format!("Model:       {}", i.gateway_model.as_deref().unwrap_or("-")),
        format!("Platform:    {}", i.platform.as_deref().unwrap_or("-")),
        format!("Version:     {}", i.version.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: InstallationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InstallationsCommand::List(list) => {
            let all = cloud.installations().get_all(list.filter.as_deref()).await?;
            let out = output::render_list(&global.output, &all, InstallationRow::from, |i| {
                i.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InstallationsCommand::Get { id } => {
            let installation = cloud.installations().get_by_id(id).await?;
            let out = output::render_single(&global.output, &installation, detail, |i| {
                i.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
