//! Sensor command handlers.

use tabled::Tabled;

use openmotics_api::OpenMoticsCloud;
use openmotics_api::cloud::models::Sensor;

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Room")]
    room: String,
}

fn reading(s: &Sensor) -> String {
    match (s.value(), s.unit.as_deref()) {
        (Some(v), Some(unit)) => format!("{v} {unit}"),
        (Some(v), None) => v.to_string(),
        (None, _) => "-".into(),
    }
}

impl From<&Sensor> for SensorRow {
    fn from(s: &Sensor) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            quantity: or_dash(s.physical_quantity.as_deref()),
            value: reading(s),
            room: util::room(s.location.as_ref()),
        }
    }
}

fn detail(s: &Sensor) -> String {
    [
        format!("ID:       {}", s.id),
        format!("Name:     {}", s.name),
        format!("Quantity: {}", s.physical_quantity.as_deref().unwrap_or("-")),
        format!("Value:    {}", reading(s)),
        format!("Room:     {}", util::room(s.location.as_ref())),
    ]
    .join("\n")
}

pub async fn handle(
    cloud: &OpenMoticsCloud,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SensorsCommand::List(list) => {
            let all = cloud.sensors().get_all(list.filter.as_deref()).await?;
            let out =
                output::render_list(&global.output, &all, SensorRow::from, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SensorsCommand::Get { id } => {
            let sensor = cloud.sensors().get_by_id(id).await?;
            let out = output::render_single(&global.output, &sensor, detail, |s| s.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
