//! Shared helpers for command handlers.

use openmotics_api::ApiResponse;
use openmotics_api::cloud::models::Location;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Report the outcome of an action call.
///
/// Structured formats print the response body; table mode prints a short
/// confirmation on stderr.
pub fn report_action(resp: &ApiResponse, global: &GlobalOpts, done: &str) -> Result<(), CliError> {
    match global.output {
        OutputFormat::Table => {
            if !global.quiet {
                eprintln!("{done}");
            }
        }
        ref format => {
            let out = output::render_response(format, resp)?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

/// Room id of a cloud location, or `-`.
pub fn room(location: Option<&Location>) -> String {
    output::or_dash(location.and_then(|l| l.room_id))
}

/// Error for a gateway lookup that came back empty.
pub fn not_found(resource_type: &str, id: u64, list_command: &str) -> CliError {
    CliError::NotFound {
        resource_type: resource_type.into(),
        identifier: id.to_string(),
        list_command: list_command.into(),
    }
}
