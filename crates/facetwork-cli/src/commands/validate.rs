//! Implementation of the `facetwork validate` command.

use serde::Serialize;
use tracing::instrument;

use crate::{
    cli::ValidateArgs,
    commands::Metamodel,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct Report<'a> {
    source: String,
    valid: bool,
    specifications: Vec<&'a str>,
}

/// Bootstrap the metamodel; any validation failure becomes the command error.
#[instrument(skip_all)]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let metamodel = Metamodel::open(args.dir.as_deref(), &config)?;
    let specs = metamodel.loader.init_metamodel()?;

    if output.is_json() {
        return output.json(&Report {
            source: metamodel.origin.to_string(),
            valid: true,
            specifications: specs.iter().map(|s| s.full_name()).collect(),
        });
    }

    output.success(&format!(
        "Metamodel valid: {} specification(s) from {}",
        specs.len(),
        metamodel.origin
    ))?;
    for spec in &specs {
        output.detail(&format!("  {}", spec.full_name()))?;
    }
    Ok(())
}
