//! Implementation of the `facetwork list` command.

use serde::Serialize;

use facetwork_core::domain::{Nature, ObjectSpecification};

use crate::{
    cli::ListArgs,
    commands::Metamodel,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct Row {
    class: String,
    logical_type_name: String,
    nature: Nature,
    properties: usize,
    collections: usize,
    actions: usize,
}

impl From<&ObjectSpecification> for Row {
    fn from(spec: &ObjectSpecification) -> Self {
        Self {
            class: spec.full_name().to_string(),
            logical_type_name: spec.logical_type_name().to_string(),
            nature: spec.nature(),
            properties: spec.properties().len(),
            collections: spec.collections().len(),
            actions: spec.actions().len(),
        }
    }
}

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let metamodel = Metamodel::open(args.dir.as_deref(), &config)?;
    metamodel.loader.init_metamodel()?;
    let rows: Vec<Row> = metamodel
        .loader
        .all_specifications()?
        .iter()
        .map(|spec| Row::from(spec.as_ref()))
        .collect();

    if output.is_json() {
        return output.json(&rows);
    }

    output.header(&format!("Specifications ({}):", metamodel.origin))?;
    for row in &rows {
        output.print(&format!(
            "  {:<28} {:<14} {} properties, {} collections, {} actions",
            row.class,
            row.nature.to_string(),
            row.properties,
            row.collections,
            row.actions
        ))?;
    }
    Ok(())
}
