//! Implementation of the `facetwork inspect` command.

use serde::Serialize;
use tracing::instrument;

use facetwork_core::domain::{MemberSummary, Nature, ObjectActionParameter, ObjectMember, ObjectSpecification};

use crate::{
    cli::InspectArgs,
    commands::Metamodel,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ClassView {
    class: String,
    logical_type_name: String,
    nature: Nature,
    description: Option<String>,
    facets: Vec<String>,
    members: Vec<MemberView>,
}

#[derive(Debug, Serialize)]
struct MemberView {
    #[serde(flatten)]
    summary: MemberSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<ParameterView>,
}

#[derive(Debug, Serialize)]
struct ParameterView {
    index: usize,
    name: String,
    facets: Vec<String>,
}

impl From<&ObjectActionParameter> for ParameterView {
    fn from(parameter: &ObjectActionParameter) -> Self {
        Self {
            index: parameter.index(),
            name: parameter.name().to_string(),
            facets: parameter.facets().facets().iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<ObjectMember<'_>> for MemberView {
    fn from(member: ObjectMember<'_>) -> Self {
        let parameters = match member {
            ObjectMember::Action(action) => action.parameters().iter().map(ParameterView::from).collect(),
            _ => Vec::new(),
        };
        Self {
            summary: MemberSummary::from(member),
            parameters,
        }
    }
}

fn describe(spec: &ObjectSpecification) -> ClassView {
    ClassView {
        class: spec.full_name().to_string(),
        logical_type_name: spec.logical_type_name().to_string(),
        nature: spec.nature(),
        description: spec.description().map(str::to_string),
        facets: spec.facets().facets().iter().map(ToString::to_string).collect(),
        members: spec.members().map(MemberView::from).collect(),
    }
}

#[instrument(skip_all, fields(class = %args.class))]
pub fn execute(args: InspectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let metamodel = Metamodel::open(args.dir.as_deref(), &config)?;
    metamodel.loader.init_metamodel()?;
    let spec = metamodel.loader.load_specification(&args.class)?;
    let view = describe(&spec);

    if output.is_json() {
        return output.json(&view);
    }

    output.header(&format!("{} ({})", view.class, view.nature))?;
    output.detail(&format!("  logical type: {}", view.logical_type_name))?;
    if let Some(description) = &view.description {
        output.detail(&format!("  {description}"))?;
    }
    for facet in &view.facets {
        output.print(&format!("  - {facet}"))?;
    }

    for member in &view.members {
        output.print("")?;
        output.print(&format!(
            "{} {}",
            member.summary.feature_type, member.summary.id
        ))?;
        for facet in &member.summary.facets {
            output.print(&format!("  - {facet}"))?;
        }
        for parameter in &member.parameters {
            output.print(&format!("  param {} {}", parameter.index, parameter.name))?;
            for facet in &parameter.facets {
                output.print(&format!("    - {facet}"))?;
            }
        }
    }
    Ok(())
}
