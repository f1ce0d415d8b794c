//! Implementation of the `facetwork check` command.
//!
//! Builds a target object from `--persistent`/`--field`, a session from
//! `--user`/`--role` (or the `session.*` config), and prints the verdict
//! followed by every advisory that contributed to it.

use serde::Serialize;
use tracing::{debug, instrument};

use facetwork_core::{
    application::ApplicationError,
    domain::{
        Consent, InteractionInitiatedBy, InteractionResult, InteractionResultSet, ObjectAdapter, ObjectMember,
        Session, Value, Where,
    },
    error::FacetworkError,
};

use crate::{
    cli::{CheckArgs, CheckKind},
    commands::Metamodel,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct Verdict {
    class: String,
    member: String,
    check: &'static str,
    consent: Consent,
    results: Vec<InteractionResult>,
}

#[instrument(skip_all, fields(class = %args.class, member = %args.member, kind = ?args.kind))]
pub fn execute(args: CheckArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let metamodel = Metamodel::open(args.dir.as_deref(), &config)?;
    metamodel.loader.init_metamodel()?;
    let spec = metamodel.loader.load_specification(&args.class)?;
    let member = spec.member(&args.member).ok_or_else(|| {
        FacetworkError::from(ApplicationError::MemberNotFound {
            class: args.class.clone(),
            member: args.member.clone(),
        })
    })?;

    let target = build_target(&args)?;
    let user = args.user.as_deref().unwrap_or(&config.session.user);
    let roles = if args.roles.is_empty() {
        &config.session.roles
    } else {
        &args.roles
    };
    let session = metamodel.session(user, roles);
    debug!(user, ?roles, persistent = target.is_persistent(), "evaluating check");

    let values: Vec<Value> = args.args.iter().map(|raw| Value::parse_loose(raw)).collect();
    let results = evaluate(&args, member, &target, &session, &values)?;

    let mut set = InteractionResultSet::new();
    for result in &results {
        set.add(result.clone());
    }
    let verdict = Verdict {
        class: args.class,
        member: args.member,
        check: kind_name(args.kind),
        consent: set.create_consent(),
        results,
    };

    if output.is_json() {
        return output.json(&verdict);
    }

    match &verdict.consent {
        Consent::Allow => output.result(&verdict.consent.to_string())?,
        Consent::Veto(_) => output.vetoed(&verdict.consent.to_string())?,
    }
    for result in &verdict.results {
        for advisory in result.advisories() {
            output.detail(&format!(
                "  {} {}: {}",
                result.identifier(),
                advisory.facet_type,
                advisory.consent
            ))?;
        }
    }
    Ok(())
}

fn evaluate(
    args: &CheckArgs,
    member: ObjectMember<'_>,
    target: &ObjectAdapter,
    session: &Session,
    values: &[Value],
) -> CliResult<Vec<InteractionResult>> {
    let initiated_by = if args.framework {
        InteractionInitiatedBy::Framework
    } else {
        InteractionInitiatedBy::User
    };
    let where_ = Where::from(args.where_);

    let results = match (args.kind, member) {
        (CheckKind::Visible, member) => vec![member.is_visible(target, session, initiated_by, where_)],
        (CheckKind::Usable, member) => vec![member.is_usable(target, session, initiated_by, where_)],
        (CheckKind::Valid, ObjectMember::Property(property)) => {
            let proposed = values.first().cloned().unwrap_or_default();
            vec![property.is_valid(target, &proposed, session, initiated_by)]
        }
        (CheckKind::Valid, ObjectMember::Action(action)) => {
            let set = action
                .is_proposed_argument_set_valid(target, values, session, initiated_by)
                .map_err(FacetworkError::from)?;
            return Ok(set.results().to_vec());
        }
        (CheckKind::Valid, ObjectMember::Collection(_)) => {
            return Err(CliError::invalid_input(format!(
                "'{}' is a collection; only visible and usable checks apply",
                args.member
            )));
        }
    };

    results
        .into_iter()
        .map(|r| r.map_err(|e| CliError::from(FacetworkError::from(e))))
        .collect()
}

/// Target object from `--persistent`, `--oid`, and `--field name=value`.
fn build_target(args: &CheckArgs) -> CliResult<ObjectAdapter> {
    let mut target = if args.persistent {
        ObjectAdapter::persistent(args.class.as_str(), args.oid.as_str())
    } else {
        ObjectAdapter::transient(args.class.as_str())
    };
    for raw in &args.fields {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| CliError::invalid_input(format!("--field expects NAME=VALUE, got '{raw}'")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::invalid_input(format!("--field has an empty name in '{raw}'")));
        }
        target.set_field(name, Value::parse_loose(value));
    }
    Ok(target)
}

fn kind_name(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::Visible => "visible",
        CheckKind::Usable => "usable",
        CheckKind::Valid => "valid",
    }
}
