//! Post-introspection metamodel validation.
//!
//! Validators never fail fast: each one appends to a shared
//! [`ValidationFailures`] and bootstrap turns a non-empty batch into a fatal
//! [`MetaModelError::ValidationFailures`](crate::domain::MetaModelError).

use crate::domain::{
    error::ValidationFailures, factories::SupportingMethodName,
    specification::ObjectSpecification,
};

/// A check over one fully introspected specification.
pub trait MetaModelValidator: Send + Sync {
    fn name(&self) -> &'static str;

    /// `prefixes` are the supporting-method prefixes of the programming model.
    fn validate(
        &self,
        spec: &ObjectSpecification,
        prefixes: &[&'static str],
        failures: &mut ValidationFailures,
    );
}

/// Parameter-indexed supporting method pointing past the end of an existing
/// action's parameter list.
fn out_of_range(spec: &ObjectSpecification, name: &SupportingMethodName) -> Option<usize> {
    let index = name.index?;
    let action = spec.action(&name.member_id)?;
    (index >= action.parameter_count()).then_some(action.parameter_count())
}

/// Supporting methods whose stem matches no member.
pub struct OrphanedSupportingMethodValidator;

impl MetaModelValidator for OrphanedSupportingMethodValidator {
    fn name(&self) -> &'static str {
        "OrphanedSupportingMethodValidator"
    }

    fn validate(
        &self,
        spec: &ObjectSpecification,
        prefixes: &[&'static str],
        failures: &mut ValidationFailures,
    ) {
        for method in spec.unclaimed_supporting_methods() {
            let Some(name) = SupportingMethodName::parse(method, prefixes) else {
                continue;
            };
            if out_of_range(spec, &name).is_some() {
                continue;
            }
            failures.add(
                format!("{}#{method}()", spec.full_name()),
                format!(
                    "orphaned supporting method: '{}' is not a member this '{}' method can apply to",
                    name.member_id, name.prefix
                ),
            );
        }
    }
}

/// Parameter-indexed supporting methods referring to a missing parameter.
pub struct ActionParameterArityValidator;

impl MetaModelValidator for ActionParameterArityValidator {
    fn name(&self) -> &'static str {
        "ActionParameterArityValidator"
    }

    fn validate(
        &self,
        spec: &ObjectSpecification,
        prefixes: &[&'static str],
        failures: &mut ValidationFailures,
    ) {
        for method in spec.unclaimed_supporting_methods() {
            let Some(name) = SupportingMethodName::parse(method, prefixes) else {
                continue;
            };
            if let Some(count) = out_of_range(spec, &name) {
                failures.add(
                    format!("{}#{method}()", spec.full_name()),
                    format!(
                        "refers to parameter {} but action '{}' has {count} parameter(s)",
                        name.index.unwrap_or_default(),
                        name.member_id
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{
        descriptor::{ClassDescriptor, TypeRef},
        factories::{CHOICES_PREFIX, HIDE_PREFIX},
        holder::FacetHolder,
        identifier::Identifier,
        specification::{Introspection, ObjectAction, ObjectActionParameter},
    };

    fn spec_with_unclaimed(methods: &[&str]) -> ObjectSpecification {
        let class = Arc::new(ClassDescriptor::new("com.acme.Order"));
        let action_id = Identifier::action("com.acme.Order", "place", vec!["text".into()]);
        let param = ObjectActionParameter::new(
            Arc::clone(&class),
            &action_id,
            0,
            "note",
            TypeRef::Text,
            FacetHolder::new(),
        );
        let action = ObjectAction::new(
            Arc::clone(&class),
            action_id,
            TypeRef::Void,
            vec![param],
            FacetHolder::new(),
        );
        ObjectSpecification::introspected(
            class,
            Introspection {
                actions: vec![action],
                unclaimed_supporting_methods: methods.iter().map(|m| m.to_string()).collect(),
                ..Introspection::default()
            },
        )
    }

    const PREFIXES: &[&str] = &[HIDE_PREFIX, CHOICES_PREFIX];

    #[test]
    fn orphan_reported_with_identifier() {
        let spec = spec_with_unclaimed(&["hideNothing"]);
        let mut failures = ValidationFailures::new();
        OrphanedSupportingMethodValidator.validate(&spec, PREFIXES, &mut failures);
        ActionParameterArityValidator.validate(&spec, PREFIXES, &mut failures);

        assert_eq!(failures.len(), 1);
        let failure = failures.iter().next().unwrap();
        assert_eq!(failure.identifier, "com.acme.Order#hideNothing()");
        assert!(failure.message.contains("orphaned"));
    }

    #[test]
    fn out_of_range_index_is_an_arity_problem_only() {
        let spec = spec_with_unclaimed(&["choices3Place"]);
        let mut failures = ValidationFailures::new();
        OrphanedSupportingMethodValidator.validate(&spec, PREFIXES, &mut failures);
        ActionParameterArityValidator.validate(&spec, PREFIXES, &mut failures);

        assert_eq!(failures.len(), 1);
        assert!(failures
            .iter()
            .next()
            .unwrap()
            .message
            .contains("refers to parameter 3 but action 'place' has 1 parameter(s)"));
    }

    #[test]
    fn clean_spec_passes() {
        let spec = spec_with_unclaimed(&[]);
        let mut failures = ValidationFailures::new();
        OrphanedSupportingMethodValidator.validate(&spec, PREFIXES, &mut failures);
        ActionParameterArityValidator.validate(&spec, PREFIXES, &mut failures);
        assert!(failures.is_empty());
    }
}
