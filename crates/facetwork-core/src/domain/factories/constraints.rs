//! Validation, choices and defaults, mandatory, and max-length.

use crate::domain::{
    descriptor::{Annotated, Annotation},
    error::MetaModelError,
    facet::{Facet, FacetKind},
    feature::FeatureType,
    holder::FacetHolder,
};

use super::{
    CHOICES_PREFIX, DEFAULT_PREFIX, FacetFactory, ProcessClassContext, ProcessMethodContext,
    ProcessParameterContext, VALIDATE_PREFIX, indexed_supporting_method_name,
    supporting_method_name,
};

/// `validate()`, `validateX(..)`, and `validateNX(..)` methods.
pub struct ValidateFacetFactory;

impl ValidateFacetFactory {
    const NAME: &'static str = "ValidateFacetFactory";
}

impl FacetFactory for ValidateFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[
            FeatureType::Object,
            FeatureType::Property,
            FeatureType::Action,
            FeatureType::ActionParameter,
        ]
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &[VALIDATE_PREFIX]
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        let validate = ctx.remover.find(ctx.class, VALIDATE_PREFIX).filter(|m| {
            ctx.class
                .method_at(m.index)
                .is_some_and(|d| d.parameters.is_empty())
        });
        if let Some(method) = validate {
            ctx.remover.remove_method(method.index);
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::ValidateObject(method), Self::NAME));
        }
        Ok(())
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let name = supporting_method_name(VALIDATE_PREFIX, ctx.member_id);
        let Some(method) = ctx.remover.claim(ctx.class, &name) else {
            return Ok(());
        };
        let kind = match ctx.feature_type {
            FeatureType::Property => FacetKind::ValidateProperty(method),
            _ => FacetKind::ValidateArguments(method),
        };
        ctx.facets.add_facet(Facet::default_for(kind, Self::NAME));
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        let name = indexed_supporting_method_name(VALIDATE_PREFIX, ctx.param_index, ctx.action_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &name) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::ValidateParameter(method), Self::NAME));
        }
        Ok(())
    }
}

/// `choicesX()` / `defaultX()` for properties and their indexed forms for
/// parameters.
pub struct ChoicesDefaultsFacetFactory;

impl ChoicesDefaultsFacetFactory {
    const NAME: &'static str = "ChoicesDefaultsFacetFactory";
}

impl FacetFactory for ChoicesDefaultsFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &[CHOICES_PREFIX, DEFAULT_PREFIX]
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let choices = supporting_method_name(CHOICES_PREFIX, ctx.member_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &choices) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::Choices(method), Self::NAME));
        }
        let default = supporting_method_name(DEFAULT_PREFIX, ctx.member_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &default) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::Default(method), Self::NAME));
        }
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        let choices = indexed_supporting_method_name(CHOICES_PREFIX, ctx.param_index, ctx.action_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &choices) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::Choices(method), Self::NAME));
        }
        let default = indexed_supporting_method_name(DEFAULT_PREFIX, ctx.param_index, ctx.action_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &default) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::Default(method), Self::NAME));
        }
        Ok(())
    }
}

fn install_mandatory(annotated: &impl Annotated, facets: &mut FacetHolder, factory: &'static str) {
    let mandatory = annotated.find_annotation(|a| match a {
        Annotation::Optional => Some(false),
        Annotation::Mandatory => Some(true),
        _ => None,
    });
    if let Some(mandatory) = mandatory {
        facets.add_facet(Facet::explicit(FacetKind::Mandatory(mandatory), factory));
    }
}

/// Explicit `Optional` / `Mandatory` annotations.
pub struct MandatoryFacetFactory;

impl MandatoryFacetFactory {
    const NAME: &'static str = "MandatoryFacetFactory";
}

impl FacetFactory for MandatoryFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        install_mandatory(ctx.method, ctx.facets, Self::NAME);
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        install_mandatory(ctx.parameter, ctx.facets, Self::NAME);
        Ok(())
    }
}

fn install_max_length(annotated: &impl Annotated, facets: &mut FacetHolder, factory: &'static str) {
    let max = annotated.find_annotation(|a| match a {
        Annotation::MaxLength { value } => Some(*value),
        _ => None,
    });
    if let Some(max) = max {
        facets.add_facet(Facet::explicit(FacetKind::MaxLength(max), factory));
    }
}

pub struct MaxLengthFacetFactory;

impl MaxLengthFacetFactory {
    const NAME: &'static str = "MaxLengthFacetFactory";
}

impl FacetFactory for MaxLengthFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        install_max_length(ctx.method, ctx.facets, Self::NAME);
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        install_max_length(ctx.parameter, ctx.facets, Self::NAME);
        Ok(())
    }
}
