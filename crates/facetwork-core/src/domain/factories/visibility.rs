//! Hiding and disabling: annotations plus `hideX` / `disableX` methods.
//!
//! Parameters accept either the annotation on the parameter or the legacy
//! indexed method (`hide0Place`), never both.

use crate::domain::{
    descriptor::{Annotated, Annotation},
    error::MetaModelError,
    facet::{Facet, FacetKind},
    feature::FeatureType,
};

use super::{
    DISABLE_PREFIX, FacetFactory, HIDE_PREFIX, ProcessMethodContext, ProcessParameterContext,
    indexed_supporting_method_name, supporting_method_name,
};

fn conflicting_syntax(ctx: &ProcessParameterContext<'_>, concern: &str, legacy: &str) -> MetaModelError {
    MetaModelError::validation(
        ctx.class.name.clone(),
        format!(
            "{}#{}: parameter {} uses both old and new syntax for {concern} ({legacy}() and an annotation); remove one of them",
            ctx.class.name, ctx.action_id, ctx.param_index
        ),
    )
}

pub struct HiddenFacetFactory;

impl HiddenFacetFactory {
    const NAME: &'static str = "HiddenFacetFactory";
}

impl FacetFactory for HiddenFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS_AND_PARAMETERS
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &[HIDE_PREFIX]
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let hidden = ctx.method.find_annotation(|a| match a {
            Annotation::Hidden { when, where_ } => Some((*when, *where_)),
            _ => None,
        });
        if let Some((when, where_)) = hidden {
            ctx.facets
                .add_facet(Facet::explicit(FacetKind::Hidden { when, where_ }, Self::NAME));
        }

        let name = supporting_method_name(HIDE_PREFIX, ctx.member_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &name) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::HideForContext(method), Self::NAME));
        }
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        let annotated = ctx.parameter.find_annotation(|a| match a {
            Annotation::Hidden { when, where_ } => Some((*when, *where_)),
            _ => None,
        });
        let legacy_name = indexed_supporting_method_name(HIDE_PREFIX, ctx.param_index, ctx.action_id);
        let legacy = ctx.remover.find(ctx.class, &legacy_name);

        match (annotated, legacy) {
            (Some(_), Some(_)) => Err(conflicting_syntax(ctx, "hiding", &legacy_name)),
            (Some((when, where_)), None) => {
                ctx.facets
                    .add_facet(Facet::explicit(FacetKind::Hidden { when, where_ }, Self::NAME));
                Ok(())
            }
            (None, Some(method)) => {
                ctx.remover.remove_method(method.index);
                ctx.facets
                    .add_facet(Facet::default_for(FacetKind::HideForContext(method), Self::NAME));
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}

pub struct DisabledFacetFactory;

impl DisabledFacetFactory {
    const NAME: &'static str = "DisabledFacetFactory";
}

impl FacetFactory for DisabledFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS_AND_PARAMETERS
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &[DISABLE_PREFIX]
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let disabled = ctx.method.find_annotation(|a| match a {
            Annotation::Disabled { when, reason } => Some((*when, reason.clone())),
            _ => None,
        });
        if let Some((when, reason)) = disabled {
            ctx.facets
                .add_facet(Facet::explicit(FacetKind::Disabled { when, reason }, Self::NAME));
        }

        let name = supporting_method_name(DISABLE_PREFIX, ctx.member_id);
        if let Some(method) = ctx.remover.claim(ctx.class, &name) {
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::DisableForContext(method), Self::NAME));
        }
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        let annotated = ctx.parameter.find_annotation(|a| match a {
            Annotation::Disabled { when, reason } => Some((*when, reason.clone())),
            _ => None,
        });
        let legacy_name =
            indexed_supporting_method_name(DISABLE_PREFIX, ctx.param_index, ctx.action_id);
        let legacy = ctx.remover.find(ctx.class, &legacy_name);

        match (annotated, legacy) {
            (Some(_), Some(_)) => Err(conflicting_syntax(ctx, "disabling", &legacy_name)),
            (Some((when, reason)), None) => {
                ctx.facets
                    .add_facet(Facet::explicit(FacetKind::Disabled { when, reason }, Self::NAME));
                Ok(())
            }
            (None, Some(method)) => {
                ctx.remover.remove_method(method.index);
                ctx.facets.add_facet(Facet::default_for(
                    FacetKind::DisableForContext(method),
                    Self::NAME,
                ));
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }
}
