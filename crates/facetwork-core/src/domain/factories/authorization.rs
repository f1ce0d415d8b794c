//! Late-pipeline factories: authorization on members, immutability.

use crate::domain::{
    descriptor::{Annotated, Annotation},
    error::MetaModelError,
    facet::{Facet, FacetKind, FacetType, When},
    feature::FeatureType,
};

use super::{FacetFactory, ProcessClassContext, ProcessMethodContext};

/// Routes every member through the session's authorizor.
pub struct AuthorizationFacetFactory;

impl AuthorizationFacetFactory {
    const NAME: &'static str = "AuthorizationFacetFactory";
}

impl FacetFactory for AuthorizationFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        ctx.facets
            .add_facet(Facet::inferred(FacetKind::Authorization, Self::NAME));
        Ok(())
    }
}

/// `Immutable` on the class, and a derived `Disabled` on its associations.
pub struct ImmutableFacetFactory;

impl ImmutableFacetFactory {
    const NAME: &'static str = "ImmutableFacetFactory";
}

impl FacetFactory for ImmutableFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        &[FeatureType::Object, FeatureType::Property, FeatureType::Collection]
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        let immutable = ctx.class.find_annotation(|a| match a {
            Annotation::Immutable { reason } => Some(reason.clone()),
            _ => None,
        });
        if let Some(reason) = immutable {
            ctx.facets
                .add_facet(Facet::explicit(FacetKind::Immutable { reason }, Self::NAME));
        }
        Ok(())
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let reason = match ctx.class_facets.get_facet(FacetType::Immutable).map(|f| f.kind()) {
            Some(FacetKind::Immutable { reason }) => reason
                .clone()
                .unwrap_or_else(|| "Immutable".to_string()),
            _ => return Ok(()),
        };
        ctx.facets.add_facet(Facet::inferred(
            FacetKind::Disabled {
                when: When::Always,
                reason: Some(reason),
            },
            Self::NAME,
        ));
        Ok(())
    }
}
