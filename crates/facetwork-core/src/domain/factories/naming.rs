//! Naming, domain-object metadata, and generic fallbacks.

use crate::domain::{
    descriptor::{Annotated, Annotation, natural_name},
    error::MetaModelError,
    facet::{Facet, FacetKind},
    feature::FeatureType,
    holder::FacetHolder,
};

use super::{FacetFactory, ProcessClassContext, ProcessMethodContext, ProcessParameterContext};

fn install_naming(annotated: &impl Annotated, facets: &mut FacetHolder, factory: &'static str) {
    for annotation in annotated.annotations() {
        match annotation {
            Annotation::Named { value } => {
                facets.add_facet(Facet::explicit(FacetKind::Named(value.clone()), factory));
            }
            Annotation::DescribedAs { value } => {
                facets.add_facet(Facet::explicit(FacetKind::DescribedAs(value.clone()), factory));
            }
            _ => {}
        }
    }
}

/// Installs low-precedence defaults that explicit facets later override.
pub struct FallbackFacetFactory;

impl FallbackFacetFactory {
    const NAME: &'static str = "FallbackFacetFactory";
}

impl FacetFactory for FallbackFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        let short = ctx.class.name.rsplit('.').next().unwrap_or(&ctx.class.name);
        ctx.facets
            .add_facet(Facet::fallback(FacetKind::Named(natural_name(short)), Self::NAME));
        Ok(())
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        ctx.facets.add_facet(Facet::fallback(
            FacetKind::Named(natural_name(ctx.member_id)),
            Self::NAME,
        ));
        if ctx.feature_type == FeatureType::Property {
            ctx.facets
                .add_facet(Facet::fallback(FacetKind::Mandatory(true), Self::NAME));
        }
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        ctx.facets.add_facet(Facet::fallback(
            FacetKind::Named(natural_name(&ctx.parameter.name)),
            Self::NAME,
        ));
        ctx.facets
            .add_facet(Facet::fallback(FacetKind::Mandatory(true), Self::NAME));
        Ok(())
    }
}

/// Class-level domain object metadata.
pub struct DomainObjectFacetFactory;

impl DomainObjectFacetFactory {
    const NAME: &'static str = "DomainObjectFacetFactory";
}

impl FacetFactory for DomainObjectFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        ctx.facets.add_facet(Facet::fallback(
            FacetKind::LogicalTypeName(ctx.class.name.clone()),
            Self::NAME,
        ));

        let domain_object = ctx.class.find_annotation(|a| match a {
            Annotation::DomainObject {
                nature,
                logical_type_name,
            } => Some((*nature, logical_type_name.clone())),
            _ => None,
        });
        if let Some((nature, logical_type_name)) = domain_object {
            ctx.facets
                .add_facet(Facet::explicit(FacetKind::DomainObject(nature), Self::NAME));
            if let Some(name) = logical_type_name.filter(|n| !n.trim().is_empty()) {
                ctx.facets
                    .add_facet(Facet::explicit(FacetKind::LogicalTypeName(name), Self::NAME));
            }
        }

        install_naming(ctx.class, ctx.facets, Self::NAME);
        Ok(())
    }
}

/// `Named` / `DescribedAs` annotations on members and parameters.
pub struct NamedFacetFactory;

impl NamedFacetFactory {
    const NAME: &'static str = "NamedFacetFactory";
}

impl FacetFactory for NamedFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS_AND_PARAMETERS
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        install_naming(ctx.method, ctx.facets, Self::NAME);
        Ok(())
    }

    fn process_params(&self, ctx: &mut ProcessParameterContext<'_>) -> Result<(), MetaModelError> {
        install_naming(ctx.parameter, ctx.facets, Self::NAME);
        Ok(())
    }
}
