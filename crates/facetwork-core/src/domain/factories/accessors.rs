//! Accessors, setters, action bodies, and titles.

use crate::domain::{
    error::MetaModelError,
    facet::{Facet, FacetKind, MethodRef},
    feature::FeatureType,
};

use super::{
    FacetFactory, ProcessClassContext, ProcessMethodContext, SET_PREFIX, TITLE_METHOD,
    supporting_method_name,
};

pub struct PropertyAccessorFacetFactory;

impl PropertyAccessorFacetFactory {
    const NAME: &'static str = "PropertyAccessorFacetFactory";
}

impl FacetFactory for PropertyAccessorFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_ONLY
    }

    fn prefixes(&self) -> &'static [&'static str] {
        &[SET_PREFIX]
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let getter = MethodRef::new(ctx.method_index, ctx.method.name.clone());
        ctx.facets
            .add_facet(Facet::default_for(FacetKind::PropertyAccessor(getter), Self::NAME));

        let setter_name = supporting_method_name(SET_PREFIX, ctx.member_id);
        let setter = ctx.remover.find(ctx.class, &setter_name).filter(|m| {
            ctx.class
                .method_at(m.index)
                .is_some_and(|d| d.parameters.len() == 1 && d.return_type.is_void())
        });
        if let Some(setter) = setter {
            ctx.remover.remove_method(setter.index);
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::PropertySetter(setter), Self::NAME));
        }
        Ok(())
    }
}

pub struct CollectionAccessorFacetFactory;

impl CollectionAccessorFacetFactory {
    const NAME: &'static str = "CollectionAccessorFacetFactory";
}

impl FacetFactory for CollectionAccessorFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::COLLECTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let element_type = ctx
            .method
            .return_type
            .referenced_class()
            .unwrap_or_default()
            .to_string();
        ctx.facets.add_facet(Facet::default_for(
            FacetKind::CollectionAccessor {
                method: MethodRef::new(ctx.method_index, ctx.method.name.clone()),
                element_type,
            },
            Self::NAME,
        ));
        Ok(())
    }
}

pub struct ActionInvocationFacetFactory;

impl ActionInvocationFacetFactory {
    const NAME: &'static str = "ActionInvocationFacetFactory";
}

impl FacetFactory for ActionInvocationFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_method(&self, ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        let method = MethodRef::new(ctx.method_index, ctx.method.name.clone());
        ctx.facets
            .add_facet(Facet::default_for(FacetKind::ActionInvocation(method), Self::NAME));
        Ok(())
    }
}

/// Claims a no-arg `title()` method on the class.
pub struct TitleFacetFactory;

impl TitleFacetFactory {
    const NAME: &'static str = "TitleFacetFactory";
}

impl FacetFactory for TitleFacetFactory {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        let title = ctx.remover.find(ctx.class, TITLE_METHOD).filter(|m| {
            ctx.class
                .method_at(m.index)
                .is_some_and(|d| d.parameters.is_empty())
        });
        if let Some(title) = title {
            ctx.remover.remove_method(title.index);
            ctx.facets
                .add_facet(Facet::default_for(FacetKind::Title(title), Self::NAME));
        }
        Ok(())
    }
}
