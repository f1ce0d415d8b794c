//! Runs the factory pipeline over one class descriptor.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::{
    descriptor::{Annotated, Annotation, ClassDescriptor, MethodDescriptor, TypeRef, decapitalize},
    error::MetaModelError,
    factories::{
        MethodRemover, ProcessClassContext, ProcessMethodContext, ProcessParameterContext,
        ProgrammingModel, SupportingMethodName,
    },
    feature::FeatureType,
    holder::FacetHolder,
    identifier::Identifier,
    specification::{
        Introspection, ObjectAction, ObjectActionParameter, OneToManyAssociation,
        OneToOneAssociation,
    },
};

/// `getQuantity` → `quantity`; `isActive` (boolean) → `active`.
fn accessor_id(method: &MethodDescriptor) -> Option<String> {
    if !method.parameters.is_empty() {
        return None;
    }
    let stem = match (&method.return_type, method.name.strip_prefix("get")) {
        (TypeRef::Void, _) => return None,
        (_, Some(stem)) => stem,
        (TypeRef::Boolean, None) => method.name.strip_prefix("is")?,
        _ => return None,
    };
    stem.starts_with(|c: char| c.is_uppercase())
        .then(|| decapitalize(stem))
}

/// Turns class descriptors into [`Introspection`]s using a programming model.
pub struct Introspector<'m> {
    model: &'m ProgrammingModel,
    prefixes: Vec<&'static str>,
}

impl<'m> Introspector<'m> {
    pub fn new(model: &'m ProgrammingModel) -> Self {
        Self {
            prefixes: model.supporting_prefixes(),
            model,
        }
    }

    #[instrument(skip_all, fields(class = %class.name))]
    pub fn introspect(&self, class: &Arc<ClassDescriptor>) -> Result<Introspection, MetaModelError> {
        let mut remover = MethodRemover::new();
        for (index, method) in class.methods.iter().enumerate() {
            if method.is_static || method.has_annotation(|a| matches!(a, Annotation::Programmatic)) {
                trace!(method = %method.name, "excluded from metamodel");
                remover.exclude(index);
            }
        }

        let mut facets = FacetHolder::new();
        for factory in self.model.factories_for(FeatureType::Object) {
            factory.process_class(&mut ProcessClassContext {
                class,
                facets: &mut facets,
                remover: &mut remover,
            })?;
        }

        let mut properties = Vec::new();
        let mut collections = Vec::new();
        for (index, method) in class.methods.iter().enumerate() {
            if remover.is_removed(index) {
                continue;
            }
            let Some(id) = accessor_id(method) else {
                continue;
            };
            remover.remove_method(index);

            if let TypeRef::Collection(element_type) = &method.return_type {
                let holder = self.process_member(
                    class,
                    &facets,
                    FeatureType::Collection,
                    &id,
                    index,
                    &mut remover,
                )?;
                collections.push(OneToManyAssociation::new(
                    Arc::clone(class),
                    id,
                    element_type.clone(),
                    holder,
                ));
            } else {
                let holder = self.process_member(
                    class,
                    &facets,
                    FeatureType::Property,
                    &id,
                    index,
                    &mut remover,
                )?;
                properties.push(OneToOneAssociation::new(
                    Arc::clone(class),
                    id,
                    method.return_type.clone(),
                    holder,
                ));
            }
        }

        // Anything named like a supporting method is never an action, even if
        // no member claims it. The orphan validator reports those.
        let candidates: Vec<usize> = class
            .methods
            .iter()
            .enumerate()
            .filter(|(i, m)| {
                !remover.is_removed(*i) && SupportingMethodName::parse(&m.name, &self.prefixes).is_none()
            })
            .map(|(i, _)| i)
            .collect();

        let mut actions = Vec::new();
        for index in candidates {
            if remover.is_removed(index) {
                continue;
            }
            remover.remove_method(index);
            actions.push(self.introspect_action(class, &facets, index, &mut remover)?);
        }

        let unclaimed_supporting_methods: Vec<String> = class
            .methods
            .iter()
            .enumerate()
            .filter(|(i, _)| !remover.is_removed(*i))
            .map(|(_, m)| m.name.clone())
            .collect();

        debug!(
            properties = properties.len(),
            collections = collections.len(),
            actions = actions.len(),
            unclaimed = unclaimed_supporting_methods.len(),
            "class introspected"
        );

        Ok(Introspection {
            facets,
            properties,
            collections,
            actions,
            unclaimed_supporting_methods,
        })
    }

    fn process_member(
        &self,
        class: &ClassDescriptor,
        class_facets: &FacetHolder,
        feature_type: FeatureType,
        member_id: &str,
        method_index: usize,
        remover: &mut MethodRemover,
    ) -> Result<FacetHolder, MetaModelError> {
        let method = &class.methods[method_index];
        let mut facets = FacetHolder::new();
        for factory in self.model.factories_for(feature_type) {
            factory.process_method(&mut ProcessMethodContext {
                class,
                class_facets,
                feature_type,
                member_id,
                method_index,
                method,
                facets: &mut facets,
                remover: &mut *remover,
            })?;
        }
        trace!(%feature_type, member = member_id, facets = facets.len(), "member processed");
        Ok(facets)
    }

    fn introspect_action(
        &self,
        class: &Arc<ClassDescriptor>,
        class_facets: &FacetHolder,
        method_index: usize,
        remover: &mut MethodRemover,
    ) -> Result<ObjectAction, MetaModelError> {
        let method = &class.methods[method_index];
        let identifier = Identifier::action(
            class.name.clone(),
            method.name.clone(),
            method.parameters.iter().map(|p| p.type_ref.signature_name()).collect(),
        );
        let facets = self.process_member(
            class,
            class_facets,
            FeatureType::Action,
            &method.name,
            method_index,
            remover,
        )?;

        let mut parameters = Vec::with_capacity(method.parameters.len());
        for (param_index, parameter) in method.parameters.iter().enumerate() {
            let mut param_facets = FacetHolder::new();
            for factory in self.model.factories_for(FeatureType::ActionParameter) {
                factory.process_params(&mut ProcessParameterContext {
                    class,
                    action_id: &method.name,
                    method,
                    param_index,
                    parameter,
                    facets: &mut param_facets,
                    remover: &mut *remover,
                })?;
            }
            parameters.push(ObjectActionParameter::new(
                Arc::clone(class),
                &identifier,
                param_index,
                parameter.name.clone(),
                parameter.type_ref.clone(),
                param_facets,
            ));
        }

        Ok(ObjectAction::new(
            Arc::clone(class),
            identifier,
            method.return_type.clone(),
            parameters,
            facets,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        descriptor::{MethodBody, ParameterDescriptor},
        facet::{FacetKind, FacetType, Precedence},
        object::Value,
    };

    fn order() -> Arc<ClassDescriptor> {
        Arc::new(
            ClassDescriptor::new("com.acme.Order")
                .method(
                    MethodDescriptor::new("getQuantity", TypeRef::Integer)
                        .annotated(Annotation::MaxLength { value: 3 }),
                )
                .method(
                    MethodDescriptor::new("setQuantity", TypeRef::Void)
                        .param(ParameterDescriptor::new("quantity", TypeRef::Integer)),
                )
                .method(MethodDescriptor::new("disableQuantity", TypeRef::Text))
                .method(MethodDescriptor::new("isShipped", TypeRef::Boolean))
                .method(MethodDescriptor::new(
                    "getLines",
                    TypeRef::Collection("com.acme.OrderLine".into()),
                ))
                .method(
                    MethodDescriptor::new("place", TypeRef::Void)
                        .param(ParameterDescriptor::new("note", TypeRef::Text)),
                )
                .method(
                    MethodDescriptor::new("validate0Place", TypeRef::Text)
                        .param(ParameterDescriptor::new("note", TypeRef::Text)),
                )
                .method(
                    MethodDescriptor::new("helper", TypeRef::Void)
                        .annotated(Annotation::Programmatic),
                )
                .method(MethodDescriptor::new("create", TypeRef::Void).static_method())
                .method(
                    MethodDescriptor::new("title", TypeRef::Text)
                        .body(MethodBody::query(|_, _| Ok(Value::from("Order")))),
                ),
        )
    }

    #[test]
    fn members_are_discovered() {
        let model = ProgrammingModel::with_defaults();
        let result = Introspector::new(&model).introspect(&order()).unwrap();

        let props: Vec<_> = result.properties.iter().map(|p| p.id()).collect();
        assert_eq!(props, vec!["quantity", "shipped"]);
        assert_eq!(result.collections.len(), 1);
        assert_eq!(result.collections[0].element_type(), "com.acme.OrderLine");

        let actions: Vec<_> = result.actions.iter().map(|a| a.id()).collect();
        assert_eq!(actions, vec!["place"]);
        assert!(result.unclaimed_supporting_methods.is_empty());
        assert!(result.facets.contains(FacetType::Title));
    }

    #[test]
    fn supporting_methods_become_facets() {
        let model = ProgrammingModel::with_defaults();
        let result = Introspector::new(&model).introspect(&order()).unwrap();

        let quantity = &result.properties[0];
        assert!(quantity.facets().contains(FacetType::PropertySetter));
        assert!(quantity.facets().contains(FacetType::DisableForContext));
        assert_eq!(quantity.max_length(), Some(3));

        let place = &result.actions[0];
        assert_eq!(place.identifier().to_string(), "com.acme.Order#place(text)");
        let param = &place.parameters()[0];
        assert!(param.facets().contains(FacetType::ValidateParameter));
    }

    #[test]
    fn explicit_survives_fallback() {
        let class = Arc::new(ClassDescriptor::new("a.B").method(
            MethodDescriptor::new("getName", TypeRef::Text).annotated(Annotation::Optional),
        ));
        let model = ProgrammingModel::with_defaults();
        let result = Introspector::new(&model).introspect(&class).unwrap();

        let mandatory = result.properties[0].facets().get_facet(FacetType::Mandatory).unwrap();
        assert_eq!(mandatory.kind(), &FacetKind::Mandatory(false));
        assert_eq!(mandatory.precedence(), Precedence::High);
    }

    #[test]
    fn unclaimed_prefixed_methods_are_recorded() {
        let class = Arc::new(
            ClassDescriptor::new("a.B").method(MethodDescriptor::new("hideNothing", TypeRef::Boolean)),
        );
        let model = ProgrammingModel::with_defaults();
        let result = Introspector::new(&model).introspect(&class).unwrap();

        assert!(result.actions.is_empty());
        assert_eq!(result.unclaimed_supporting_methods, vec!["hideNothing".to_string()]);
    }

    #[test]
    fn supporting_prefix_is_never_an_action() {
        let class = Arc::new(
            ClassDescriptor::new("a.B")
                .method(MethodDescriptor::new("getName", TypeRef::Text))
                .method(MethodDescriptor::new("defaultAll", TypeRef::Void))
                .method(MethodDescriptor::new("reset", TypeRef::Void)),
        );
        let model = ProgrammingModel::with_defaults();
        let result = Introspector::new(&model).introspect(&class).unwrap();

        let actions: Vec<_> = result.actions.iter().map(|a| a.id()).collect();
        assert_eq!(actions, vec!["reset"]);
        assert_eq!(result.unclaimed_supporting_methods, vec!["defaultAll".to_string()]);
    }

    #[test]
    fn accessor_naming() {
        assert_eq!(
            accessor_id(&MethodDescriptor::new("getQuantity", TypeRef::Integer)),
            Some("quantity".into())
        );
        assert_eq!(
            accessor_id(&MethodDescriptor::new("isActive", TypeRef::Boolean)),
            Some("active".into())
        );
        assert_eq!(accessor_id(&MethodDescriptor::new("isActive", TypeRef::Text)), None);
        assert_eq!(accessor_id(&MethodDescriptor::new("getaway", TypeRef::Text)), None);
        assert_eq!(accessor_id(&MethodDescriptor::new("getNothing", TypeRef::Void)), None);
    }
}
