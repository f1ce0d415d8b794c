//! Integration tests for facetwork-core.

use std::sync::Arc;

use facetwork_core::{
    application::{InteractionError, SpecificationLoader, ports::ClassSource},
    domain::{
        Annotation, ClassDescriptor, Consent, Facet, FacetHolder, FacetKind, FacetType,
        Identifier, InteractionContext, InteractionInitiatedBy, InteractionType, MetaModelError,
        MethodBody, MethodDescriptor, ObjectAdapter, ParameterDescriptor, Precedence,
        ProgrammingModel, Session, TypeRef, UserMemento, Value, When, Where, interaction,
    },
    error::{FacetworkError, FacetworkResult},
    prelude::WrapperFactory,
};
use mockall::mock;

mock! {
    Source {}

    impl ClassSource for Source {
        fn discover(&self) -> FacetworkResult<Vec<String>>;
        fn lookup(&self, name: &str) -> FacetworkResult<Option<Arc<ClassDescriptor>>>;
    }
}

fn source_of(classes: Vec<Arc<ClassDescriptor>>) -> MockSource {
    let names: Vec<String> = classes.iter().map(|c| c.name.clone()).collect();
    let mut source = MockSource::new();
    source.expect_discover().returning(move || Ok(names.clone()));
    source.expect_lookup().returning(move |name| {
        Ok(classes.iter().find(|c| c.name == name).cloned())
    });
    source
}

fn loader_for(classes: Vec<Arc<ClassDescriptor>>) -> Arc<SpecificationLoader> {
    Arc::new(SpecificationLoader::new(
        Arc::new(source_of(classes)),
        Arc::new(ProgrammingModel::with_defaults()),
    ))
}

fn order() -> Arc<ClassDescriptor> {
    Arc::new(
        ClassDescriptor::new("com.acme.Order")
            .method(
                MethodDescriptor::new("getQuantity", TypeRef::Integer)
                    .body(MethodBody::query(|o, _| Ok(o.field("quantity")))),
            )
            .method(
                MethodDescriptor::new("setQuantity", TypeRef::Void)
                    .param(ParameterDescriptor::new("quantity", TypeRef::Integer))
                    .body(MethodBody::command(|o, args| {
                        o.set_field("quantity", args[0].clone());
                        Ok(Value::Null)
                    })),
            )
            .method(
                MethodDescriptor::new("disableQuantity", TypeRef::Text).body(MethodBody::query(
                    |o, _| {
                        Ok(if o.is_persistent() {
                            Value::from("Cannot change quantity once placed")
                        } else {
                            Value::Null
                        })
                    },
                )),
            ),
    )
}

fn session() -> Session {
    Session::permit_all(UserMemento::new("sven"))
}

#[test]
fn explicit_facet_survives_later_fallback() {
    let mut holder = FacetHolder::new();
    holder.add_facet(Facet::explicit(FacetKind::Named("Amount".into()), "NamedFacetFactory"));
    holder.add_facet(Facet::fallback(FacetKind::Named("Quantity".into()), "FallbackFacetFactory"));

    let named = holder.get_facet(FacetType::Named).unwrap();
    assert_eq!(named.kind(), &FacetKind::Named("Amount".into()));
    assert_eq!(named.precedence(), Precedence::High);
}

#[test]
fn explicit_disable_survives_later_immutability_factory() {
    let class = Arc::new(
        ClassDescriptor::new("x.Imm")
            .annotated(Annotation::Immutable {
                reason: Some("frozen".into()),
            })
            .method(MethodDescriptor::new("getA", TypeRef::Integer))
            .method(
                MethodDescriptor::new("getB", TypeRef::Integer).annotated(Annotation::Disabled {
                    when: When::Never,
                    reason: None,
                }),
            ),
    );
    let loader = loader_for(vec![class]);
    loader.init_metamodel().unwrap();
    let spec = loader.load_specification("x.Imm").unwrap();
    let session = session();
    let target = ObjectAdapter::persistent("x.Imm", "1");

    let b = spec.property("b").unwrap();
    let disabled = b.facets().get_facet(FacetType::Disabled).unwrap();
    assert_eq!(
        disabled.kind(),
        &FacetKind::Disabled {
            when: When::Never,
            reason: None,
        }
    );
    assert_eq!(disabled.precedence(), Precedence::High);
    assert!(
        b.is_usable(&target, &session, InteractionInitiatedBy::User, Where::Anywhere)
            .unwrap()
            .is_allowed()
    );

    let a = spec.property("a").unwrap();
    let result = a
        .is_usable(&target, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert_eq!(result.reason(), Some("frozen"));
}

#[test]
fn at_most_one_facet_per_type() {
    let mut holder = FacetHolder::new();
    holder.add_facet(Facet::fallback(FacetKind::Mandatory(true), "FallbackFacetFactory"));
    holder.add_facet(Facet::explicit(FacetKind::Mandatory(false), "MandatoryFacetFactory"));
    holder.add_facet(Facet::default_for(FacetKind::MaxLength(5), "MaxLengthFacetFactory"));

    assert_eq!(holder.len(), 2);
    assert_eq!(
        holder.facet_types().iter().filter(|t| **t == FacetType::Mandatory).count(),
        1
    );
}

#[test]
fn no_advisors_means_allowed() {
    let class = ClassDescriptor::new("a.B");
    let id = Identifier::association("a.B", "name");
    let target = ObjectAdapter::transient("a.B");
    let session = session();
    let ctx = InteractionContext::new(
        InteractionType::MemberUsability,
        &id,
        &target,
        &class,
        &session,
    );

    let result = interaction::is_usable(&FacetHolder::new(), &ctx).unwrap();
    assert!(result.is_allowed());
    assert_eq!(result.create_consent(), Consent::Allow);
}

#[test]
fn any_veto_wins_with_a_reason() {
    let class = ClassDescriptor::new("a.B");
    let id = Identifier::association("a.B", "name");
    let target = ObjectAdapter::persistent("a.B", "1");
    let session = session();

    let mut holder = FacetHolder::new();
    holder.add_facet(Facet::inferred(FacetKind::Authorization, "AuthorizationFacetFactory"));
    holder.add_facet(Facet::explicit(
        FacetKind::Disabled {
            when: When::OncePersisted,
            reason: None,
        },
        "DisabledFacetFactory",
    ));

    let ctx = InteractionContext::new(
        InteractionType::MemberUsability,
        &id,
        &target,
        &class,
        &session,
    );
    let result = interaction::is_usable(&holder, &ctx).unwrap();

    assert!(result.is_vetoed());
    assert_eq!(result.reason(), Some("Cannot be changed once persisted"));
    assert_eq!(result.advisories().len(), 2);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["identifier"], "a.B#name");
}

#[test]
fn warm_cache_returns_same_specification() {
    let loader = loader_for(vec![order()]);
    let first = loader.load_specification("com.acme.Order").unwrap();
    let second = loader.load_specification("com.acme.Order").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn old_and_new_parameter_syntax_conflict_fails_bootstrap() {
    let class = Arc::new(
        ClassDescriptor::new("com.acme.Invoice")
            .method(
                MethodDescriptor::new("foo", TypeRef::Void).param(
                    ParameterDescriptor::new("amount", TypeRef::Integer).annotated(
                        Annotation::Hidden {
                            when: When::Always,
                            where_: Where::Anywhere,
                        },
                    ),
                ),
            )
            .method(
                MethodDescriptor::new("hide0Foo", TypeRef::Boolean)
                    .param(ParameterDescriptor::new("amount", TypeRef::Integer)),
            ),
    );
    let loader = loader_for(vec![class]);

    let err = loader.init_metamodel().unwrap_err();
    match &err {
        FacetworkError::Domain(MetaModelError::Validation { class, message }) => {
            assert_eq!(class, "com.acme.Invoice");
            assert!(message.contains("uses both old and new syntax"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn prefixed_method_without_member_is_reported_not_exposed() {
    let class = Arc::new(
        ClassDescriptor::new("com.acme.Basket")
            .method(MethodDescriptor::new("getTotal", TypeRef::Integer))
            .method(MethodDescriptor::new("defaultAll", TypeRef::Void)),
    );
    let loader = loader_for(vec![class]);

    let err = loader.init_metamodel().unwrap_err();
    assert!(err.to_string().contains("com.acme.Basket#defaultAll()"));

    let spec = loader.load_specification("com.acme.Basket").unwrap();
    assert!(spec.action("defaultAll").is_none());
}

#[test]
fn disable_supporting_method_vetoes_persisted_instances() {
    let loader = loader_for(vec![order()]);
    loader.init_metamodel().unwrap();
    let spec = loader.load_specification("com.acme.Order").unwrap();
    let quantity = spec.property("quantity").unwrap();
    let session = session();

    let persisted = ObjectAdapter::persistent("com.acme.Order", "42");
    let result = quantity
        .is_usable(&persisted, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert_eq!(result.reason(), Some("Cannot change quantity once placed"));

    let transient = ObjectAdapter::transient("com.acme.Order");
    let result = quantity
        .is_usable(&transient, &session, InteractionInitiatedBy::User, Where::Anywhere)
        .unwrap();
    assert!(result.is_allowed());
}

#[test]
fn wrapper_turns_veto_into_error() {
    let loader = loader_for(vec![order()]);
    let session = session();
    let mut persisted = ObjectAdapter::persistent("com.acme.Order", "42");

    let mut wrapped = WrapperFactory::new(loader).wrap(&mut persisted, &session).unwrap();
    let err = wrapped.set_property("quantity", Value::Int(9)).unwrap_err();
    assert!(matches!(
        err.as_interaction(),
        Some(InteractionError::Disabled { reason, .. }) if reason == "Cannot change quantity once placed"
    ));
}
