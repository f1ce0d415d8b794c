//! Guarded object access - the only place a veto becomes an error.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, InteractionError},
    domain::{
        InteractionInitiatedBy, InteractionResult, ObjectAction, ObjectAdapter,
        ObjectSpecification, OneToManyAssociation, OneToOneAssociation, Session, Value, Where,
    },
    error::FacetworkResult,
};

use super::specification_loader::SpecificationLoader;

/// Whether guarded calls go through after their checks pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapperMode {
    #[default]
    Execute,
    /// Run every check but leave the target untouched.
    NoExecute,
}

/// Builds [`Wrapped`] views over domain objects.
#[derive(Clone)]
pub struct WrapperFactory {
    loader: Arc<SpecificationLoader>,
    mode: WrapperMode,
}

impl WrapperFactory {
    pub fn new(loader: Arc<SpecificationLoader>) -> Self {
        Self {
            loader,
            mode: WrapperMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: WrapperMode) -> Self {
        self.mode = mode;
        self
    }

    /// Wrap `target` on behalf of the session's user.
    pub fn wrap<'a>(
        &self,
        target: &'a mut ObjectAdapter,
        session: &'a Session,
    ) -> FacetworkResult<Wrapped<'a>> {
        let spec = self.loader.load_specification(target.class_name())?;
        Ok(Wrapped {
            spec,
            target,
            session,
            mode: self.mode,
        })
    }
}

/// A domain object seen through its specification.
///
/// Every call checks visibility, then usability (for writes and
/// invocations), then validity, and refuses with an [`InteractionError`]
/// on the first veto. Invocations also check each parameter that receives
/// a non-null argument.
pub struct Wrapped<'a> {
    spec: Arc<ObjectSpecification>,
    target: &'a mut ObjectAdapter,
    session: &'a Session,
    mode: WrapperMode,
}

fn ensure(
    result: InteractionResult,
    refusal: fn(String, String) -> InteractionError,
) -> FacetworkResult<()> {
    match result.reason() {
        Some(reason) => {
            debug!(identifier = result.identifier(), reason, "interaction vetoed");
            Err(refusal(result.identifier().to_string(), reason.to_string()).into())
        }
        None => Ok(()),
    }
}

fn hidden(identifier: String, reason: String) -> InteractionError {
    InteractionError::Hidden { identifier, reason }
}

fn disabled(identifier: String, reason: String) -> InteractionError {
    InteractionError::Disabled { identifier, reason }
}

fn invalid(identifier: String, reason: String) -> InteractionError {
    InteractionError::Invalid { identifier, reason }
}

const USER: InteractionInitiatedBy = InteractionInitiatedBy::User;

impl Wrapped<'_> {
    pub fn specification(&self) -> &ObjectSpecification {
        &self.spec
    }

    pub fn target(&self) -> &ObjectAdapter {
        self.target
    }

    pub fn mode(&self) -> WrapperMode {
        self.mode
    }

    #[instrument(skip(self), fields(class = %self.spec.full_name()))]
    pub fn get_property(&self, id: &str) -> FacetworkResult<Value> {
        let property = self.property(id)?;
        ensure(
            property.is_visible(self.target, self.session, USER, Where::Anywhere)?,
            hidden,
        )?;
        Ok(property.get(self.target)?)
    }

    #[instrument(skip(self), fields(class = %self.spec.full_name()))]
    pub fn get_collection(&self, id: &str) -> FacetworkResult<Vec<Value>> {
        let collection = self.collection(id)?;
        ensure(
            collection.is_visible(self.target, self.session, USER, Where::Anywhere)?,
            hidden,
        )?;
        Ok(collection.get(self.target)?)
    }

    #[instrument(skip(self, value), fields(class = %self.spec.full_name()))]
    pub fn set_property(&mut self, id: &str, value: Value) -> FacetworkResult<()> {
        let spec = Arc::clone(&self.spec);
        let property = find_property(&spec, id)?;
        ensure(
            property.is_visible(self.target, self.session, USER, Where::Anywhere)?,
            hidden,
        )?;
        ensure(
            property.is_usable(self.target, self.session, USER, Where::Anywhere)?,
            disabled,
        )?;
        ensure(
            property.is_valid(self.target, &value, self.session, USER)?,
            invalid,
        )?;
        if self.mode == WrapperMode::Execute {
            property.set(self.target, value)?;
        }
        Ok(())
    }

    /// Invoke an action. Returns `Value::Null` without executing in
    /// [`WrapperMode::NoExecute`].
    #[instrument(skip(self, args), fields(class = %self.spec.full_name()))]
    pub fn invoke_action(&mut self, id: &str, args: &[Value]) -> FacetworkResult<Value> {
        let spec = Arc::clone(&self.spec);
        let action = find_action(&spec, id)?;
        ensure(
            action.is_visible(self.target, self.session, USER, Where::Anywhere)?,
            hidden,
        )?;
        ensure(
            action.is_usable(self.target, self.session, USER, Where::Anywhere)?,
            disabled,
        )?;
        for parameter in action.parameters() {
            if args.get(parameter.index()).is_none_or(Value::is_null) {
                continue;
            }
            ensure(
                parameter.is_visible(self.target, args, self.session, USER)?,
                hidden,
            )?;
            ensure(
                parameter.is_usable(self.target, args, self.session, USER)?,
                disabled,
            )?;
        }
        let results = action.is_proposed_argument_set_valid(self.target, args, self.session, USER)?;
        if let Some(vetoed) = results.first_vetoed() {
            ensure(vetoed.clone(), invalid)?;
        }
        match self.mode {
            WrapperMode::Execute => Ok(action.execute(self.target, args)?),
            WrapperMode::NoExecute => Ok(Value::Null),
        }
    }

    /// Object-level validation.
    pub fn validate(&self) -> FacetworkResult<()> {
        ensure(
            self.spec.validate_object(self.target, self.session, USER)?,
            invalid,
        )
    }

    pub fn title(&self) -> FacetworkResult<String> {
        Ok(self.spec.title_of(self.target)?)
    }

    fn property(&self, id: &str) -> FacetworkResult<&OneToOneAssociation> {
        find_property(&self.spec, id)
    }

    fn collection(&self, id: &str) -> FacetworkResult<&OneToManyAssociation> {
        self.spec
            .collection(id)
            .ok_or_else(|| member_not_found(&self.spec, id))
    }
}

fn find_property<'s>(spec: &'s ObjectSpecification, id: &str) -> FacetworkResult<&'s OneToOneAssociation> {
    spec.property(id).ok_or_else(|| member_not_found(spec, id))
}

fn find_action<'s>(spec: &'s ObjectSpecification, id: &str) -> FacetworkResult<&'s ObjectAction> {
    spec.action(id).ok_or_else(|| member_not_found(spec, id))
}

fn member_not_found(spec: &ObjectSpecification, id: &str) -> crate::error::FacetworkError {
    ApplicationError::MemberNotFound {
        class: spec.full_name().to_string(),
        member: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::output::MockClassSource;
    use crate::domain::{
        Annotation, ClassDescriptor, MethodBody, MethodDescriptor, ParameterDescriptor,
        ProgrammingModel, TypeRef, UserMemento, When,
    };

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
                )
                .method(
                    MethodDescriptor::new("getNote", TypeRef::Text)
                        .annotated(Annotation::MaxLength { value: 5 })
                        .body(MethodBody::query(|o, _| Ok(o.field("note")))),
                )
                .method(
                    MethodDescriptor::new("setNote", TypeRef::Void)
                        .param(ParameterDescriptor::new("note", TypeRef::Text))
                        .body(MethodBody::command(|o, args| {
                            o.set_field("note", args[0].clone());
                            Ok(Value::Null)
                        })),
                )
                .method(
                    MethodDescriptor::new("ship", TypeRef::Void)
                        .param(ParameterDescriptor::new("carrier", TypeRef::Text).annotated(
                            Annotation::Hidden {
                                when: When::Always,
                                where_: Where::Anywhere,
                            },
                        ))
                        .param(ParameterDescriptor::new("priority", TypeRef::Integer).annotated(
                            Annotation::Disabled {
                                when: When::Always,
                                reason: Some("Priority is fixed".into()),
                            },
                        ))
                        .body(MethodBody::command(|_, _| Ok(Value::Null))),
                )
                .method(
                    MethodDescriptor::new("place", TypeRef::Void).body(MethodBody::command(
                        |o, _| {
                            o.mark_persistent("1");
                            Ok(Value::Null)
                        },
                    )),
                ),
        )
    }

    fn factory(mode: WrapperMode) -> WrapperFactory {
        let mut source = MockClassSource::new();
        source.expect_lookup().returning(|_| Ok(Some(order())));
        let loader = SpecificationLoader::new(
            Arc::new(source),
            Arc::new(ProgrammingModel::with_defaults()),
        );
        WrapperFactory::new(Arc::new(loader)).with_mode(mode)
    }

    fn session() -> Session {
        Session::permit_all(UserMemento::new("sven"))
    }

    #[test]
    fn transient_order_is_editable() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        let mut wrapped = factory(WrapperMode::Execute).wrap(&mut order, &session).unwrap();

        wrapped.set_property("quantity", Value::Int(3)).unwrap();
        assert_eq!(wrapped.get_property("quantity").unwrap(), Value::Int(3));
    }

    #[test]
    fn persisted_order_refuses_with_reason() {
        let session = session();
        let mut order = ObjectAdapter::persistent("com.acme.Order", "7");
        let mut wrapped = factory(WrapperMode::Execute).wrap(&mut order, &session).unwrap();

        let err = wrapped.set_property("quantity", Value::Int(3)).unwrap_err();
        assert_eq!(
            err.as_interaction(),
            Some(&InteractionError::Disabled {
                identifier: "com.acme.Order#quantity".into(),
                reason: "Cannot change quantity once placed".into(),
            })
        );
    }

    #[test]
    fn invalid_value_is_refused() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        let mut wrapped = factory(WrapperMode::Execute).wrap(&mut order, &session).unwrap();

        let err = wrapped
            .set_property("note", Value::from("far too long"))
            .unwrap_err();
        assert!(matches!(
            err.as_interaction(),
            Some(InteractionError::Invalid { .. })
        ));
    }

    #[test]
    fn no_execute_leaves_target_alone() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        {
            let mut wrapped = factory(WrapperMode::NoExecute).wrap(&mut order, &session).unwrap();
            wrapped.set_property("quantity", Value::Int(3)).unwrap();
            assert_eq!(wrapped.invoke_action("place", &[]).unwrap(), Value::Null);
        }
        assert!(order.field("quantity").is_null());
        assert!(order.is_transient());
    }

    #[test]
    fn actions_execute() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        factory(WrapperMode::Execute)
            .wrap(&mut order, &session)
            .unwrap()
            .invoke_action("place", &[])
            .unwrap();
        assert!(order.is_persistent());
    }

    #[test]
    fn arguments_for_hidden_or_disabled_parameters_are_refused() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        let mut wrapped = factory(WrapperMode::Execute).wrap(&mut order, &session).unwrap();

        let err = wrapped
            .invoke_action("ship", &[Value::from("ups"), Value::Null])
            .unwrap_err();
        assert!(matches!(
            err.as_interaction(),
            Some(InteractionError::Hidden { reason, .. }) if reason == "Always hidden"
        ));

        let err = wrapped
            .invoke_action("ship", &[Value::Null, Value::Int(1)])
            .unwrap_err();
        assert!(matches!(
            err.as_interaction(),
            Some(InteractionError::Disabled { reason, .. }) if reason == "Priority is fixed"
        ));

        // Absent arguments skip the parameter checks and fail validity instead.
        let err = wrapped.invoke_action("ship", &[]).unwrap_err();
        assert!(matches!(
            err.as_interaction(),
            Some(InteractionError::Invalid { reason, .. }) if reason == "Mandatory"
        ));
    }

    #[test]
    fn unknown_member() {
        let session = session();
        let mut order = ObjectAdapter::transient("com.acme.Order");
        let wrapped = factory(WrapperMode::Execute).wrap(&mut order, &session).unwrap();
        let err = wrapped.get_property("nope").unwrap_err();
        assert!(err.to_string().contains("No member 'nope' on com.acme.Order"));
    }
}
