//! Per-class metamodel nodes and their members.
//!
//! An [`ObjectSpecification`] starts life as a placeholder while its class is
//! being introspected and is published exactly once. After that its member
//! set never changes. Members keep a handle on the class descriptor so they
//! can dispatch to supporting methods without going back through the loader.

use std::{
    collections::BTreeSet,
    sync::{Arc, OnceLock},
};

use serde::Serialize;

use crate::domain::{
    descriptor::{ClassDescriptor, TypeRef, natural_name},
    error::{InvocationError, MetaModelError},
    facet::{FacetKind, FacetType, MethodRef, Nature, Where},
    feature::FeatureType,
    holder::FacetHolder,
    identifier::Identifier,
    interaction::{
        self, InteractionContext, InteractionInitiatedBy, InteractionResult,
        InteractionResultSet, InteractionType, padded_arguments,
    },
    object::{ObjectAdapter, Value},
    session::Session,
};

static NO_FACETS: FacetHolder = FacetHolder::new();

// ── Dispatch helpers ─────────────────────────────────────────────────────────

fn invoke(
    class: &ClassDescriptor,
    identifier: &Identifier,
    method: &MethodRef,
    target: &ObjectAdapter,
    args: &[Value],
) -> Result<Value, MetaModelError> {
    let wrap = |source: InvocationError| MetaModelError::Invocation {
        identifier: identifier.to_string(),
        source,
    };
    let descriptor = class
        .method_at(method.index)
        .filter(|m| m.name == method.name)
        .ok_or_else(|| {
            wrap(InvocationError::Failed {
                method: method.name.clone(),
                reason: format!("not declared on {}", class.name),
            })
        })?;
    descriptor.invoke(target, args).map_err(wrap)
}

fn invoke_mut(
    class: &ClassDescriptor,
    identifier: &Identifier,
    method: &MethodRef,
    target: &mut ObjectAdapter,
    args: &[Value],
) -> Result<Value, MetaModelError> {
    let wrap = |source: InvocationError| MetaModelError::Invocation {
        identifier: identifier.to_string(),
        source,
    };
    let descriptor = class
        .method_at(method.index)
        .filter(|m| m.name == method.name)
        .ok_or_else(|| {
            wrap(InvocationError::Failed {
                method: method.name.clone(),
                reason: format!("not declared on {}", class.name),
            })
        })?;
    descriptor.invoke_mut(target, args).map_err(wrap)
}

fn choices_from(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::List(values) => values,
        single => vec![single],
    }
}

fn friendly_name(facets: &FacetHolder, fallback: &str) -> String {
    match facets.get_facet(FacetType::Named).map(|f| f.kind()) {
        Some(FacetKind::Named(name)) => name.clone(),
        _ => natural_name(fallback),
    }
}

fn description(facets: &FacetHolder) -> Option<&str> {
    match facets.get_facet(FacetType::DescribedAs).map(|f| f.kind()) {
        Some(FacetKind::DescribedAs(text)) => Some(text),
        _ => None,
    }
}

/// Inputs shared by every check on a member.
struct Check<'a> {
    class: &'a ClassDescriptor,
    identifier: &'a Identifier,
    target: &'a ObjectAdapter,
    session: &'a Session,
    initiated_by: InteractionInitiatedBy,
}

impl<'a> Check<'a> {
    fn context(&self, interaction_type: InteractionType) -> InteractionContext<'a> {
        InteractionContext::new(
            interaction_type,
            self.identifier,
            self.target,
            self.class,
            self.session,
        )
        .initiated_by(self.initiated_by)
    }
}

// ── Object specification ─────────────────────────────────────────────────────

/// Everything introspection produces for one class.
#[derive(Debug, Clone, Default)]
pub struct Introspection {
    pub facets: FacetHolder,
    pub properties: Vec<OneToOneAssociation>,
    pub collections: Vec<OneToManyAssociation>,
    pub actions: Vec<ObjectAction>,
    /// Methods named like supporting methods that no factory claimed.
    pub unclaimed_supporting_methods: Vec<String>,
}

impl Introspection {
    /// Classes named by member types, other than `own`.
    pub fn referenced_classes(&self, own: &str) -> BTreeSet<String> {
        let mut types: Vec<&TypeRef> = self.properties.iter().map(|p| p.type_ref()).collect();
        for a in &self.actions {
            types.push(a.return_type());
            types.extend(a.parameters().iter().map(|p| p.type_ref()));
        }
        let mut out: BTreeSet<String> = types
            .into_iter()
            .filter_map(|t| t.referenced_class().map(str::to_string))
            .collect();
        out.extend(self.collections.iter().map(|c| c.element_type().to_string()));
        out.remove(own);
        out
    }
}

/// The metamodel node for one domain class.
#[derive(Debug)]
pub struct ObjectSpecification {
    identifier: Identifier,
    class: Arc<ClassDescriptor>,
    introspection: OnceLock<Introspection>,
}

impl ObjectSpecification {
    /// A specification whose introspection is still in progress.
    pub fn placeholder(class: Arc<ClassDescriptor>) -> Self {
        Self {
            identifier: Identifier::class(class.name.clone()),
            class,
            introspection: OnceLock::new(),
        }
    }

    pub fn introspected(class: Arc<ClassDescriptor>, introspection: Introspection) -> Self {
        let spec = Self::placeholder(class);
        spec.publish(introspection);
        spec
    }

    /// Publish the introspection result. Only the first call has an effect;
    /// returns whether this call published.
    pub fn publish(&self, introspection: Introspection) -> bool {
        self.introspection.set(introspection).is_ok()
    }

    pub fn is_introspected(&self) -> bool {
        self.introspection.get().is_some()
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn full_name(&self) -> &str {
        &self.class.name
    }

    pub fn short_name(&self) -> &str {
        self.identifier.short_class_name()
    }

    pub fn class_descriptor(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Class-level facets. Empty while introspection is in progress.
    pub fn facets(&self) -> &FacetHolder {
        self.introspection.get().map_or(&NO_FACETS, |i| &i.facets)
    }

    pub fn properties(&self) -> &[OneToOneAssociation] {
        self.introspection
            .get()
            .map(|i| i.properties.as_slice())
            .unwrap_or_default()
    }

    pub fn collections(&self) -> &[OneToManyAssociation] {
        self.introspection
            .get()
            .map(|i| i.collections.as_slice())
            .unwrap_or_default()
    }

    pub fn actions(&self) -> &[ObjectAction] {
        self.introspection
            .get()
            .map(|i| i.actions.as_slice())
            .unwrap_or_default()
    }

    pub fn unclaimed_supporting_methods(&self) -> &[String] {
        self.introspection
            .get()
            .map(|i| i.unclaimed_supporting_methods.as_slice())
            .unwrap_or_default()
    }

    pub fn property(&self, id: &str) -> Option<&OneToOneAssociation> {
        self.properties().iter().find(|p| p.id() == id)
    }

    pub fn collection(&self, id: &str) -> Option<&OneToManyAssociation> {
        self.collections().iter().find(|c| c.id() == id)
    }

    pub fn action(&self, id: &str) -> Option<&ObjectAction> {
        self.actions().iter().find(|a| a.id() == id)
    }

    /// Any member by id; properties shadow collections shadow actions.
    pub fn member(&self, id: &str) -> Option<ObjectMember<'_>> {
        self.property(id)
            .map(ObjectMember::Property)
            .or_else(|| self.collection(id).map(ObjectMember::Collection))
            .or_else(|| self.action(id).map(ObjectMember::Action))
    }

    /// All members in property, collection, action order.
    pub fn members(&self) -> impl Iterator<Item = ObjectMember<'_>> {
        self.properties()
            .iter()
            .map(ObjectMember::Property)
            .chain(self.collections().iter().map(ObjectMember::Collection))
            .chain(self.actions().iter().map(ObjectMember::Action))
    }

    /// Domain classes this class refers to through members.
    pub fn referenced_classes(&self) -> BTreeSet<String> {
        self.introspection
            .get()
            .map(|i| i.referenced_classes(self.full_name()))
            .unwrap_or_default()
    }

    pub fn friendly_name(&self) -> String {
        friendly_name(self.facets(), self.short_name())
    }

    pub fn description(&self) -> Option<&str> {
        description(self.facets())
    }

    pub fn logical_type_name(&self) -> &str {
        match self
            .facets()
            .get_facet(FacetType::LogicalTypeName)
            .map(|f| f.kind())
        {
            Some(FacetKind::LogicalTypeName(name)) => name,
            _ => self.full_name(),
        }
    }

    pub fn nature(&self) -> Nature {
        match self.facets().get_facet(FacetType::DomainObject).map(|f| f.kind()) {
            Some(FacetKind::DomainObject(nature)) => *nature,
            _ => Nature::NotSpecified,
        }
    }

    pub fn is_immutable(&self) -> bool {
        self.facets().contains(FacetType::Immutable)
    }

    /// Title via the class's `title()` method, or a generic one.
    pub fn title_of(&self, target: &ObjectAdapter) -> Result<String, MetaModelError> {
        match self.facets().get_facet(FacetType::Title).map(|f| f.kind()) {
            Some(FacetKind::Title(method)) => {
                let value = invoke(&self.class, &self.identifier, method, target, &[])?;
                Ok(value.to_string())
            }
            _ => Ok(format!("Untitled {}", self.friendly_name())),
        }
    }

    /// Object-level validation (the class's `validate()` method).
    pub fn validate_object(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = InteractionContext::new(
            InteractionType::ObjectValidate,
            &self.identifier,
            target,
            &self.class,
            session,
        )
        .initiated_by(initiated_by);
        interaction::is_valid(self.facets(), &ctx)
    }
}

/// Borrowed view over any member kind.
#[derive(Debug, Clone, Copy)]
pub enum ObjectMember<'a> {
    Property(&'a OneToOneAssociation),
    Collection(&'a OneToManyAssociation),
    Action(&'a ObjectAction),
}

impl ObjectMember<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Property(p) => p.id(),
            Self::Collection(c) => c.id(),
            Self::Action(a) => a.id(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        match self {
            Self::Property(p) => p.identifier(),
            Self::Collection(c) => c.identifier(),
            Self::Action(a) => a.identifier(),
        }
    }

    pub fn facets(&self) -> &FacetHolder {
        match self {
            Self::Property(p) => p.facets(),
            Self::Collection(c) => c.facets(),
            Self::Action(a) => a.facets(),
        }
    }

    pub fn feature_type(&self) -> FeatureType {
        match self {
            Self::Property(_) => FeatureType::Property,
            Self::Collection(_) => FeatureType::Collection,
            Self::Action(_) => FeatureType::Action,
        }
    }

    pub fn friendly_name(&self) -> String {
        friendly_name(self.facets(), self.id())
    }

    pub fn is_visible(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        match self {
            Self::Property(p) => p.is_visible(target, session, initiated_by, where_),
            Self::Collection(c) => c.is_visible(target, session, initiated_by, where_),
            Self::Action(a) => a.is_visible(target, session, initiated_by, where_),
        }
    }

    pub fn is_usable(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        match self {
            Self::Property(p) => p.is_usable(target, session, initiated_by, where_),
            Self::Collection(c) => c.is_usable(target, session, initiated_by, where_),
            Self::Action(a) => a.is_usable(target, session, initiated_by, where_),
        }
    }
}

// ── Properties ───────────────────────────────────────────────────────────────

/// A scalar or reference property.
#[derive(Debug, Clone)]
pub struct OneToOneAssociation {
    id: String,
    identifier: Identifier,
    type_ref: TypeRef,
    facets: FacetHolder,
    class: Arc<ClassDescriptor>,
}

impl OneToOneAssociation {
    pub fn new(
        class: Arc<ClassDescriptor>,
        id: impl Into<String>,
        type_ref: TypeRef,
        facets: FacetHolder,
    ) -> Self {
        let id = id.into();
        Self {
            identifier: Identifier::association(class.name.clone(), id.clone()),
            id,
            type_ref,
            facets,
            class,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    pub fn friendly_name(&self) -> String {
        friendly_name(&self.facets, &self.id)
    }

    pub fn description(&self) -> Option<&str> {
        description(&self.facets)
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(
            self.facets.get_facet(FacetType::Mandatory).map(|f| f.kind()),
            Some(FacetKind::Mandatory(true))
        )
    }

    pub fn max_length(&self) -> Option<usize> {
        match self.facets.get_facet(FacetType::MaxLength).map(|f| f.kind()) {
            Some(FacetKind::MaxLength(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.facets.contains(FacetType::PropertySetter)
    }

    pub fn get(&self, target: &ObjectAdapter) -> Result<Value, MetaModelError> {
        match self
            .facets
            .get_facet(FacetType::PropertyAccessor)
            .map(|f| f.kind())
        {
            Some(FacetKind::PropertyAccessor(method)) => {
                invoke(&self.class, &self.identifier, method, target, &[])
            }
            _ => Err(self.missing("get")),
        }
    }

    pub fn set(&self, target: &mut ObjectAdapter, value: Value) -> Result<(), MetaModelError> {
        match self
            .facets
            .get_facet(FacetType::PropertySetter)
            .map(|f| f.kind())
        {
            Some(FacetKind::PropertySetter(method)) => {
                invoke_mut(&self.class, &self.identifier, method, target, &[value])?;
                Ok(())
            }
            _ => Err(self.missing("set")),
        }
    }

    pub fn choices(&self, target: &ObjectAdapter) -> Result<Vec<Value>, MetaModelError> {
        match self.facets.get_facet(FacetType::Choices).map(|f| f.kind()) {
            Some(FacetKind::Choices(method)) => {
                invoke(&self.class, &self.identifier, method, target, &[]).map(choices_from)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn default_value(&self, target: &ObjectAdapter) -> Result<Value, MetaModelError> {
        match self.facets.get_facet(FacetType::Default).map(|f| f.kind()) {
            Some(FacetKind::Default(method)) => {
                invoke(&self.class, &self.identifier, method, target, &[])
            }
            _ => Ok(Value::Null),
        }
    }

    pub fn is_visible(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberVisibility)
            .rendered_in(where_);
        interaction::is_visible(&self.facets, &ctx)
    }

    pub fn is_usable(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberUsability)
            .rendered_in(where_);
        interaction::is_usable(&self.facets, &ctx)
    }

    /// Validity of assigning `proposed` to this property.
    pub fn is_valid(
        &self,
        target: &ObjectAdapter,
        proposed: &Value,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::PropertyModify)
            .with_proposed(proposed);
        interaction::is_valid(&self.facets, &ctx)
    }

    fn check<'a>(
        &'a self,
        target: &'a ObjectAdapter,
        session: &'a Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Check<'a> {
        Check {
            class: &self.class,
            identifier: &self.identifier,
            target,
            session,
            initiated_by,
        }
    }

    fn missing(&self, what: &str) -> MetaModelError {
        MetaModelError::Invocation {
            identifier: self.identifier.to_string(),
            source: InvocationError::Failed {
                method: format!("{what}{}", crate::domain::descriptor::capitalize(&self.id)),
                reason: format!("property '{}' has no {what}ter", self.id),
            },
        }
    }
}

// ── Collections ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OneToManyAssociation {
    id: String,
    identifier: Identifier,
    element_type: String,
    facets: FacetHolder,
    class: Arc<ClassDescriptor>,
}

impl OneToManyAssociation {
    pub fn new(
        class: Arc<ClassDescriptor>,
        id: impl Into<String>,
        element_type: impl Into<String>,
        facets: FacetHolder,
    ) -> Self {
        let id = id.into();
        Self {
            identifier: Identifier::association(class.name.clone(), id.clone()),
            id,
            element_type: element_type.into(),
            facets,
            class,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    pub fn get(&self, target: &ObjectAdapter) -> Result<Vec<Value>, MetaModelError> {
        match self
            .facets
            .get_facet(FacetType::CollectionAccessor)
            .map(|f| f.kind())
        {
            Some(FacetKind::CollectionAccessor { method, .. }) => {
                invoke(&self.class, &self.identifier, method, target, &[]).map(choices_from)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn is_visible(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberVisibility)
            .rendered_in(where_);
        interaction::is_visible(&self.facets, &ctx)
    }

    pub fn is_usable(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberUsability)
            .rendered_in(where_);
        interaction::is_usable(&self.facets, &ctx)
    }

    fn check<'a>(
        &'a self,
        target: &'a ObjectAdapter,
        session: &'a Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Check<'a> {
        Check {
            class: &self.class,
            identifier: &self.identifier,
            target,
            session,
            initiated_by,
        }
    }
}

// ── Actions ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ObjectAction {
    id: String,
    identifier: Identifier,
    return_type: TypeRef,
    parameters: Vec<ObjectActionParameter>,
    facets: FacetHolder,
    class: Arc<ClassDescriptor>,
}

impl ObjectAction {
    pub fn new(
        class: Arc<ClassDescriptor>,
        identifier: Identifier,
        return_type: TypeRef,
        parameters: Vec<ObjectActionParameter>,
        facets: FacetHolder,
    ) -> Self {
        Self {
            id: identifier.member_name().unwrap_or_default().to_string(),
            identifier,
            return_type,
            parameters,
            facets,
            class,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.return_type
    }

    pub fn parameters(&self) -> &[ObjectActionParameter] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    pub fn friendly_name(&self) -> String {
        friendly_name(&self.facets, &self.id)
    }

    /// Run the action body. No checks; see the wrapper for guarded calls.
    pub fn execute(
        &self,
        target: &mut ObjectAdapter,
        args: &[Value],
    ) -> Result<Value, MetaModelError> {
        match self
            .facets
            .get_facet(FacetType::ActionInvocation)
            .map(|f| f.kind())
        {
            Some(FacetKind::ActionInvocation(method)) => {
                invoke_mut(&self.class, &self.identifier, method, target, args)
            }
            _ => Err(MetaModelError::Invocation {
                identifier: self.identifier.to_string(),
                source: InvocationError::MissingBody {
                    method: self.id.clone(),
                },
            }),
        }
    }

    pub fn is_visible(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberVisibility)
            .rendered_in(where_);
        interaction::is_visible(&self.facets, &ctx)
    }

    pub fn is_usable(
        &self,
        target: &ObjectAdapter,
        session: &Session,
        initiated_by: InteractionInitiatedBy,
        where_: Where,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberUsability)
            .rendered_in(where_);
        interaction::is_usable(&self.facets, &ctx)
    }

    /// Every parameter's validity followed by the action-level validation.
    pub fn is_proposed_argument_set_valid(
        &self,
        target: &ObjectAdapter,
        args: &[Value],
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResultSet, MetaModelError> {
        let mut set = InteractionResultSet::new();
        for parameter in &self.parameters {
            set.add(parameter.is_valid(target, args, session, initiated_by)?);
        }
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::ActionInvoke)
            .with_arguments(args);
        set.add(interaction::is_valid(&self.facets, &ctx)?);
        Ok(set)
    }

    fn check<'a>(
        &'a self,
        target: &'a ObjectAdapter,
        session: &'a Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Check<'a> {
        Check {
            class: &self.class,
            identifier: &self.identifier,
            target,
            session,
            initiated_by,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectActionParameter {
    index: usize,
    name: String,
    identifier: Identifier,
    type_ref: TypeRef,
    facets: FacetHolder,
    class: Arc<ClassDescriptor>,
}

impl ObjectActionParameter {
    pub fn new(
        class: Arc<ClassDescriptor>,
        action: &Identifier,
        index: usize,
        name: impl Into<String>,
        type_ref: TypeRef,
        facets: FacetHolder,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            identifier: action.parameter(index),
            type_ref,
            facets,
            class,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }

    pub fn friendly_name(&self) -> String {
        friendly_name(&self.facets, &self.name)
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(
            self.facets.get_facet(FacetType::Mandatory).map(|f| f.kind()),
            Some(FacetKind::Mandatory(true))
        )
    }

    /// Visibility given the arguments entered so far.
    pub fn is_visible(
        &self,
        target: &ObjectAdapter,
        pending: &[Value],
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::ParameterVisibility)
            .with_arguments(pending)
            .with_argument_index(self.index);
        interaction::is_visible(&self.facets, &ctx)
    }

    pub fn is_usable(
        &self,
        target: &ObjectAdapter,
        pending: &[Value],
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::MemberUsability)
            .with_arguments(pending)
            .with_argument_index(self.index);
        interaction::is_usable(&self.facets, &ctx)
    }

    /// Validity of the argument at this parameter's index in `args`.
    pub fn is_valid(
        &self,
        target: &ObjectAdapter,
        args: &[Value],
        session: &Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Result<InteractionResult, MetaModelError> {
        let ctx = self
            .check(target, session, initiated_by)
            .context(InteractionType::ActionArgument)
            .with_arguments(args)
            .with_argument_index(self.index);
        interaction::is_valid(&self.facets, &ctx)
    }

    pub fn choices(
        &self,
        target: &ObjectAdapter,
        pending: &[Value],
    ) -> Result<Vec<Value>, MetaModelError> {
        match self.facets.get_facet(FacetType::Choices).map(|f| f.kind()) {
            Some(FacetKind::Choices(method)) => self.invoke_supporting(method, target, pending).map(choices_from),
            _ => Ok(Vec::new()),
        }
    }

    pub fn default_value(
        &self,
        target: &ObjectAdapter,
        pending: &[Value],
    ) -> Result<Value, MetaModelError> {
        match self.facets.get_facet(FacetType::Default).map(|f| f.kind()) {
            Some(FacetKind::Default(method)) => self.invoke_supporting(method, target, pending),
            _ => Ok(Value::Null),
        }
    }

    fn invoke_supporting(
        &self,
        method: &MethodRef,
        target: &ObjectAdapter,
        pending: &[Value],
    ) -> Result<Value, MetaModelError> {
        let args = self
            .class
            .method_at(method.index)
            .map(|m| padded_arguments(m, pending))
            .unwrap_or_default();
        invoke(&self.class, &self.identifier, method, target, &args)
    }

    fn check<'a>(
        &'a self,
        target: &'a ObjectAdapter,
        session: &'a Session,
        initiated_by: InteractionInitiatedBy,
    ) -> Check<'a> {
        Check {
            class: &self.class,
            identifier: &self.identifier,
            target,
            session,
            initiated_by,
        }
    }
}

/// Serializable summary of a member, used by listings.
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub id: String,
    pub feature_type: FeatureType,
    pub identifier: String,
    pub facets: Vec<String>,
}

impl From<ObjectMember<'_>> for MemberSummary {
    fn from(member: ObjectMember<'_>) -> Self {
        Self {
            id: member.id().to_string(),
            feature_type: member.feature_type(),
            identifier: member.identifier().to_string(),
            facets: member.facets().facets().iter().map(ToString::to_string).collect(),
        }
    }
}
