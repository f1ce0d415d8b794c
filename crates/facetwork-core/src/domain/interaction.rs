//! Interaction checks: the request-scoped context, advisor evaluation, and
//! the aggregated verdict.
//!
//! Every check is stateless and one-shot:
//!
//! 1. Build an [`InteractionContext`] describing who asks about what.
//! 2. [`is_visible`], [`is_usable`], or [`is_valid`] walk the holder's
//!    advisors of the matching capability in discovery order.
//! 3. Each advisor answers "no objection" or a veto reason; the
//!    [`InteractionResult`] records every answer and keeps the first veto.
//!
//! A holder without advisors of the relevant capability is always allowed.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::domain::{
    descriptor::{ClassDescriptor, MethodDescriptor},
    error::{InvocationError, MetaModelError},
    facet::{Capabilities, Facet, FacetKind, FacetType, MethodRef, When, Where},
    holder::FacetHolder,
    identifier::Identifier,
    object::{ObjectAdapter, Value},
    session::Session,
};

// ── Context ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    ObjectValidate,
    MemberVisibility,
    MemberUsability,
    PropertyModify,
    ActionInvoke,
    ActionArgument,
    ParameterVisibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionInitiatedBy {
    #[default]
    User,
    /// Internal calls; authorization is not consulted.
    Framework,
}

/// Immutable description of a single check.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    interaction_type: InteractionType,
    initiated_by: InteractionInitiatedBy,
    identifier: &'a Identifier,
    target: &'a ObjectAdapter,
    class: &'a ClassDescriptor,
    session: &'a Session,
    where_: Where,
    proposed: Option<&'a Value>,
    arguments: &'a [Value],
    argument_index: Option<usize>,
}

impl<'a> InteractionContext<'a> {
    pub fn new(
        interaction_type: InteractionType,
        identifier: &'a Identifier,
        target: &'a ObjectAdapter,
        class: &'a ClassDescriptor,
        session: &'a Session,
    ) -> Self {
        Self {
            interaction_type,
            initiated_by: InteractionInitiatedBy::User,
            identifier,
            target,
            class,
            session,
            where_: Where::Anywhere,
            proposed: None,
            arguments: &[],
            argument_index: None,
        }
    }

    pub fn initiated_by(mut self, initiated_by: InteractionInitiatedBy) -> Self {
        self.initiated_by = initiated_by;
        self
    }

    pub fn rendered_in(mut self, where_: Where) -> Self {
        self.where_ = where_;
        self
    }

    pub fn with_proposed(mut self, proposed: &'a Value) -> Self {
        self.proposed = Some(proposed);
        self
    }

    pub fn with_arguments(mut self, arguments: &'a [Value]) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_argument_index(mut self, index: usize) -> Self {
        self.argument_index = Some(index);
        self
    }

    pub fn interaction_type(&self) -> InteractionType {
        self.interaction_type
    }

    pub fn initiator(&self) -> InteractionInitiatedBy {
        self.initiated_by
    }

    pub fn identifier(&self) -> &Identifier {
        self.identifier
    }

    pub fn target(&self) -> &ObjectAdapter {
        self.target
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn where_(&self) -> Where {
        self.where_
    }

    pub fn arguments(&self) -> &[Value] {
        self.arguments
    }

    /// The value being validated: the proposed property value, or the
    /// argument at the context's index.
    pub fn proposed_value(&self) -> Option<&Value> {
        match (self.proposed, self.argument_index) {
            (Some(v), _) => Some(v),
            (None, Some(i)) => self.arguments.get(i),
            (None, None) => None,
        }
    }

    fn method(&self, method: &MethodRef) -> Result<&'a MethodDescriptor, InvocationError> {
        self.class
            .method_at(method.index)
            .filter(|m| m.name == method.name)
            .ok_or_else(|| InvocationError::Failed {
                method: method.name.clone(),
                reason: format!("not declared on {}", self.class.name),
            })
    }
}

// ── Verdicts ─────────────────────────────────────────────────────────────────

/// The value form of a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Consent {
    Allow,
    Veto(String),
}

impl Consent {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_vetoed(&self) -> bool {
        !self.is_allowed()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Veto(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Consent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allowed"),
            Self::Veto(reason) => write!(f, "vetoed: {reason}"),
        }
    }
}

/// One advisor's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub facet_type: FacetType,
    pub consent: Consent,
}

/// All advisories for one check, plus the aggregate verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResult {
    interaction_type: InteractionType,
    identifier: String,
    advisories: Vec<Advisory>,
    veto: Option<String>,
}

impl InteractionResult {
    pub fn new(interaction_type: InteractionType, identifier: &Identifier) -> Self {
        Self {
            interaction_type,
            identifier: identifier.to_string(),
            advisories: Vec::new(),
            veto: None,
        }
    }

    /// Record one advisor's answer. The first veto decides the reason.
    pub fn advise(&mut self, facet_type: FacetType, reason: Option<String>) {
        let consent = match reason {
            None => Consent::Allow,
            Some(r) if r.trim().is_empty() => Consent::Veto(format!("Vetoed by {facet_type}")),
            Some(r) => Consent::Veto(r),
        };
        if let Consent::Veto(reason) = &consent {
            self.veto.get_or_insert_with(|| reason.clone());
        }
        self.advisories.push(Advisory {
            facet_type,
            consent,
        });
    }

    pub fn is_vetoed(&self) -> bool {
        self.veto.is_some()
    }

    pub fn is_allowed(&self) -> bool {
        !self.is_vetoed()
    }

    pub fn reason(&self) -> Option<&str> {
        self.veto.as_deref()
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn interaction_type(&self) -> InteractionType {
        self.interaction_type
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn create_consent(&self) -> Consent {
        match &self.veto {
            None => Consent::Allow,
            Some(reason) => Consent::Veto(reason.clone()),
        }
    }
}

/// Several results folded with first-veto-wins (e.g. every parameter plus
/// the action-level validation of one invocation).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InteractionResultSet {
    results: Vec<InteractionResult>,
}

impl InteractionResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: InteractionResult) {
        self.results.push(result);
    }

    pub fn is_vetoed(&self) -> bool {
        self.results.iter().any(InteractionResult::is_vetoed)
    }

    pub fn is_allowed(&self) -> bool {
        !self.is_vetoed()
    }

    pub fn first_vetoed(&self) -> Option<&InteractionResult> {
        self.results.iter().find(|r| r.is_vetoed())
    }

    pub fn results(&self) -> &[InteractionResult] {
        &self.results
    }

    pub fn create_consent(&self) -> Consent {
        self.first_vetoed()
            .map_or(Consent::Allow, InteractionResult::create_consent)
    }
}

// ── Evaluation ───────────────────────────────────────────────────────────────

/// Visibility check over the holder's hiding advisors.
pub fn is_visible(
    holder: &FacetHolder,
    ctx: &InteractionContext<'_>,
) -> Result<InteractionResult, MetaModelError> {
    evaluate(holder, ctx, Capabilities::HIDES, hides)
}

/// Usability check over the holder's disabling advisors.
pub fn is_usable(
    holder: &FacetHolder,
    ctx: &InteractionContext<'_>,
) -> Result<InteractionResult, MetaModelError> {
    evaluate(holder, ctx, Capabilities::DISABLES, disables)
}

/// Validity check over the holder's validating advisors.
pub fn is_valid(
    holder: &FacetHolder,
    ctx: &InteractionContext<'_>,
) -> Result<InteractionResult, MetaModelError> {
    evaluate(holder, ctx, Capabilities::VALIDATES, invalidates)
}

type Arm = fn(&Facet, &InteractionContext<'_>) -> Result<Option<String>, InvocationError>;

fn evaluate(
    holder: &FacetHolder,
    ctx: &InteractionContext<'_>,
    capability: Capabilities,
    arm: Arm,
) -> Result<InteractionResult, MetaModelError> {
    let mut result = InteractionResult::new(ctx.interaction_type, ctx.identifier);
    for facet in holder.advisors(capability) {
        let reason = arm(facet, ctx).map_err(|source| MetaModelError::Invocation {
            identifier: ctx.identifier.to_string(),
            source,
        })?;
        trace!(
            identifier = %ctx.identifier,
            facet = %facet.facet_type(),
            vetoed = reason.is_some(),
            "advisor consulted"
        );
        result.advise(facet.facet_type(), reason);
    }
    Ok(result)
}

fn hides(facet: &Facet, ctx: &InteractionContext<'_>) -> Result<Option<String>, InvocationError> {
    match facet.kind() {
        FacetKind::Hidden { when, where_ } => {
            if !where_.includes(ctx.where_) || !when.applies_to(ctx.target) {
                return Ok(None);
            }
            Ok(Some(
                match when {
                    When::UntilPersisted => "Hidden until persisted",
                    When::OncePersisted => "Hidden once persisted",
                    _ => "Always hidden",
                }
                .to_string(),
            ))
        }
        FacetKind::HideForContext(method) => {
            let hidden = invoke_bool(ctx, method)?;
            Ok(hidden.then(|| "Hidden".to_string()))
        }
        FacetKind::Authorization => {
            if ctx.initiated_by == InteractionInitiatedBy::Framework {
                return Ok(None);
            }
            let session = ctx.session;
            let visible = session
                .authorizor()
                .is_visible(session.user(), ctx.identifier);
            Ok((!visible).then(|| "Not authorized to view".to_string()))
        }
        _ => Ok(None),
    }
}

fn disables(facet: &Facet, ctx: &InteractionContext<'_>) -> Result<Option<String>, InvocationError> {
    match facet.kind() {
        FacetKind::Disabled { when, reason } => {
            if !when.applies_to(ctx.target) {
                return Ok(None);
            }
            let reason = reason.clone().unwrap_or_else(|| {
                match when {
                    When::UntilPersisted => "Cannot be changed until persisted",
                    When::OncePersisted => "Cannot be changed once persisted",
                    _ => "Always disabled",
                }
                .to_string()
            });
            Ok(Some(reason))
        }
        FacetKind::DisableForContext(method) => invoke_reason(ctx, method, &[]),
        FacetKind::Authorization => {
            if ctx.initiated_by == InteractionInitiatedBy::Framework {
                return Ok(None);
            }
            let session = ctx.session;
            let usable = session
                .authorizor()
                .is_usable(session.user(), ctx.identifier);
            Ok((!usable).then(|| "Not authorized to edit".to_string()))
        }
        _ => Ok(None),
    }
}

fn invalidates(
    facet: &Facet,
    ctx: &InteractionContext<'_>,
) -> Result<Option<String>, InvocationError> {
    match facet.kind() {
        FacetKind::MaxLength(max) => {
            let Some(Value::Text(text)) = ctx.proposed_value() else {
                return Ok(None);
            };
            let too_long = text.chars().count() > *max;
            Ok(too_long.then(|| {
                format!("Proposed value '{text}' exceeds the maximum length of {max}")
            }))
        }
        FacetKind::Mandatory(true) => {
            let missing = match ctx.interaction_type {
                InteractionType::PropertyModify | InteractionType::ActionArgument => {
                    ctx.proposed_value().is_none_or(Value::is_empty)
                }
                _ => false,
            };
            Ok(missing.then(|| "Mandatory".to_string()))
        }
        FacetKind::ValidateProperty(method)
            if ctx.interaction_type == InteractionType::PropertyModify =>
        {
            let proposed = ctx.proposed_value().cloned().unwrap_or_default();
            invoke_reason(ctx, method, &[proposed])
        }
        FacetKind::ValidateArguments(method)
            if ctx.interaction_type == InteractionType::ActionInvoke =>
        {
            invoke_reason(ctx, method, ctx.arguments)
        }
        FacetKind::ValidateParameter(method)
            if ctx.interaction_type == InteractionType::ActionArgument =>
        {
            let arg = ctx.proposed_value().cloned().unwrap_or_default();
            invoke_reason(ctx, method, &[arg])
        }
        FacetKind::ValidateObject(method)
            if ctx.interaction_type == InteractionType::ObjectValidate =>
        {
            invoke_reason(ctx, method, &[])
        }
        _ => Ok(None),
    }
}

/// Arguments for a supporting method that takes no explicit inputs of its
/// own: the pending action arguments, truncated or padded to its arity.
pub(crate) fn padded_arguments(method: &MethodDescriptor, pending: &[Value]) -> Vec<Value> {
    (0..method.parameters.len())
        .map(|i| pending.get(i).cloned().unwrap_or_default())
        .collect()
}

fn invoke_bool(ctx: &InteractionContext<'_>, method: &MethodRef) -> Result<bool, InvocationError> {
    let descriptor = ctx.method(method)?;
    let args = padded_arguments(descriptor, ctx.arguments);
    match descriptor.invoke(ctx.target, &args)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(InvocationError::UnexpectedReturn {
            method: method.name.clone(),
            expected: "boolean",
            actual: other.type_name().to_string(),
        }),
    }
}

/// Invoke a reason-returning supporting method: text vetoes, null allows.
fn invoke_reason(
    ctx: &InteractionContext<'_>,
    method: &MethodRef,
    explicit_args: &[Value],
) -> Result<Option<String>, InvocationError> {
    let descriptor = ctx.method(method)?;
    let args = if explicit_args.is_empty() {
        padded_arguments(descriptor, ctx.arguments)
    } else {
        explicit_args.to_vec()
    };
    match descriptor.invoke(ctx.target, &args)? {
        Value::Null => Ok(None),
        Value::Text(reason) => Ok(Some(reason)),
        other => Err(InvocationError::UnexpectedReturn {
            method: method.name.clone(),
            expected: "text or null",
            actual: other.type_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{
        descriptor::{MethodBody, TypeRef},
        facet::Facet,
        session::{MockAuthorizor, UserMemento},
    };

    fn class() -> ClassDescriptor {
        ClassDescriptor::new("com.acme.Order")
            .method(
                MethodDescriptor::new("disableQuantity", TypeRef::Text).body(MethodBody::query(
                    |t, _| {
                        Ok(if t.is_persistent() {
                            Value::from("Order already placed")
                        } else {
                            Value::Null
                        })
                    },
                )),
            )
            .method(
                MethodDescriptor::new("hideQuantity", TypeRef::Integer)
                    .body(MethodBody::query(|_, _| Ok(Value::Int(1)))),
            )
    }

    fn session() -> Session {
        Session::permit_all(UserMemento::new("sven"))
    }

    fn id() -> Identifier {
        Identifier::association("com.acme.Order", "quantity")
    }

    #[test]
    fn no_advisors_is_allowed() {
        let (class, session, id) = (class(), session(), id());
        let target = ObjectAdapter::transient("com.acme.Order");
        let ctx = InteractionContext::new(
            InteractionType::MemberVisibility,
            &id,
            &target,
            &class,
            &session,
        );
        let result = is_visible(&FacetHolder::new(), &ctx).unwrap();
        assert!(result.is_allowed());
        assert!(result.advisories().is_empty());
    }

    #[test]
    fn first_veto_wins_but_all_are_consulted() {
        let (class, session, id) = (class(), session(), id());
        let target = ObjectAdapter::persistent("com.acme.Order", "1");
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::default_for(
            FacetKind::DisableForContext(MethodRef::new(0, "disableQuantity")),
            "t",
        ));
        holder.add_facet(Facet::explicit(
            FacetKind::Disabled {
                when: When::Always,
                reason: Some("Read only".into()),
            },
            "t",
        ));

        let ctx = InteractionContext::new(
            InteractionType::MemberUsability,
            &id,
            &target,
            &class,
            &session,
        );
        let result = is_usable(&holder, &ctx).unwrap();
        assert!(result.is_vetoed());
        assert_eq!(result.reason(), Some("Order already placed"));
        assert_eq!(result.advisories().len(), 2);
        assert!(result.advisories()[1].consent.is_vetoed());
    }

    #[test]
    fn empty_reason_still_vetoes_with_text() {
        let mut result = InteractionResult::new(InteractionType::MemberUsability, &id());
        result.advise(FacetType::Disabled, Some(String::new()));
        assert!(result.is_vetoed());
        assert!(!result.reason().unwrap().is_empty());
    }

    #[test]
    fn wrong_return_type_is_an_invocation_error() {
        let (class, session, id) = (class(), session(), id());
        let target = ObjectAdapter::transient("com.acme.Order");
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::default_for(
            FacetKind::HideForContext(MethodRef::new(1, "hideQuantity")),
            "t",
        ));
        let ctx = InteractionContext::new(
            InteractionType::MemberVisibility,
            &id,
            &target,
            &class,
            &session,
        );
        assert!(matches!(
            is_visible(&holder, &ctx),
            Err(MetaModelError::Invocation { .. })
        ));
    }

    #[test]
    fn hidden_respects_where() {
        let (class, session, id) = (class(), session(), id());
        let target = ObjectAdapter::transient("com.acme.Order");
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::explicit(
            FacetKind::Hidden {
                when: When::Always,
                where_: Where::AllTables,
            },
            "t",
        ));
        let base = InteractionContext::new(
            InteractionType::MemberVisibility,
            &id,
            &target,
            &class,
            &session,
        );

        assert!(is_visible(&holder, &base.rendered_in(Where::ObjectForms))
            .unwrap()
            .is_allowed());
        assert!(is_visible(&holder, &base.rendered_in(Where::StandaloneTables))
            .unwrap()
            .is_vetoed());
    }

    #[test]
    fn authorization_consults_the_session() {
        let mut authorizor = MockAuthorizor::new();
        authorizor.expect_is_visible().returning(|_, _| false);
        let session = Session::new(UserMemento::new("guest"), Arc::new(authorizor));
        let (class, id) = (class(), id());
        let target = ObjectAdapter::transient("com.acme.Order");
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::inferred(FacetKind::Authorization, "t"));

        let ctx = InteractionContext::new(
            InteractionType::MemberVisibility,
            &id,
            &target,
            &class,
            &session,
        );
        let result = is_visible(&holder, &ctx).unwrap();
        assert_eq!(result.reason(), Some("Not authorized to view"));

        let framework = ctx.initiated_by(InteractionInitiatedBy::Framework);
        assert!(is_visible(&holder, &framework).unwrap().is_allowed());
    }

    #[test]
    fn max_length_and_mandatory() {
        let (class, session, id) = (class(), session(), id());
        let target = ObjectAdapter::transient("com.acme.Order");
        let mut holder = FacetHolder::new();
        holder.add_facet(Facet::explicit(FacetKind::MaxLength(3), "t"));
        holder.add_facet(Facet::fallback(FacetKind::Mandatory(true), "t"));

        let check = |proposed: &Value| {
            let ctx = InteractionContext::new(
                InteractionType::PropertyModify,
                &id,
                &target,
                &class,
                &session,
            )
            .with_proposed(proposed);
            is_valid(&holder, &ctx).unwrap()
        };

        let too_long = check(&Value::from("abcd"));
        assert!(too_long.reason().unwrap().contains("maximum length of 3"));
        assert_eq!(check(&Value::Null).reason(), Some("Mandatory"));
        assert!(check(&Value::from("abc")).is_allowed());
    }

    #[test]
    fn result_set_surfaces_first_veto() {
        let mut set = InteractionResultSet::new();
        set.add(InteractionResult::new(InteractionType::ActionArgument, &id()));
        let mut vetoed = InteractionResult::new(InteractionType::ActionInvoke, &id());
        vetoed.advise(FacetType::ValidateArguments, Some("Too many".into()));
        set.add(vetoed);

        assert!(set.is_vetoed());
        assert_eq!(set.create_consent(), Consent::Veto("Too many".into()));
    }
}
