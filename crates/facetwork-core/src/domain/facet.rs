//! Facets: typed units of metadata and behavior attached to a holder.
//!
//! A facet is a tagged variant ([`FacetKind`]) plus the bookkeeping the
//! holder needs to arbitrate between competing registrations
//! ([`Precedence`]) and the capability set the interaction engine dispatches
//! on ([`Capabilities`]). There is no advisor trait hierarchy: evaluation
//! lives in [`crate::domain::interaction`] and pattern-matches on the kind.

use std::{fmt, ops::BitOr};

use serde::{Deserialize, Serialize};

use crate::domain::object::ObjectAdapter;

// ── Capability set ───────────────────────────────────────────────────────────

/// Which interaction checks a facet takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const NONE: Capabilities = Capabilities(0);
    pub const HIDES: Capabilities = Capabilities(0b001);
    pub const DISABLES: Capabilities = Capabilities(0b010);
    pub const VALIDATES: Capabilities = Capabilities(0b100);

    pub fn contains(self, other: Capabilities) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_advisor(self) -> bool {
        self.0 != 0
    }
}

impl BitOr for Capabilities {
    type Output = Capabilities;

    fn bitor(self, rhs: Self) -> Self::Output {
        Capabilities(self.0 | rhs.0)
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(Self::HIDES) {
            parts.push("hides");
        }
        if self.contains(Self::DISABLES) {
            parts.push("disables");
        }
        if self.contains(Self::VALIDATES) {
            parts.push("validates");
        }
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join("+"))
        }
    }
}

// ── Precedence ───────────────────────────────────────────────────────────────

/// Arbitration rank when two facets of the same type meet on one holder.
///
/// A facet never replaces one of strictly higher precedence. Equal ranks
/// resolve in favour of the later registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Generic defaults installed for every element of a feature type.
    Fallback,
    /// Derived from another facet (e.g. immutability on the class).
    Inferred,
    /// Discovered from naming conventions (supporting methods).
    Default,
    /// Declared explicitly through an annotation.
    High,
}

// ── Rendering and lifecycle qualifiers ───────────────────────────────────────

/// Lifecycle window in which a hide/disable rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    #[default]
    Always,
    Never,
    UntilPersisted,
    OncePersisted,
}

impl When {
    pub fn applies_to(self, target: &ObjectAdapter) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::UntilPersisted => target.is_transient(),
            Self::OncePersisted => target.is_persistent(),
        }
    }
}

/// Rendering context in which a member is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Where {
    #[default]
    Anywhere,
    ObjectForms,
    AllTables,
    ParentedTables,
    StandaloneTables,
    Nowhere,
}

impl Where {
    /// Whether a rule scoped to `self` covers the rendering context `context`.
    pub fn includes(self, context: Where) -> bool {
        match self {
            Self::Anywhere => true,
            Self::Nowhere => false,
            Self::AllTables => matches!(
                context,
                Self::AllTables | Self::ParentedTables | Self::StandaloneTables
            ),
            other => other == context,
        }
    }
}

/// What kind of domain type a class is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nature {
    #[default]
    NotSpecified,
    Entity,
    ViewModel,
    Service,
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotSpecified => "not-specified",
            Self::Entity => "entity",
            Self::ViewModel => "view-model",
            Self::Service => "service",
        };
        f.write_str(s)
    }
}

// ── Facet type tag ───────────────────────────────────────────────────────────

/// The key a holder stores facets under. One slot per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetType {
    Named,
    DescribedAs,
    LogicalTypeName,
    DomainObject,
    Immutable,
    Title,
    PropertyAccessor,
    PropertySetter,
    CollectionAccessor,
    ActionInvocation,
    Choices,
    Default,
    Hidden,
    HideForContext,
    Disabled,
    DisableForContext,
    MaxLength,
    Mandatory,
    ValidateProperty,
    ValidateArguments,
    ValidateParameter,
    ValidateObject,
    Authorization,
}

impl FacetType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Named => "named",
            Self::DescribedAs => "described-as",
            Self::LogicalTypeName => "logical-type-name",
            Self::DomainObject => "domain-object",
            Self::Immutable => "immutable",
            Self::Title => "title",
            Self::PropertyAccessor => "property-accessor",
            Self::PropertySetter => "property-setter",
            Self::CollectionAccessor => "collection-accessor",
            Self::ActionInvocation => "action-invocation",
            Self::Choices => "choices",
            Self::Default => "default",
            Self::Hidden => "hidden",
            Self::HideForContext => "hide-for-context",
            Self::Disabled => "disabled",
            Self::DisableForContext => "disable-for-context",
            Self::MaxLength => "max-length",
            Self::Mandatory => "mandatory",
            Self::ValidateProperty => "validate-property",
            Self::ValidateArguments => "validate-arguments",
            Self::ValidateParameter => "validate-parameter",
            Self::ValidateObject => "validate-object",
            Self::Authorization => "authorization",
        }
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Facet payloads ───────────────────────────────────────────────────────────

/// Index of a method in the owning class descriptor's method table.
///
/// Facets reference their backing methods by position so the metamodel never
/// stores closures twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub index: usize,
    pub name: String,
}

impl MethodRef {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// The payload of a facet, one variant per concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetKind {
    // Metadata
    Named(String),
    DescribedAs(String),
    LogicalTypeName(String),
    DomainObject(Nature),
    Immutable { reason: Option<String> },
    Title(MethodRef),
    PropertyAccessor(MethodRef),
    PropertySetter(MethodRef),
    CollectionAccessor { method: MethodRef, element_type: String },
    ActionInvocation(MethodRef),
    Choices(MethodRef),
    Default(MethodRef),

    // Hiding advisors
    Hidden { when: When, where_: Where },
    HideForContext(MethodRef),

    // Disabling advisors
    Disabled { when: When, reason: Option<String> },
    DisableForContext(MethodRef),

    // Validating advisors
    MaxLength(usize),
    Mandatory(bool),
    ValidateProperty(MethodRef),
    ValidateArguments(MethodRef),
    ValidateParameter(MethodRef),
    ValidateObject(MethodRef),

    // Hides and disables
    Authorization,
}

impl FacetKind {
    pub fn facet_type(&self) -> FacetType {
        match self {
            Self::Named(_) => FacetType::Named,
            Self::DescribedAs(_) => FacetType::DescribedAs,
            Self::LogicalTypeName(_) => FacetType::LogicalTypeName,
            Self::DomainObject(_) => FacetType::DomainObject,
            Self::Immutable { .. } => FacetType::Immutable,
            Self::Title(_) => FacetType::Title,
            Self::PropertyAccessor(_) => FacetType::PropertyAccessor,
            Self::PropertySetter(_) => FacetType::PropertySetter,
            Self::CollectionAccessor { .. } => FacetType::CollectionAccessor,
            Self::ActionInvocation(_) => FacetType::ActionInvocation,
            Self::Choices(_) => FacetType::Choices,
            Self::Default(_) => FacetType::Default,
            Self::Hidden { .. } => FacetType::Hidden,
            Self::HideForContext(_) => FacetType::HideForContext,
            Self::Disabled { .. } => FacetType::Disabled,
            Self::DisableForContext(_) => FacetType::DisableForContext,
            Self::MaxLength(_) => FacetType::MaxLength,
            Self::Mandatory(_) => FacetType::Mandatory,
            Self::ValidateProperty(_) => FacetType::ValidateProperty,
            Self::ValidateArguments(_) => FacetType::ValidateArguments,
            Self::ValidateParameter(_) => FacetType::ValidateParameter,
            Self::ValidateObject(_) => FacetType::ValidateObject,
            Self::Authorization => FacetType::Authorization,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::Hidden { .. } | Self::HideForContext(_) => Capabilities::HIDES,
            Self::Disabled { .. } | Self::DisableForContext(_) => Capabilities::DISABLES,
            Self::MaxLength(_)
            | Self::Mandatory(_)
            | Self::ValidateProperty(_)
            | Self::ValidateArguments(_)
            | Self::ValidateParameter(_)
            | Self::ValidateObject(_) => Capabilities::VALIDATES,
            Self::Authorization => Capabilities::HIDES | Capabilities::DISABLES,
            _ => Capabilities::NONE,
        }
    }

    /// Backing supporting method, if the facet delegates to one.
    pub fn method(&self) -> Option<&MethodRef> {
        match self {
            Self::Title(m)
            | Self::PropertyAccessor(m)
            | Self::PropertySetter(m)
            | Self::ActionInvocation(m)
            | Self::Choices(m)
            | Self::Default(m)
            | Self::HideForContext(m)
            | Self::DisableForContext(m)
            | Self::ValidateProperty(m)
            | Self::ValidateArguments(m)
            | Self::ValidateParameter(m)
            | Self::ValidateObject(m) => Some(m),
            Self::CollectionAccessor { method, .. } => Some(method),
            _ => None,
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(s) | Self::DescribedAs(s) | Self::LogicalTypeName(s) => {
                write!(f, "{}(\"{s}\")", self.facet_type())
            }
            Self::DomainObject(nature) => write!(f, "domain-object({nature})"),
            Self::Immutable { reason } => match reason {
                Some(r) => write!(f, "immutable(\"{r}\")"),
                None => f.write_str("immutable"),
            },
            Self::CollectionAccessor {
                method,
                element_type,
            } => write!(f, "collection-accessor({}() of {element_type})", method.name),
            Self::Hidden { when, where_ } => write!(f, "hidden({when:?}, {where_:?})"),
            Self::Disabled { when, reason } => match reason {
                Some(r) => write!(f, "disabled({when:?}, \"{r}\")"),
                None => write!(f, "disabled({when:?})"),
            },
            Self::MaxLength(n) => write!(f, "max-length({n})"),
            Self::Mandatory(m) => write!(f, "mandatory({m})"),
            Self::Authorization => f.write_str("authorization"),
            other => match other.method() {
                Some(m) => write!(f, "{}({}())", other.facet_type(), m.name),
                None => write!(f, "{}", other.facet_type()),
            },
        }
    }
}

// ── Facet ────────────────────────────────────────────────────────────────────

/// A facet as installed on a holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    kind: FacetKind,
    precedence: Precedence,
    capabilities: Capabilities,
    /// Name of the factory that installed this facet.
    factory: &'static str,
}

impl Facet {
    pub fn new(kind: FacetKind, precedence: Precedence, factory: &'static str) -> Self {
        let capabilities = kind.capabilities();
        Self {
            kind,
            precedence,
            capabilities,
            factory,
        }
    }

    pub fn fallback(kind: FacetKind, factory: &'static str) -> Self {
        Self::new(kind, Precedence::Fallback, factory)
    }

    pub fn inferred(kind: FacetKind, factory: &'static str) -> Self {
        Self::new(kind, Precedence::Inferred, factory)
    }

    pub fn default_for(kind: FacetKind, factory: &'static str) -> Self {
        Self::new(kind, Precedence::Default, factory)
    }

    pub fn explicit(kind: FacetKind, factory: &'static str) -> Self {
        Self::new(kind, Precedence::High, factory)
    }

    pub fn facet_type(&self) -> FacetType {
        self.kind.facet_type()
    }

    pub fn kind(&self) -> &FacetKind {
        &self.kind
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn factory(&self) -> &'static str {
        self.factory
    }

    pub fn is_fallback(&self) -> bool {
        self.precedence == Precedence::Fallback
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.kind, self.precedence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_sets() {
        let both = Capabilities::HIDES | Capabilities::DISABLES;
        assert!(both.contains(Capabilities::HIDES));
        assert!(both.contains(Capabilities::DISABLES));
        assert!(!both.contains(Capabilities::VALIDATES));
        assert!(!Capabilities::NONE.is_advisor());
        assert!(!both.contains(Capabilities::NONE));
    }

    #[test]
    fn kinds_carry_their_capabilities() {
        assert_eq!(
            FacetKind::Hidden {
                when: When::Always,
                where_: Where::Anywhere
            }
            .capabilities(),
            Capabilities::HIDES
        );
        assert_eq!(FacetKind::MaxLength(3).capabilities(), Capabilities::VALIDATES);
        assert_eq!(
            FacetKind::Named("x".into()).capabilities(),
            Capabilities::NONE
        );
        let auth = FacetKind::Authorization.capabilities();
        assert!(auth.contains(Capabilities::HIDES) && auth.contains(Capabilities::DISABLES));
    }

    #[test]
    fn precedence_ordering() {
        assert!(Precedence::Fallback < Precedence::Inferred);
        assert!(Precedence::Inferred < Precedence::Default);
        assert!(Precedence::Default < Precedence::High);
    }

    #[test]
    fn when_follows_object_state() {
        let transient = ObjectAdapter::transient("a.B");
        let persistent = ObjectAdapter::persistent("a.B", "1");
        assert!(When::UntilPersisted.applies_to(&transient));
        assert!(!When::UntilPersisted.applies_to(&persistent));
        assert!(When::OncePersisted.applies_to(&persistent));
        assert!(!When::Never.applies_to(&persistent));
    }

    #[test]
    fn where_all_tables_covers_table_contexts() {
        assert!(Where::AllTables.includes(Where::ParentedTables));
        assert!(Where::AllTables.includes(Where::StandaloneTables));
        assert!(!Where::AllTables.includes(Where::ObjectForms));
        assert!(Where::Anywhere.includes(Where::ObjectForms));
        assert!(!Where::Nowhere.includes(Where::Anywhere));
    }

    #[test]
    fn facet_records_capabilities_from_kind() {
        let facet = Facet::explicit(FacetKind::Mandatory(true), "test");
        assert_eq!(facet.facet_type(), FacetType::Mandatory);
        assert_eq!(facet.capabilities(), Capabilities::VALIDATES);
        assert_eq!(facet.precedence(), Precedence::High);
    }
}
