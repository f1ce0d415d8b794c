//! The facet factory pipeline.
//!
//! Factories are stateless rules. Each one declares the feature types it
//! applies to and is registered in a [`ProcessingOrder`] bucket. For every
//! class the introspector runs the class phase, then each member, then each
//! action parameter, always calling factories in bucket order.
//!
//! Factories that recognise supporting methods (`hideFoo`, `validate0Bar`,
//! ...) claim them through the [`MethodRemover`]; claimed methods never
//! surface as actions.

mod accessors;
mod authorization;
mod constraints;
mod naming;
mod visibility;

use std::{collections::BTreeSet, fmt};

use crate::domain::{
    descriptor::{
        ClassDescriptor, MethodDescriptor, ParameterDescriptor, capitalize, decapitalize,
    },
    error::MetaModelError,
    facet::MethodRef,
    feature::FeatureType,
    holder::FacetHolder,
    validation::{
        ActionParameterArityValidator, MetaModelValidator, OrphanedSupportingMethodValidator,
    },
};

pub use accessors::{
    ActionInvocationFacetFactory, CollectionAccessorFacetFactory, PropertyAccessorFacetFactory,
    TitleFacetFactory,
};
pub use authorization::{AuthorizationFacetFactory, ImmutableFacetFactory};
pub use constraints::{
    ChoicesDefaultsFacetFactory, MandatoryFacetFactory, MaxLengthFacetFactory,
    ValidateFacetFactory,
};
pub use naming::{DomainObjectFacetFactory, FallbackFacetFactory, NamedFacetFactory};
pub use visibility::{DisabledFacetFactory, HiddenFacetFactory};

// ── Supporting method naming ─────────────────────────────────────────────────

pub const HIDE_PREFIX: &str = "hide";
pub const DISABLE_PREFIX: &str = "disable";
pub const VALIDATE_PREFIX: &str = "validate";
pub const CHOICES_PREFIX: &str = "choices";
pub const DEFAULT_PREFIX: &str = "default";
pub const SET_PREFIX: &str = "set";
pub const TITLE_METHOD: &str = "title";

/// `hide` + `quantity` → `hideQuantity`.
pub fn supporting_method_name(prefix: &str, member_id: &str) -> String {
    format!("{prefix}{}", capitalize(member_id))
}

/// `hide` + 0 + `place` → `hide0Place`.
pub fn indexed_supporting_method_name(prefix: &str, index: usize, action_id: &str) -> String {
    format!("{prefix}{index}{}", capitalize(action_id))
}

/// A method name decomposed as `<prefix>[<index>]<Stem>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportingMethodName {
    pub prefix: &'static str,
    pub index: Option<usize>,
    /// Member id the method supports; empty for `validate()`.
    pub member_id: String,
}

impl SupportingMethodName {
    /// Match `name` against the known prefixes, longest first.
    pub fn parse(name: &str, prefixes: &[&'static str]) -> Option<Self> {
        let mut candidates: Vec<&'static str> = prefixes.to_vec();
        candidates.sort_by_key(|p| std::cmp::Reverse(p.len()));

        candidates.into_iter().find_map(|prefix| {
            let rest = name.strip_prefix(prefix)?;
            if rest.is_empty() {
                return Some(Self {
                    prefix,
                    index: None,
                    member_id: String::new(),
                });
            }
            let digits = rest.chars().take_while(char::is_ascii_digit).count();
            let (index, stem) = rest.split_at(digits);
            if !stem.starts_with(|c: char| c.is_uppercase()) {
                return None;
            }
            Some(Self {
                prefix,
                index: index.parse().ok(),
                member_id: decapitalize(stem),
            })
        })
    }
}

// ── Processing order ─────────────────────────────────────────────────────────

/// Pipeline buckets. Factories run bucket by bucket and, within a bucket,
/// in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessingOrder {
    A1FallbackDefaults,
    A2AfterFallbackDefaults,
    B1ObjectNaming,
    C1MethodIntrospection,
    C2AfterMethodIntrospection,
    D1MandatorySupport,
    E1MemberModelling,
    Z0BeforeFinally,
    Z1Finally,
}

impl fmt::Display for ProcessingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::A1FallbackDefaults => "A1",
            Self::A2AfterFallbackDefaults => "A2",
            Self::B1ObjectNaming => "B1",
            Self::C1MethodIntrospection => "C1",
            Self::C2AfterMethodIntrospection => "C2",
            Self::D1MandatorySupport => "D1",
            Self::E1MemberModelling => "E1",
            Self::Z0BeforeFinally => "Z0",
            Self::Z1Finally => "Z1",
        };
        f.write_str(s)
    }
}

// ── Method remover ───────────────────────────────────────────────────────────

/// Methods taken out of member discovery for one class.
#[derive(Debug, Default, Clone)]
pub struct MethodRemover {
    excluded: BTreeSet<usize>,
    claimed: BTreeSet<usize>,
}

impl MethodRemover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude a method from the metamodel (programmatic or static).
    pub fn exclude(&mut self, index: usize) {
        self.excluded.insert(index);
    }

    /// Mark a method as consumed by a factory.
    pub fn remove_method(&mut self, index: usize) {
        self.claimed.insert(index);
    }

    pub fn is_removed(&self, index: usize) -> bool {
        self.excluded.contains(&index) || self.claimed.contains(&index)
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.claimed.contains(&index)
    }

    /// Locate a non-excluded method by name without claiming it.
    pub fn find(&self, class: &ClassDescriptor, name: &str) -> Option<MethodRef> {
        class
            .methods
            .iter()
            .enumerate()
            .find(|(i, m)| m.name == name && !self.excluded.contains(i))
            .map(|(i, m)| MethodRef::new(i, m.name.clone()))
    }

    /// Locate a method by name and claim it.
    pub fn claim(&mut self, class: &ClassDescriptor, name: &str) -> Option<MethodRef> {
        let found = self.find(class, name)?;
        self.claimed.insert(found.index);
        Some(found)
    }
}

// ── Process contexts ─────────────────────────────────────────────────────────

pub struct ProcessClassContext<'a> {
    pub class: &'a ClassDescriptor,
    pub facets: &'a mut FacetHolder,
    pub remover: &'a mut MethodRemover,
}

pub struct ProcessMethodContext<'a> {
    pub class: &'a ClassDescriptor,
    /// Class-level facets, complete by the time members are processed.
    pub class_facets: &'a FacetHolder,
    pub feature_type: FeatureType,
    /// Property or collection id, or the action's method name.
    pub member_id: &'a str,
    pub method_index: usize,
    pub method: &'a MethodDescriptor,
    pub facets: &'a mut FacetHolder,
    pub remover: &'a mut MethodRemover,
}

pub struct ProcessParameterContext<'a> {
    pub class: &'a ClassDescriptor,
    pub action_id: &'a str,
    pub method: &'a MethodDescriptor,
    pub param_index: usize,
    pub parameter: &'a ParameterDescriptor,
    pub facets: &'a mut FacetHolder,
    pub remover: &'a mut MethodRemover,
}

// ── Factory trait ────────────────────────────────────────────────────────────

/// A rule that inspects raw descriptors and installs facets.
pub trait FacetFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn feature_types(&self) -> &'static [FeatureType];

    /// Supporting-method prefixes this factory recognises.
    fn prefixes(&self) -> &'static [&'static str] {
        &[]
    }

    fn process_class(&self, _ctx: &mut ProcessClassContext<'_>) -> Result<(), MetaModelError> {
        Ok(())
    }

    fn process_method(&self, _ctx: &mut ProcessMethodContext<'_>) -> Result<(), MetaModelError> {
        Ok(())
    }

    fn process_params(
        &self,
        _ctx: &mut ProcessParameterContext<'_>,
    ) -> Result<(), MetaModelError> {
        Ok(())
    }

    fn applies_to(&self, feature_type: FeatureType) -> bool {
        self.feature_types().contains(&feature_type)
    }
}

// ── Programming model ────────────────────────────────────────────────────────

/// The ordered factory pipeline plus the post-introspection validators.
#[derive(Default)]
pub struct ProgrammingModel {
    factories: Vec<(ProcessingOrder, Box<dyn FacetFactory>)>,
    validators: Vec<Box<dyn MetaModelValidator>>,
}

impl ProgrammingModel {
    /// An empty model; see [`ProgrammingModel::with_defaults`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in factories and validators.
    pub fn with_defaults() -> Self {
        use ProcessingOrder::*;

        let mut model = Self::new();
        model
            .add_factory(A1FallbackDefaults, FallbackFacetFactory)
            .add_factory(B1ObjectNaming, DomainObjectFacetFactory)
            .add_factory(B1ObjectNaming, NamedFacetFactory)
            .add_factory(C1MethodIntrospection, PropertyAccessorFacetFactory)
            .add_factory(C1MethodIntrospection, CollectionAccessorFacetFactory)
            .add_factory(C1MethodIntrospection, ActionInvocationFacetFactory)
            .add_factory(C1MethodIntrospection, TitleFacetFactory)
            .add_factory(C2AfterMethodIntrospection, HiddenFacetFactory)
            .add_factory(C2AfterMethodIntrospection, DisabledFacetFactory)
            .add_factory(C2AfterMethodIntrospection, ValidateFacetFactory)
            .add_factory(C2AfterMethodIntrospection, ChoicesDefaultsFacetFactory)
            .add_factory(D1MandatorySupport, MandatoryFacetFactory)
            .add_factory(E1MemberModelling, MaxLengthFacetFactory)
            .add_factory(Z0BeforeFinally, AuthorizationFacetFactory)
            .add_factory(Z1Finally, ImmutableFacetFactory)
            .add_validator(OrphanedSupportingMethodValidator)
            .add_validator(ActionParameterArityValidator);
        model
    }

    /// Register a factory. Order within a bucket is registration order.
    pub fn add_factory(
        &mut self,
        order: ProcessingOrder,
        factory: impl FacetFactory + 'static,
    ) -> &mut Self {
        self.factories.push((order, Box::new(factory)));
        // stable: keeps registration order inside a bucket
        self.factories.sort_by_key(|(order, _)| *order);
        self
    }

    pub fn add_validator(&mut self, validator: impl MetaModelValidator + 'static) -> &mut Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn factories(&self) -> impl Iterator<Item = &dyn FacetFactory> {
        self.factories.iter().map(|(_, f)| f.as_ref())
    }

    /// Factories that apply to `feature_type`, in pipeline order.
    pub fn factories_for(&self, feature_type: FeatureType) -> impl Iterator<Item = &dyn FacetFactory> {
        self.factories().filter(move |f| f.applies_to(feature_type))
    }

    pub fn pipeline(&self) -> Vec<(ProcessingOrder, &'static str)> {
        self.factories.iter().map(|(o, f)| (*o, f.name())).collect()
    }

    pub fn validators(&self) -> impl Iterator<Item = &dyn MetaModelValidator> {
        self.validators.iter().map(|v| v.as_ref())
    }

    /// Union of every factory's supporting-method prefixes.
    pub fn supporting_prefixes(&self) -> Vec<&'static str> {
        let set: BTreeSet<&'static str> = self
            .factories()
            .flat_map(|f| f.prefixes().iter().copied())
            .collect();
        set.into_iter().collect()
    }
}

impl fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgrammingModel")
            .field("factories", &self.pipeline())
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(&'static str);

    impl FacetFactory for Stub {
        fn name(&self) -> &'static str {
            self.0
        }

        fn feature_types(&self) -> &'static [FeatureType] {
            FeatureType::PROPERTIES_ONLY
        }
    }

    #[test]
    fn factories_sorted_by_bucket_then_registration() {
        let mut model = ProgrammingModel::new();
        model
            .add_factory(ProcessingOrder::Z1Finally, Stub("last"))
            .add_factory(ProcessingOrder::C1MethodIntrospection, Stub("c1-first"))
            .add_factory(ProcessingOrder::A1FallbackDefaults, Stub("a1"))
            .add_factory(ProcessingOrder::C1MethodIntrospection, Stub("c1-second"));

        let names: Vec<_> = model.pipeline().into_iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["a1", "c1-first", "c1-second", "last"]);
    }

    #[test]
    fn defaults_cover_every_bucket_in_order() {
        let model = ProgrammingModel::with_defaults();
        let pipeline = model.pipeline();
        assert!(pipeline.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(pipeline.first().map(|p| p.1), Some("FallbackFacetFactory"));
        assert_eq!(pipeline.last().map(|p| p.1), Some("ImmutableFacetFactory"));
        assert_eq!(model.validators().count(), 2);
    }

    #[test]
    fn parse_supporting_names() {
        let prefixes = [HIDE_PREFIX, VALIDATE_PREFIX, DEFAULT_PREFIX];
        assert_eq!(
            SupportingMethodName::parse("hideQuantity", &prefixes),
            Some(SupportingMethodName {
                prefix: "hide",
                index: None,
                member_id: "quantity".into()
            })
        );
        assert_eq!(
            SupportingMethodName::parse("validate0PlaceOrder", &prefixes),
            Some(SupportingMethodName {
                prefix: "validate",
                index: Some(0),
                member_id: "placeOrder".into()
            })
        );
        assert_eq!(
            SupportingMethodName::parse("validate", &prefixes).map(|n| n.member_id),
            Some(String::new())
        );
        assert_eq!(SupportingMethodName::parse("hideous", &prefixes), None);
        assert_eq!(SupportingMethodName::parse("place", &prefixes), None);
    }

    #[test]
    fn remover_claims_and_excludes() {
        use crate::domain::descriptor::TypeRef;

        let class = ClassDescriptor::new("a.B")
            .method(MethodDescriptor::new("hideFoo", TypeRef::Boolean))
            .method(MethodDescriptor::new("helper", TypeRef::Void));
        let mut remover = MethodRemover::new();
        remover.exclude(1);

        assert_eq!(remover.claim(&class, "hideFoo"), Some(MethodRef::new(0, "hideFoo")));
        assert!(remover.is_claimed(0));
        assert!(remover.find(&class, "helper").is_none());
        assert!(remover.is_removed(1));
    }
}
