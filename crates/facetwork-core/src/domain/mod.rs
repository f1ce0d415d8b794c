// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Facetwork.
//!
//! Pure metamodel logic: descriptors in, specifications out, interaction
//! verdicts on demand. Class discovery, manifest parsing, and presentation
//! are handled via ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No ambient state**: The session is passed into every check
//! - **Sum-typed facets**: Capability dispatch is a `match`, not a trait tree
//!
// Public API - what the world sees
pub mod descriptor;
pub mod error;
pub mod facet;
pub mod factories;
pub mod feature;
pub mod holder;
pub mod identifier;
pub mod interaction;
pub mod introspector;
pub mod object;
pub mod session;
pub mod specification;
pub mod substitutor;
pub mod validation;

// Re-exports for convenience
pub use descriptor::{
    Annotated, Annotation, ClassDescriptor, MethodBody, MethodDescriptor, ParameterDescriptor,
    TypeRef,
};
pub use error::{ErrorCategory, InvocationError, MetaModelError, ValidationFailure, ValidationFailures};
pub use facet::{Capabilities, Facet, FacetKind, FacetType, MethodRef, Nature, Precedence, When, Where};
pub use factories::{FacetFactory, MethodRemover, ProcessingOrder, ProgrammingModel};
pub use feature::FeatureType;
pub use holder::FacetHolder;
pub use identifier::{Identifier, IdentifierKind};
pub use interaction::{
    Advisory, Consent, InteractionContext, InteractionInitiatedBy, InteractionResult,
    InteractionResultSet, InteractionType,
};
pub use introspector::Introspector;
pub use object::{ObjectAdapter, ObjectState, Oid, Value};
pub use session::{Authorizor, PermitAll, Session, UserMemento};
pub use specification::{
    Introspection, MemberSummary, ObjectAction, ObjectActionParameter, ObjectMember,
    ObjectSpecification, OneToManyAssociation, OneToOneAssociation,
};
pub use substitutor::ClassSubstitutor;
pub use validation::MetaModelValidator;
