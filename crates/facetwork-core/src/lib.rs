//! Facetwork Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Facetwork, a
//! facet-based metamodel: class descriptors are introspected into object
//! specifications whose members carry facets, and every read, write, or
//! invocation can be checked against those facets before it happens.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          facetwork-cli (CLI)            │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (SpecificationLoader, WrapperFactory)  │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │      (Driven: ClassSource, Authorizor)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    facetwork-adapters (Infrastructure)  │
//! │ (InMemoryClassRegistry, manifests, ...) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Facet, FacetHolder, ObjectSpecification)│
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use facetwork_core::prelude::*;
//!
//! # fn run(source: Arc<dyn ClassSource>) -> FacetworkResult<()> {
//! let loader = Arc::new(SpecificationLoader::new(
//!     source,
//!     Arc::new(ProgrammingModel::with_defaults()),
//! ));
//! loader.init_metamodel()?;
//!
//! let session = Session::permit_all(UserMemento::new("sven"));
//! let mut order = ObjectAdapter::persistent("com.acme.Order", "1");
//! let mut wrapped = WrapperFactory::new(loader).wrap(&mut order, &session)?;
//! wrapped.set_property("quantity", Value::Int(3))?;
//! # Ok(())
//! # }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        SpecificationLoader, WrapperFactory, WrapperMode, Wrapped,
        ports::{Authorizor, ClassSource},
    };
    pub use crate::domain::{
        Annotation, ClassDescriptor, Consent, Facet, FacetHolder, FacetKind, FacetType,
        FeatureType, Identifier, InteractionInitiatedBy, MethodBody, MethodDescriptor,
        ObjectAdapter, ObjectSpecification, ParameterDescriptor, PermitAll, ProgrammingModel,
        Session, TypeRef, UserMemento, Value, Where,
    };
    pub use crate::error::{FacetworkError, FacetworkResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
