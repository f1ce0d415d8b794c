//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `facetwork-adapters` crate provides implementations.

use std::sync::Arc;

use crate::domain::ClassDescriptor;
use crate::error::FacetworkResult;

pub use crate::domain::session::Authorizor;

/// Port for class discovery.
///
/// Implemented by:
/// - `facetwork_adapters::class_registry::InMemoryClassRegistry`, filled by hand,
///   from the built-in demo domain, or by `ClassManifestLoader::load_registry`
///
/// ## Design Notes
///
/// - Names are fully-qualified class names
/// - Descriptors are shared; the metamodel never mutates them
#[cfg_attr(test, mockall::automock)]
pub trait ClassSource: Send + Sync {
    /// Every class the metamodel should introspect at bootstrap.
    fn discover(&self) -> FacetworkResult<Vec<String>>;

    /// The descriptor for `name`, if this source knows it.
    fn lookup(&self, name: &str) -> FacetworkResult<Option<Arc<ClassDescriptor>>>;
}
