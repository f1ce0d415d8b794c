//! Infrastructure adapters for Facetwork.
//!
//! This crate implements the ports defined in `facetwork-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod authorizor;
pub mod builtin_domain;
pub mod class_loader;
pub mod class_registry;
pub mod error;

// Re-export commonly used adapters
pub use authorizor::{Permission, RoleTableAuthorizor};
pub use class_loader::ClassManifestLoader;
pub use class_registry::InMemoryClassRegistry;
pub use error::ManifestError;
