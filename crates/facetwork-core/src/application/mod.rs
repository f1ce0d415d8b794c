//! Application layer for Facetwork.
//!
//! This layer contains:
//! - **Services**: Specification loading and caching, guarded object access
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! metamodel rules itself. All of those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    SpecificationCache, SpecificationLoader, WrapperFactory, WrapperMode, Wrapped,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Authorizor, ClassSource};

pub use error::{ApplicationError, InteractionError};
