//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "bootstrap the metamodel" or "set a property
//! on behalf of a user".

pub mod cache;
pub mod specification_loader;
pub mod wrapper;

pub use cache::SpecificationCache;
pub use specification_loader::SpecificationLoader;
pub use wrapper::{WrapperFactory, WrapperMode, Wrapped};
