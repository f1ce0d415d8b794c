//! Class source implementations.

pub mod memory;

pub use memory::InMemoryClassRegistry;
