//! In-memory class registry with the built-in demo domain.

use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::{debug, warn};

use facetwork_core::{
    application::{ApplicationError, ports::ClassSource},
    domain::ClassDescriptor,
    error::FacetworkResult,
};

use crate::builtin_domain;

/// Thread-safe in-memory class registry.
#[derive(Clone, Default)]
pub struct InMemoryClassRegistry {
    inner: Arc<RwLock<BTreeMap<String, Arc<ClassDescriptor>>>>,
}

impl InMemoryClassRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in demo domain loaded.
    pub fn with_builtin() -> FacetworkResult<Self> {
        let registry = Self::new();
        registry.register_all(builtin_domain::all_classes())?;
        Ok(registry)
    }

    /// Register a class, replacing any earlier descriptor with the same name.
    pub fn register(&self, class: ClassDescriptor) -> FacetworkResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if inner.contains_key(&class.name) {
            warn!(class = %class.name, "replacing registered class");
        } else {
            debug!(class = %class.name, methods = class.methods.len(), "registered class");
        }
        inner.insert(class.name.clone(), Arc::new(class));
        Ok(())
    }

    pub fn register_all(
        &self,
        classes: impl IntoIterator<Item = ClassDescriptor>,
    ) -> FacetworkResult<()> {
        for class in classes {
            self.register(class)?;
        }
        Ok(())
    }

    /// Get the number of classes.
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or_default()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all classes.
    pub fn clear(&self) -> FacetworkResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.clear();
        Ok(())
    }
}

impl ClassSource for InMemoryClassRegistry {
    fn discover(&self) -> FacetworkResult<Vec<String>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().cloned().collect())
    }

    fn lookup(&self, name: &str) -> FacetworkResult<Option<Arc<ClassDescriptor>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(name).cloned())
    }
}
