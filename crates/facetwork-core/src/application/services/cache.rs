//! Shared cache of object specifications keyed by class name.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{application::ApplicationError, domain::ObjectSpecification, error::FacetworkResult};

/// Thread-safe specification cache.
///
/// Entries may be placeholders while their class is being introspected;
/// readers check [`ObjectSpecification::is_introspected`].
#[derive(Debug, Default)]
pub struct SpecificationCache {
    inner: RwLock<HashMap<String, Arc<ObjectSpecification>>>,
}

impl SpecificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> FacetworkResult<Option<Arc<ObjectSpecification>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(name).cloned())
    }

    /// Insert `spec` unless its class is already cached. Returns whichever
    /// entry is in the cache afterwards.
    pub fn insert_if_absent(
        &self,
        spec: Arc<ObjectSpecification>,
    ) -> FacetworkResult<Arc<ObjectSpecification>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let entry = inner
            .entry(spec.full_name().to_string())
            .or_insert(spec);
        Ok(Arc::clone(entry))
    }

    pub fn remove(&self, name: &str) -> FacetworkResult<Option<Arc<ObjectSpecification>>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.remove(name))
    }

    /// All cached specifications, sorted by class name.
    pub fn all(&self) -> FacetworkResult<Vec<Arc<ObjectSpecification>>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let mut specs: Vec<_> = inner.values().cloned().collect();
        specs.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        Ok(specs)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> FacetworkResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClassDescriptor;

    fn placeholder(name: &str) -> Arc<ObjectSpecification> {
        Arc::new(ObjectSpecification::placeholder(Arc::new(ClassDescriptor::new(name))))
    }

    #[test]
    fn insert_keeps_first_entry() {
        let cache = SpecificationCache::new();
        let first = cache.insert_if_absent(placeholder("a.B")).unwrap();
        let second = cache.insert_if_absent(placeholder("a.B")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn all_is_sorted_and_remove_works() {
        let cache = SpecificationCache::new();
        cache.insert_if_absent(placeholder("z.Z")).unwrap();
        cache.insert_if_absent(placeholder("a.A")).unwrap();

        let names: Vec<_> = cache
            .all()
            .unwrap()
            .iter()
            .map(|s| s.full_name().to_string())
            .collect();
        assert_eq!(names, vec!["a.A", "z.Z"]);

        assert!(cache.remove("a.A").unwrap().is_some());
        assert!(cache.get("a.A").unwrap().is_none());
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }
}
