//! Specification loading service - the metamodel bootstrap use case.

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    thread::{self, ThreadId},
};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::ClassSource},
    domain::{
        ClassSubstitutor, Introspection, Introspector, MetaModelError, ObjectSpecification,
        ProgrammingModel, ValidationFailures,
    },
    error::{FacetworkError, FacetworkResult},
};

use super::cache::SpecificationCache;

#[derive(Debug, Default)]
struct GateState {
    owner: Option<ThreadId>,
    depth: usize,
}

/// Re-entrant exclusion around introspection. One thread introspects at a
/// time and may recurse into further loads; others block until it is done.
#[derive(Debug, Default)]
struct IntrospectionGate {
    state: Mutex<GateState>,
    released: Condvar,
}

struct GateGuard<'a> {
    gate: &'a IntrospectionGate,
}

impl IntrospectionGate {
    fn enter(&self) -> FacetworkResult<GateGuard<'_>> {
        let me = thread::current().id();
        let mut state = self
            .state
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        loop {
            match state.owner {
                None => {
                    state.owner = Some(me);
                    state.depth = 1;
                    break;
                }
                Some(owner) if owner == me => {
                    state.depth += 1;
                    break;
                }
                Some(_) => {
                    state = self
                        .released
                        .wait(state)
                        .map_err(|_| ApplicationError::StoreLockError)?;
                }
            }
        }
        Ok(GateGuard { gate: self })
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let mut state = self
            .gate
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.owner = None;
            self.gate.released.notify_all();
        }
    }
}

/// Service that turns class names into cached, fully introspected
/// [`ObjectSpecification`]s.
///
/// Readers never block on a completed specification. Introspection runs
/// under a re-entrant gate so a class referring to itself, directly or
/// through other classes, resolves to its in-progress placeholder instead
/// of deadlocking.
pub struct SpecificationLoader {
    source: Arc<dyn ClassSource>,
    model: Arc<ProgrammingModel>,
    cache: SpecificationCache,
    gate: IntrospectionGate,
    substitutor: ClassSubstitutor,
}

impl SpecificationLoader {
    /// Create a new loader over a class source and programming model.
    pub fn new(source: Arc<dyn ClassSource>, model: Arc<ProgrammingModel>) -> Self {
        Self {
            source,
            model,
            cache: SpecificationCache::new(),
            gate: IntrospectionGate::default(),
            substitutor: ClassSubstitutor,
        }
    }

    pub fn model(&self) -> &ProgrammingModel {
        &self.model
    }

    /// Load (or fetch from cache) the specification for `class_name`.
    ///
    /// Proxy class names are mapped to their underlying class first. A
    /// recursive request for a class this thread is already introspecting
    /// returns the placeholder, which is published before the outermost
    /// load returns.
    #[instrument(skip(self))]
    pub fn load_specification(&self, class_name: &str) -> FacetworkResult<Arc<ObjectSpecification>> {
        let name = self.substitutor.substitute(class_name);

        if let Some(spec) = self.cache.get(name)? {
            if spec.is_introspected() {
                return Ok(spec);
            }
        }

        let _guard = self.gate.enter()?;

        // Either published while we waited, or our own in-progress placeholder.
        if let Some(spec) = self.cache.get(name)? {
            if !spec.is_introspected() {
                debug!(class = name, "returning in-progress placeholder");
            }
            return Ok(spec);
        }

        let class = self
            .source
            .lookup(name)?
            .ok_or_else(|| MetaModelError::ClassNotFound(name.to_string()))?;
        let spec = self
            .cache
            .insert_if_absent(Arc::new(ObjectSpecification::placeholder(class)))?;

        match self.introspect(&spec) {
            Ok(introspection) => {
                spec.publish(introspection);
                debug!(class = name, "specification published");
                Ok(spec)
            }
            Err(e) => {
                warn!(class = name, error = %e, "introspection failed");
                self.cache.remove(name)?;
                Err(e)
            }
        }
    }

    fn introspect(&self, spec: &ObjectSpecification) -> FacetworkResult<Introspection> {
        let introspection = Introspector::new(&self.model).introspect(spec.class_descriptor())?;

        for referenced in introspection.referenced_classes(spec.full_name()) {
            match self.load_specification(&referenced) {
                Ok(_) => {}
                Err(FacetworkError::Domain(MetaModelError::ClassNotFound(missing))) => {
                    debug!(class = %missing, "referenced class is not a domain class");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(introspection)
    }

    /// Cached specification without triggering introspection.
    pub fn lookup(&self, class_name: &str) -> FacetworkResult<Option<Arc<ObjectSpecification>>> {
        self.cache.get(self.substitutor.substitute(class_name))
    }

    /// Introspect every class the source discovers, then run the
    /// programming model's validators. Any failure aborts the bootstrap.
    #[instrument(skip(self))]
    pub fn init_metamodel(&self) -> FacetworkResult<Vec<Arc<ObjectSpecification>>> {
        let names = self.source.discover()?;
        info!(classes = names.len(), "bootstrapping metamodel");

        for name in &names {
            self.load_specification(name)?;
        }

        self.validate()?.into_result()?;

        let specs = self.cache.all()?;
        info!(specifications = specs.len(), "metamodel ready");
        Ok(specs)
    }

    /// Run all validators over every cached specification and collect
    /// their failures.
    pub fn validate(&self) -> FacetworkResult<ValidationFailures> {
        let prefixes = self.model.supporting_prefixes();
        let mut failures = ValidationFailures::new();
        for spec in self.cache.all()? {
            for validator in self.model.validators() {
                validator.validate(&spec, &prefixes, &mut failures);
            }
        }
        if !failures.is_empty() {
            warn!(failures = failures.len(), "metamodel validation failed");
        }
        Ok(failures)
    }

    /// All cached specifications, sorted by class name.
    pub fn all_specifications(&self) -> FacetworkResult<Vec<Arc<ObjectSpecification>>> {
        self.cache.all()
    }

    /// Drop a cached specification so the next load re-introspects it.
    pub fn invalidate(&self, class_name: &str) -> FacetworkResult<bool> {
        Ok(self
            .cache
            .remove(self.substitutor.substitute(class_name))?
            .is_some())
    }
}
