//! Raw program elements fed into the facet factory pipeline.
//!
//! These descriptors stand in for reflected classes and methods: a class
//! source (see [`crate::application::ports::ClassSource`]) produces them, the
//! introspector walks them, and factories read their annotations and names.
//! Behavior is attached through [`MethodBody`], an explicit dispatch entry
//! per method.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::InvocationError,
    facet::{Nature, When, Where},
    object::{ObjectAdapter, Value},
};

// ── Types ────────────────────────────────────────────────────────────────────

/// Declared type of a return value or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Void,
    Boolean,
    Integer,
    Text,
    /// Reference to another domain class.
    Reference(String),
    /// Collection of instances of a domain class.
    Collection(String),
}

impl TypeRef {
    /// Domain class this type points at, if any.
    pub fn referenced_class(&self) -> Option<&str> {
        match self {
            Self::Reference(c) | Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Name used in identifier signatures.
    pub fn signature_name(&self) -> String {
        match self {
            Self::Void => "void".into(),
            Self::Boolean => "boolean".into(),
            Self::Integer => "integer".into(),
            Self::Text => "text".into(),
            Self::Reference(c) => c.clone(),
            Self::Collection(c) => format!("list<{c}>"),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature_name())
    }
}

// ── Annotations ──────────────────────────────────────────────────────────────

/// Declarative markers on classes, methods, and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Hidden {
        #[serde(default)]
        when: When,
        #[serde(default, rename = "where")]
        where_: Where,
    },
    Disabled {
        #[serde(default)]
        when: When,
        #[serde(default)]
        reason: Option<String>,
    },
    MaxLength {
        value: usize,
    },
    Optional,
    Mandatory,
    Named {
        value: String,
    },
    DescribedAs {
        value: String,
    },
    DomainObject {
        #[serde(default)]
        nature: Nature,
        #[serde(default)]
        logical_type_name: Option<String>,
    },
    Immutable {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Excludes a method from the metamodel entirely.
    Programmatic,
}

/// Lookup helpers shared by class, method, and parameter descriptors.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn find_annotation<T>(&self, pick: impl Fn(&Annotation) -> Option<T>) -> Option<T> {
        self.annotations().iter().find_map(pick)
    }

    fn has_annotation(&self, pred: impl Fn(&Annotation) -> bool) -> bool {
        self.annotations().iter().any(pred)
    }
}

// ── Method bodies ────────────────────────────────────────────────────────────

type QueryFn = dyn Fn(&ObjectAdapter, &[Value]) -> Result<Value, InvocationError> + Send + Sync;
type CommandFn =
    dyn Fn(&mut ObjectAdapter, &[Value]) -> Result<Value, InvocationError> + Send + Sync;

/// Dispatch entry for a method: what runs when the metamodel invokes it.
#[derive(Clone)]
pub enum MethodBody {
    /// Reads the target only (accessors, supporting methods).
    Query(Arc<QueryFn>),
    /// May mutate the target (setters, actions).
    Command(Arc<CommandFn>),
}

impl MethodBody {
    pub fn query<F>(f: F) -> Self
    where
        F: Fn(&ObjectAdapter, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self::Query(Arc::new(f))
    }

    pub fn command<F>(f: F) -> Self
    where
        F: Fn(&mut ObjectAdapter, &[Value]) -> Result<Value, InvocationError>
            + Send
            + Sync
            + 'static,
    {
        Self::Command(Arc::new(f))
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(_) => f.write_str("MethodBody::Query(..)"),
            Self::Command(_) => f.write_str("MethodBody::Command(..)"),
        }
    }
}

// ── Descriptors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: String,
    pub type_ref: TypeRef,
    pub annotations: Vec<Annotation>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl Annotated for ParameterDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: TypeRef,
    pub annotations: Vec<Annotation>,
    pub is_static: bool,
    pub body: Option<MethodBody>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            annotations: Vec::new(),
            is_static: false,
            body: None,
        }
    }

    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn body(mut self, body: MethodBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.type_ref.clone()).collect()
    }

    /// Invoke against a shared target. Fails for [`MethodBody::Command`].
    pub fn invoke(&self, target: &ObjectAdapter, args: &[Value]) -> Result<Value, InvocationError> {
        self.check_arity(args)?;
        match &self.body {
            None => Err(InvocationError::MissingBody {
                method: self.name.clone(),
            }),
            Some(MethodBody::Query(f)) => f(target, args),
            Some(MethodBody::Command(_)) => Err(InvocationError::RequiresMutableTarget {
                method: self.name.clone(),
            }),
        }
    }

    /// Invoke with exclusive access; accepts either body kind.
    pub fn invoke_mut(
        &self,
        target: &mut ObjectAdapter,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        self.check_arity(args)?;
        match &self.body {
            None => Err(InvocationError::MissingBody {
                method: self.name.clone(),
            }),
            Some(MethodBody::Query(f)) => f(target, args),
            Some(MethodBody::Command(f)) => f(target, args),
        }
    }

    fn check_arity(&self, args: &[Value]) -> Result<(), InvocationError> {
        if args.len() != self.parameters.len() {
            return Err(InvocationError::ArityMismatch {
                method: self.name.clone(),
                expected: self.parameters.len(),
                actual: args.len(),
            });
        }
        Ok(())
    }
}

impl Annotated for MethodDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A domain class as offered by a class source.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    /// Fully-qualified name.
    pub name: String,
    pub annotations: Vec<Annotation>,
    /// Declared methods, in declaration order.
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method_at(&self, index: usize) -> Option<&MethodDescriptor> {
        self.methods.get(index)
    }

    pub fn find_method(&self, name: &str) -> Option<(usize, &MethodDescriptor)> {
        self.methods.iter().enumerate().find(|(_, m)| m.name == name)
    }
}

impl Annotated for ClassDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

// ── Naming conventions ───────────────────────────────────────────────────────

/// `quantity` → `Quantity`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Quantity` → `quantity`.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `placeOrder` → `Place Order`.
pub fn natural_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}
