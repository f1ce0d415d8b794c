//! Runtime domain instances as seen by the metamodel.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A property value, action argument, or supporting-method result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    /// Reference to another domain object by oid.
    Reference(Oid),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, empty text, or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Text(_) => "text",
            Self::Reference(_) => "reference",
            Self::List(_) => "list",
        }
    }

    /// Best-effort parse of user input (CLI flags, manifest constants).
    ///
    /// `null` → Null, `true`/`false` → Bool, integers → Int, `@oid` →
    /// Reference, everything else → Text.
    pub fn parse_loose(raw: &str) -> Self {
        match raw {
            "null" => Self::Null,
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => {
                if let Ok(i) = raw.parse::<i64>() {
                    Self::Int(i)
                } else if let Some(oid) = raw.strip_prefix('@') {
                    Self::Reference(Oid::new(oid))
                } else {
                    Self::Text(raw.to_string())
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Reference(oid) => write!(f, "@{oid}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Oid(String);

impl Oid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Fresh identifier for an object that has not been persisted yet.
    pub fn transient() -> Self {
        Self(format!("T:{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistence lifecycle of a domain instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectState {
    #[default]
    Transient,
    Persistent,
    Destroyed,
}

/// A domain instance paired with the name of its class.
///
/// Interaction checks and supporting methods only ever see domain objects
/// through this adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAdapter {
    class_name: String,
    oid: Oid,
    state: ObjectState,
    fields: BTreeMap<String, Value>,
}

impl ObjectAdapter {
    /// New transient instance with a generated oid.
    pub fn transient(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            oid: Oid::transient(),
            state: ObjectState::Transient,
            fields: BTreeMap::new(),
        }
    }

    /// Instance already known to the persistence layer.
    pub fn persistent(class_name: impl Into<String>, oid: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            oid: Oid::new(oid),
            state: ObjectState::Persistent,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn is_persistent(&self) -> bool {
        self.state == ObjectState::Persistent
    }

    pub fn is_transient(&self) -> bool {
        self.state == ObjectState::Transient
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == ObjectState::Destroyed
    }

    /// Persist a transient instance, assigning its permanent oid.
    pub fn mark_persistent(&mut self, oid: impl Into<String>) {
        self.oid = Oid::new(oid);
        self.state = ObjectState::Persistent;
    }

    pub fn mark_destroyed(&mut self) {
        self.state = ObjectState::Destroyed;
    }

    /// Field value; unset fields read as `Null`.
    pub fn field(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_objects_get_unique_oids() {
        let a = ObjectAdapter::transient("com.acme.Order");
        let b = ObjectAdapter::transient("com.acme.Order");
        assert_ne!(a.oid(), b.oid());
        assert!(a.is_transient());
    }

    #[test]
    fn mark_persistent_changes_state_and_oid() {
        let mut order = ObjectAdapter::transient("com.acme.Order");
        order.mark_persistent("ORD-1");
        assert!(order.is_persistent());
        assert_eq!(order.oid().as_str(), "ORD-1");
    }

    #[test]
    fn unset_field_reads_null() {
        let order = ObjectAdapter::persistent("com.acme.Order", "1").with_field("quantity", 3);
        assert_eq!(order.field("quantity"), Value::Int(3));
        assert_eq!(order.field("missing"), Value::Null);
    }

    #[test]
    fn parse_loose_recognises_scalars() {
        assert_eq!(Value::parse_loose("null"), Value::Null);
        assert_eq!(Value::parse_loose("true"), Value::Bool(true));
        assert_eq!(Value::parse_loose("-12"), Value::Int(-12));
        assert_eq!(
            Value::parse_loose("@CUST-9"),
            Value::Reference(Oid::new("CUST-9"))
        );
        assert_eq!(Value::parse_loose("hello"), Value::from("hello"));
    }

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(!Value::Int(0).is_empty());
    }
}
