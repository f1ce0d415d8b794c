//! Stable identifiers for metamodel elements.
//!
//! External subsystems (command log, auditing, resource URLs, authorization)
//! address classes and members through these strings instead of holding live
//! references into the metamodel.
//!
//! | Element    | Form                                   |
//! |------------|----------------------------------------|
//! | class      | `com.acme.Order`                       |
//! | property   | `com.acme.Order#quantity`              |
//! | collection | `com.acme.Order#lines`                 |
//! | action     | `com.acme.Order#place(text,integer)`   |
//! | parameter  | `com.acme.Order#place(text,integer)[0]`|

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::MetaModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Class,
    /// Properties and collections share one form.
    Association,
    Action,
    Parameter(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    class_name: String,
    member_name: Option<String>,
    parameter_types: Vec<String>,
    kind: IdentifierKind,
}

impl Identifier {
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: None,
            parameter_types: Vec::new(),
            kind: IdentifierKind::Class,
        }
    }

    pub fn association(class_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: Some(member.into()),
            parameter_types: Vec::new(),
            kind: IdentifierKind::Association,
        }
    }

    pub fn action(
        class_name: impl Into<String>,
        member: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: Some(member.into()),
            parameter_types,
            kind: IdentifierKind::Action,
        }
    }

    /// Identifier of parameter `index` of this action.
    ///
    /// # Panics
    ///
    /// Panics when called on a non-action identifier; parameters only exist
    /// on actions.
    pub fn parameter(&self, index: usize) -> Self {
        assert!(
            self.kind == IdentifierKind::Action,
            "parameters only exist on actions, not on {}",
            self
        );
        Self {
            kind: IdentifierKind::Parameter(index),
            ..self.clone()
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Unqualified class name (`Order` for `com.acme.Order`).
    pub fn short_class_name(&self) -> &str {
        self.class_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.class_name)
    }

    /// Identifier of the owning class.
    pub fn to_class_identifier(&self) -> Self {
        Self::class(self.class_name.clone())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name)?;
        let Some(member) = &self.member_name else {
            return Ok(());
        };
        write!(f, "#{member}")?;
        match self.kind {
            IdentifierKind::Class | IdentifierKind::Association => Ok(()),
            IdentifierKind::Action => write!(f, "({})", self.parameter_types.join(",")),
            IdentifierKind::Parameter(index) => {
                write!(f, "({})[{index}]", self.parameter_types.join(","))
            }
        }
    }
}

impl FromStr for Identifier {
    type Err = MetaModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            MetaModelError::validation(s, "not a valid identifier string".to_string())
        };

        let Some((class_name, rest)) = s.split_once('#') else {
            if s.is_empty() || s.contains(['(', ')', '[', ']']) {
                return Err(invalid());
            }
            return Ok(Self::class(s));
        };
        if class_name.is_empty() || rest.is_empty() {
            return Err(invalid());
        }

        let Some((member, signature)) = rest.split_once('(') else {
            return Ok(Self::association(class_name, rest));
        };
        let (types, tail) = signature.split_once(')').ok_or_else(invalid)?;
        let parameter_types: Vec<String> = types
            .split(',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let action = Self::action(class_name, member, parameter_types);

        if tail.is_empty() {
            return Ok(action);
        }
        let index = tail
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(invalid)?;
        Ok(action.parameter(index))
    }
}
