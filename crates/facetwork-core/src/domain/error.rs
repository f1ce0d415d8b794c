// ============================================================================
// domain/error.rs - METAMODEL ERROR DOMAIN
// ============================================================================

use std::fmt;

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (bootstrap reports are kept and re-displayed)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetaModelError {
    // ========================================================================
    // Validation Errors (fatal at bootstrap)
    // ========================================================================
    #[error("Metamodel validation failed for {class}: {message}")]
    Validation { class: String, message: String },

    #[error("Metamodel validation failed:\n{0}")]
    ValidationFailures(ValidationFailures),

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("No class descriptor found for '{0}'")]
    ClassNotFound(String),

    #[error("Class '{0}' cannot be introspected")]
    NotIntrospectable(String),

    // ========================================================================
    // Reflection Failures
    // ========================================================================
    #[error("Failed to invoke supporting method for {identifier}: {source}")]
    Invocation {
        identifier: String,
        #[source]
        source: InvocationError,
    },
}

impl MetaModelError {
    /// Shorthand for a fail-fast validation error raised by a facet factory.
    pub fn validation(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation { class, .. } => vec![
                format!("Fix the declarations on '{}'", class),
                "Metamodel errors are programming mistakes in the domain classes".into(),
            ],
            Self::ValidationFailures(failures) => {
                let mut out = vec![format!("{} problem(s) found in the domain model", failures.len())];
                out.extend(
                    failures
                        .iter()
                        .map(|f| format!("  • {}", f.identifier)),
                );
                out
            }
            Self::ClassNotFound(name) => vec![
                format!("Class '{}' is not known to the class source", name),
                "Check the class manifest directory".into(),
                "Try: facetwork list".into(),
            ],
            Self::NotIntrospectable(name) => vec![format!(
                "'{}' is a framework-internal or ignored class",
                name
            )],
            Self::Invocation { .. } => vec![
                "A supporting method failed at runtime".into(),
                "Check the method body declared for this member".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::ValidationFailures(_) => ErrorCategory::Validation,
            Self::ClassNotFound(_) | Self::NotIntrospectable(_) => ErrorCategory::NotFound,
            Self::Invocation { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}

/// Failure to call a supporting method through its dispatch entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error("method '{method}' has no body")]
    MissingBody { method: String },

    #[error("method '{method}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("method '{method}' returned {actual}, expected {expected}")]
    UnexpectedReturn {
        method: String,
        expected: &'static str,
        actual: String,
    },

    #[error("method '{method}' mutates its target and needs exclusive access")]
    RequiresMutableTarget { method: String },

    #[error("method '{method}' failed: {reason}")]
    Failed { method: String, reason: String },
}

/// One problem found by a metamodel validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Identifier string of the offending element.
    pub identifier: String,
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.message)
    }
}

/// Collected validator output. Non-empty means the metamodel is unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailures {
    failures: Vec<ValidationFailure>,
}

impl ValidationFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, identifier: impl Into<String>, message: impl Into<String>) {
        self.failures.push(ValidationFailure {
            identifier: identifier.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter()
    }

    /// `Ok(())` when nothing was recorded, otherwise the whole batch as an error.
    pub fn into_result(self) -> Result<(), MetaModelError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MetaModelError::ValidationFailures(self))
        }
    }
}

impl fmt::Display for ValidationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "  {}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_failures_are_ok() {
        assert!(ValidationFailures::new().into_result().is_ok());
    }

    #[test]
    fn failures_render_every_entry() {
        let mut failures = ValidationFailures::new();
        failures.add("com.acme.Order#hideFoo()", "orphaned");
        failures.add("com.acme.Order#validate9bar(text)", "no such parameter");

        let err = failures.into_result().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("hideFoo"));
        assert!(text.contains("validate9bar"));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn validation_error_names_class() {
        let err = MetaModelError::validation("com.acme.Order", "uses both old and new syntax");
        assert!(err.to_string().contains("com.acme.Order"));
        assert!(err.suggestions()[0].contains("com.acme.Order"));
    }
}
