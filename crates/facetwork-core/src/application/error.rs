//! Application layer errors.
//!
//! These errors represent failures in orchestration, not metamodel logic.
//! Metamodel errors are `MetaModelError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A shared store or the introspection gate was poisoned.
    #[error("Store lock error")]
    StoreLockError,

    /// The class source could not be read.
    #[error("Class source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A guarded call was vetoed.
    #[error(transparent)]
    Interaction(#[from] InteractionError),

    /// The specification has no member with that id.
    #[error("No member '{member}' on {class}")]
    MemberNotFound { class: String, member: String },
}

/// A veto turned into an error at the wrapper boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("{identifier} is hidden: {reason}")]
    Hidden { identifier: String, reason: String },

    #[error("{identifier} is disabled: {reason}")]
    Disabled { identifier: String, reason: String },

    #[error("{identifier} is invalid: {reason}")]
    Invalid { identifier: String, reason: String },
}

impl InteractionError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Hidden { reason, .. }
            | Self::Disabled { reason, .. }
            | Self::Invalid { reason, .. } => reason,
        }
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StoreLockError => vec![
                "A shared store lock was poisoned".into(),
                "A previous introspection panicked; restart the process".into(),
            ],
            Self::SourceUnavailable { reason } => vec![
                format!("Class source failed: {}", reason),
                "Check the class manifest directory exists and is readable".into(),
            ],
            Self::Interaction(e) => vec![format!("Vetoed: {}", e.reason())],
            Self::MemberNotFound { class, .. } => vec![
                format!("Try: facetwork inspect {}", class),
                "Member ids are property/collection names or action method names".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::StoreLockError => ErrorCategory::Internal,
            Self::SourceUnavailable { .. } => ErrorCategory::Configuration,
            Self::Interaction(_) => ErrorCategory::Validation,
            Self::MemberNotFound { .. } => ErrorCategory::NotFound,
        }
    }
}
