//! Unified error handling for Facetwork Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::{ApplicationError, InteractionError};
use crate::domain::MetaModelError;

/// Root error type for Facetwork Core operations.
///
/// This enum wraps all possible errors that can occur when using facetwork-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum FacetworkError {
    /// Errors from the domain layer (metamodel violations, invocation failures).
    #[error("{0}")]
    Domain(#[from] MetaModelError),

    /// Errors from the application layer (orchestration failures, vetoes).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl From<InteractionError> for FacetworkError {
    fn from(e: InteractionError) -> Self {
        Self::Application(ApplicationError::Interaction(e))
    }
}

impl FacetworkError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run `facetwork config` to see the effective settings".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Facetwork".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::StoreLockError | ApplicationError::SourceUnavailable { .. })
        )
    }

    /// The veto behind this error, if a guarded call was refused.
    pub fn as_interaction(&self) -> Option<&InteractionError> {
        match self {
            Self::Application(ApplicationError::Interaction(e)) => Some(e),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type FacetworkResult<T> = Result<T, FacetworkError>;
