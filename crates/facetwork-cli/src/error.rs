//! Error handling for the Facetwork CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use thiserror::Error;

use facetwork_adapters::ManifestError;
use facetwork_core::error::FacetworkError;

pub use facetwork_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// No class directory was given and the demo domain is disabled.
    #[error("No class directory given and the built-in demo is disabled")]
    NoClassSource,

    /// A class manifest or role table could not be read.
    #[error("Could not load class manifests: {0}")]
    Manifest(#[from] ManifestError),

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration value could not be read or rendered.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `facetwork-core`.
    #[error("{0}")]
    Core(#[from] FacetworkError),

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::IoError {
            message: format!("failed to render JSON: {err}"),
            source: err.into(),
        }
    }
}

impl CliError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::NoClassSource => vec![
                "Pass a class directory, e.g. `facetwork validate ./classes`".into(),
                "Or set metamodel.classes_dir in the config file".into(),
                "Or set metamodel.builtin_demo = true".into(),
            ],

            Self::Manifest(ManifestError::DirectoryNotFound(path)) => vec![
                format!("'{}' does not exist or is not a directory", path.display()),
                "Check the DIR argument or metamodel.classes_dir".into(),
            ],

            Self::Manifest(ManifestError::UnknownType(_)) => vec![
                "Method return and parameter types are void, boolean, integer, text, ref:<class>, or list:<class>".into(),
            ],

            Self::Manifest(_) => vec![
                "Check the manifest syntax against the [class] / [[methods]] layout".into(),
                "Run with -v to see which files were read".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                format!("Check your config file at {}", crate::config::AppConfig::config_path().display()),
                "Known keys: metamodel.classes_dir, metamodel.builtin_demo, session.user, session.roles, output.no_color, output.format".into(),
            ],

            Self::Core(core_err) => {
                let mut suggestions = core_err.suggestions();
                if core_err.is_retryable() {
                    suggestions.push("The failure may be transient; run the command again".into());
                }
                suggestions
            }

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::NoClassSource => ErrorCategory::Configuration,
            Self::Manifest(ManifestError::DirectoryNotFound(_)) => ErrorCategory::NotFound,
            Self::Manifest(_) => ErrorCategory::Configuration,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        let _ = write!(output, "\n{} {}\n\n", "✗".red().bold(), "Error:".red().bold());
        for line in self.to_string().lines() {
            let _ = writeln!(output, "  {}", line.red());
        }

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                let _ = write!(output, "\n  {} {}\n", "→".dimmed(), err.to_string().dimmed());
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = write!(output, "\n{}\n", "Suggestions:".yellow().bold());
            for suggestion in suggestions {
                let _ = writeln!(output, "  {suggestion}");
            }
        }

        if !verbose {
            output.push('\n');
            let _ = writeln!(
                output,
                "{} {}",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            );
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nError: {self}");

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                let _ = writeln!(out, "  Caused by: {err}");
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                let _ = writeln!(out, "  {s}");
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Internal/system error.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, toml::ser::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetwork_core::{
        application::ApplicationError,
        domain::{MetaModelError, ValidationFailures},
    };
    use std::{io, path::PathBuf};

    // ── suggestions ───────────────────────────────────────────────────────

    #[test]
    fn missing_directory_is_not_found() {
        let err = CliError::Manifest(ManifestError::DirectoryNotFound(PathBuf::from("/nope")));
        assert_eq!(err.exit_code(), 3);
        assert!(err.suggestions().iter().any(|s| s.contains("/nope")));
    }

    #[test]
    fn no_class_source_suggests_builtin_demo() {
        let err = CliError::NoClassSource;
        assert!(err.suggestions().iter().any(|s| s.contains("builtin_demo")));
        assert_eq!(err.exit_code(), 4);
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn exit_code_user_error() {
        assert_eq!(CliError::invalid_input("x").exit_code(), 2);
    }

    #[test]
    fn validation_failures_are_user_errors() {
        let mut failures = ValidationFailures::new();
        failures.add("com.acme.Order#hideDiscount()", "orphaned supporting method");
        let err = CliError::from(FacetworkError::from(MetaModelError::ValidationFailures(failures)));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("hideDiscount"));
    }

    #[test]
    fn source_failures_suggest_a_retry() {
        let err = CliError::from(FacetworkError::from(ApplicationError::SourceUnavailable {
            reason: "registry lock".into(),
        }));
        assert!(err.suggestions().iter().any(|s| s.contains("run the command again")));

        let err = CliError::from(FacetworkError::from(ApplicationError::MemberNotFound {
            class: "com.acme.Order".into(),
            member: "discount".into(),
        }));
        assert!(!err.suggestions().iter().any(|s| s.contains("run the command again")));
    }

    #[test]
    fn unknown_member_is_not_found() {
        let err = CliError::from(FacetworkError::from(ApplicationError::MemberNotFound {
            class: "com.acme.Order".into(),
            member: "discount".into(),
        }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            4
        );
    }

    #[test]
    fn exit_code_internal() {
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            1
        );
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let err = CliError::NoClassSource;
        let s = err.format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause() {
        let err = CliError::IoError {
            message: "reading manifest".into(),
            source: io::Error::other("disk on fire"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk on fire"));
        assert!(!s.contains("--verbose"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "writing output");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
