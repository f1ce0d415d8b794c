//! Errors raised while reading class manifests and authorization tables.

use std::path::PathBuf;

use thiserror::Error;

use facetwork_core::error::FacetworkError;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("class directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unknown type '{0}'; expected one of: void, boolean, integer, text, ref:<class>, list:<class>")]
    UnknownType(String),

    #[error("unsupported value {0} in manifest; use a boolean, integer, string, or array")]
    UnsupportedValue(String),
}

impl From<ManifestError> for FacetworkError {
    fn from(e: ManifestError) -> Self {
        FacetworkError::Configuration {
            message: e.to_string(),
        }
    }
}
