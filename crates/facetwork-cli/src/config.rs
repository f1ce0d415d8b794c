//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `FACETWORK_*` environment variables, e.g. `FACETWORK_SESSION__USER`
//!    (`.env` is loaded first by `main`)
//! 3. Config file (`--config FILE`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FACETWORK";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where class descriptors come from.
    pub metamodel: MetamodelConfig,
    /// Who runs interaction checks.
    pub session: SessionConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetamodelConfig {
    /// Directory of class manifests used when a command gets no DIR.
    pub classes_dir: Option<PathBuf>,
    /// Fall back to the built-in demo domain when no directory is known.
    pub builtin_demo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub user: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            metamodel: MetamodelConfig {
                classes_dir: None,
                builtin_demo: true,
            },
            session: SessionConfig {
                user: "anonymous".into(),
                roles: Vec::new(),
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the config file, then environment.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let defaults = config::Config::try_from(&Self::default())
            .context("Failed to seed configuration defaults")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("session.roles")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Configuration has an unexpected shape")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.facetwork.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "facetwork", "facetwork")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".facetwork.toml"))
    }

    /// The class directory to use: an explicit one wins over the configured one.
    pub fn classes_dir<'a>(&'a self, explicit: Option<&'a Path>) -> Option<&'a Path> {
        explicit.or(self.metamodel.classes_dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_builtin_demo() {
        let cfg = AppConfig::default();
        assert!(cfg.metamodel.builtin_demo);
        assert!(cfg.metamodel.classes_dir.is_none());
        assert_eq!(cfg.session.user, "anonymous");
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("facetwork.toml");
        fs::write(
            &path,
            r#"
[metamodel]
classes_dir = "/srv/classes"

[session]
user = "sam"
roles = ["sales"]
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.metamodel.classes_dir, Some(PathBuf::from("/srv/classes")));
        assert!(cfg.metamodel.builtin_demo);
        assert_eq!(cfg.session.user, "sam");
        assert_eq!(cfg.session.roles, vec!["sales"]);
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_dir_wins() {
        let mut cfg = AppConfig::default();
        cfg.metamodel.classes_dir = Some(PathBuf::from("configured"));
        assert_eq!(cfg.classes_dir(None), Some(Path::new("configured")));
        assert_eq!(cfg.classes_dir(Some(Path::new("given"))), Some(Path::new("given")));
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
