//! Command handlers.
//!
//! Each handler translates parsed arguments into calls on the metamodel and
//! renders the result through [`OutputManager`](crate::output::OutputManager).

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{info, instrument};

use facetwork_adapters::{ClassManifestLoader, InMemoryClassRegistry, RoleTableAuthorizor, builtin_domain};
use facetwork_core::{
    application::SpecificationLoader,
    domain::{Authorizor, ProgrammingModel, Session, UserMemento},
};

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod check;
pub mod completions;
pub mod config;
pub mod inspect;
pub mod list;
pub mod validate;

/// Where the class descriptors of a run came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    BuiltinDemo,
    Directory(PathBuf),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BuiltinDemo => f.write_str("built-in demo domain"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// A specification loader plus the role table that goes with its classes.
pub struct Metamodel {
    pub loader: Arc<SpecificationLoader>,
    pub authorizor: Arc<dyn Authorizor>,
    pub origin: Origin,
}

impl Metamodel {
    /// Resolve the class source for this run.
    ///
    /// An explicit directory wins, then `metamodel.classes_dir`, then the
    /// built-in demo if `metamodel.builtin_demo` allows it.
    #[instrument(skip(config))]
    pub fn open(dir: Option<&Path>, config: &AppConfig) -> CliResult<Self> {
        let (registry, authorizor, origin): (InMemoryClassRegistry, Arc<dyn Authorizor>, Origin) =
            match config.classes_dir(dir) {
                Some(dir) => {
                    let registry = ClassManifestLoader::new(dir).load_registry()?;
                    let authorizor = RoleTableAuthorizor::load_from_dir(dir)?;
                    (registry, Arc::new(authorizor), Origin::Directory(dir.to_path_buf()))
                }
                None if config.metamodel.builtin_demo => (
                    InMemoryClassRegistry::with_builtin()?,
                    Arc::new(builtin_domain::authorizor()),
                    Origin::BuiltinDemo,
                ),
                None => return Err(CliError::NoClassSource),
            };

        info!(%origin, classes = registry.len(), "class source ready");
        let loader = SpecificationLoader::new(Arc::new(registry), Arc::new(ProgrammingModel::with_defaults()));
        Ok(Self {
            loader: Arc::new(loader),
            authorizor,
            origin,
        })
    }

    /// Session for `user` holding `roles`, checked against this run's role table.
    pub fn session(&self, user: &str, roles: &[String]) -> Session {
        let memento = roles
            .iter()
            .fold(UserMemento::new(user), |memento, role| memento.with_role(role.as_str()));
        Session::new(memento, Arc::clone(&self.authorizor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetwork_core::domain::{Identifier, InteractionInitiatedBy, ObjectAdapter, Where};

    #[test]
    fn demo_used_without_directory() {
        let metamodel = Metamodel::open(None, &AppConfig::default()).unwrap();
        assert_eq!(metamodel.origin, Origin::BuiltinDemo);
        assert_eq!(metamodel.loader.init_metamodel().unwrap().len(), 3);
    }

    #[test]
    fn demo_can_be_disabled() {
        let mut config = AppConfig::default();
        config.metamodel.builtin_demo = false;
        assert!(matches!(Metamodel::open(None, &config), Err(CliError::NoClassSource)));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = Metamodel::open(Some(Path::new("/definitely/not/here")), &AppConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn session_uses_demo_role_table() {
        let metamodel = Metamodel::open(None, &AppConfig::default()).unwrap();
        let email = Identifier::association(builtin_domain::CUSTOMER, "email");

        let guest = metamodel.session("guest", &[]);
        assert!(!guest.authorizor().is_visible(guest.user(), &email));

        let sales = metamodel.session("sam", &["sales".to_string()]);
        assert!(sales.authorizor().is_visible(sales.user(), &email));

        let customer = metamodel.loader.load_specification(builtin_domain::CUSTOMER).unwrap();
        let target = ObjectAdapter::persistent(builtin_domain::CUSTOMER, "c-1");
        let verdict = customer
            .property("email")
            .unwrap()
            .is_visible(&target, &guest, InteractionInitiatedBy::User, Where::Anywhere)
            .unwrap();
        assert!(verdict.is_vetoed());
    }
}
