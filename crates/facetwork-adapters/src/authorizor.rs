//! Role-based authorization.
//!
//! A [`RoleTableAuthorizor`] grants view or edit access per member to users
//! holding a role. Members no rule mentions are open to everyone.
//!
//! # `authorization.toml` format
//!
//! ```toml
//! [[rules]]
//! member     = "com.acme.Customer#email"   # identifier prefix, or "*"
//! role       = "sales"
//! permission = "view"                       # view | edit
//! ```
//!
//! An `edit` grant implies `view`.

use std::{fs, path::Path};

use serde::Deserialize;
use tracing::{debug, trace};

use facetwork_core::domain::{Authorizor, Identifier, UserMemento};

use crate::error::ManifestError;

/// File name of the role table inside a class directory.
pub const AUTHORIZATION_FILE: &str = "authorization.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleRule {
    pub member: String,
    pub role: String,
    pub permission: Permission,
}

impl RoleRule {
    fn covers(&self, identifier: &str) -> bool {
        self.member == "*" || identifier.starts_with(&self.member)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RoleTable {
    #[serde(default)]
    rules: Vec<RoleRule>,
}

/// Authorizor backed by a table of role grants.
#[derive(Debug, Clone, Default)]
pub struct RoleTableAuthorizor {
    rules: Vec<RoleRule>,
}

impl RoleTableAuthorizor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, member: impl Into<String>, role: impl Into<String>, permission: Permission) -> Self {
        self.rules.push(RoleRule {
            member: member.into(),
            role: role.into(),
            permission,
        });
        self
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    /// Parse a role table.
    pub fn from_toml(raw: &str) -> Result<Self, ManifestError> {
        let table: RoleTable = toml::from_str(raw).map_err(|e| ManifestError::Parse {
            path: AUTHORIZATION_FILE.into(),
            message: e.to_string(),
        })?;
        Ok(Self { rules: table.rules })
    }

    /// Load `authorization.toml` from `dir`, or an empty table if absent.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(AUTHORIZATION_FILE);
        if !path.is_file() {
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        let authorizor = Self::from_toml(&raw).map_err(|e| match e {
            ManifestError::Parse { message, .. } => ManifestError::Parse { path, message },
            other => other,
        })?;
        debug!(rules = authorizor.rules.len(), "loaded role table");
        Ok(authorizor)
    }

    fn permits(&self, user: &UserMemento, identifier: &Identifier, needed: Permission) -> bool {
        let identifier = identifier.to_string();
        let mut covering = self.rules.iter().filter(|r| r.covers(&identifier)).peekable();
        if covering.peek().is_none() {
            return true;
        }
        let granted = covering.any(|rule| {
            user.has_role(&rule.role) && (needed == Permission::View || rule.permission == Permission::Edit)
        });
        trace!(user = %user.name, %identifier, ?needed, granted, "role table consulted");
        granted
    }
}

impl Authorizor for RoleTableAuthorizor {
    fn is_visible(&self, user: &UserMemento, identifier: &Identifier) -> bool {
        self.permits(user, identifier, Permission::View)
    }

    fn is_usable(&self, user: &UserMemento, identifier: &Identifier) -> bool {
        self.permits(user, identifier, Permission::Edit)
    }
}
