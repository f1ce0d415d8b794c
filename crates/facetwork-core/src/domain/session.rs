//! Per-request session: who is asking, and the services checks may consult.
//!
//! A `Session` is created for one request and passed explicitly into every
//! interaction check. There is no ambient "current session".

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::domain::identifier::Identifier;

/// The user an interaction is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMemento {
    pub name: String,
    pub roles: Vec<String>,
}

impl UserMemento {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Gate for visibility and usability per user.
///
/// Implemented by:
/// - [`PermitAll`] (default)
/// - `facetwork_adapters::RoleTableAuthorizor`
#[cfg_attr(test, mockall::automock)]
pub trait Authorizor: Send + Sync {
    fn is_visible(&self, user: &UserMemento, identifier: &Identifier) -> bool;

    fn is_usable(&self, user: &UserMemento, identifier: &Identifier) -> bool;
}

/// Authorizor that allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl Authorizor for PermitAll {
    fn is_visible(&self, _user: &UserMemento, _identifier: &Identifier) -> bool {
        true
    }

    fn is_usable(&self, _user: &UserMemento, _identifier: &Identifier) -> bool {
        true
    }
}

/// Explicit dependency bundle for one request.
#[derive(Clone)]
pub struct Session {
    user: UserMemento,
    authorizor: Arc<dyn Authorizor>,
}

impl Session {
    pub fn new(user: UserMemento, authorizor: Arc<dyn Authorizor>) -> Self {
        Self { user, authorizor }
    }

    /// Session for `user` with everything permitted.
    pub fn permit_all(user: UserMemento) -> Self {
        Self::new(user, Arc::new(PermitAll))
    }

    pub fn user(&self) -> &UserMemento {
        &self.user
    }

    pub fn authorizor(&self) -> &dyn Authorizor {
        self.authorizor.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        let user = UserMemento::new("sven").with_role("clerk");
        assert!(user.has_role("clerk"));
        assert!(!user.has_role("admin"));
    }

    #[test]
    fn permit_all_session_allows() {
        let session = Session::permit_all(UserMemento::new("sven"));
        let id = Identifier::association("a.Order", "quantity");
        assert!(session.authorizor().is_visible(session.user(), &id));
        assert!(session.authorizor().is_usable(session.user(), &id));
    }
}
