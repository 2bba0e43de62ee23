//! Request identity and the ownership rule
//!
//! Every request is evaluated with an [`Identity`] derived from its session. A resource
//! owned by `u` may be viewed privately or changed only when the identity is
//! `AuthenticatedAs(u)`. Nothing here is persisted.

pub mod errors;

pub use errors::AuthError;

use crate::Result;

/// Who is making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No session, or a session for a user that no longer exists
    #[default]
    Anonymous,
    /// A session naming an existing user
    AuthenticatedAs(String),
}

impl Identity {
    pub fn authenticated(username: impl Into<String>) -> Self {
        Identity::AuthenticatedAs(username.into())
    }

    /// The session username, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::AuthenticatedAs(username) => Some(username),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::AuthenticatedAs(_))
    }

    /// True iff this identity is exactly `username`.
    pub fn is(&self, username: &str) -> bool {
        self.username() == Some(username)
    }

    /// The session username, or `Unauthorized` for an anonymous caller.
    ///
    /// Used before looking a resource up, so anonymous callers learn nothing about
    /// which resources exist. The refusal names no owner.
    pub fn require_user(&self) -> Result<&str> {
        self.username().ok_or_else(|| {
            AuthError::Unauthorized {
                owner: String::new(),
            }
            .into()
        })
    }

    /// Permit an action on a resource owned by `owner`.
    pub fn authorize(&self, owner: &str) -> Result<()> {
        if self.is(owner) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                owner: owner.to_string(),
            }
            .into())
        }
    }
}
