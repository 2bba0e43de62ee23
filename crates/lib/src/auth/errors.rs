//! Authorization error types.

use thiserror::Error;

use crate::Error;

/// Errors produced by the ownership policy.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request identity does not own the resource.
    #[error("Not authorized to act on resources owned by {owner}")]
    Unauthorized {
        /// Username owning the resource
        owner: String,
    },
}

impl AuthError {
    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AuthError::Unauthorized { .. })
    }

    /// The owner of the resource that was refused.
    pub fn owner(&self) -> Option<&str> {
        match self {
            AuthError::Unauthorized { owner } => Some(owner),
        }
    }
}

// Conversion from AuthError to the main Error type
impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
