//! Error types for the user system
use thiserror::Error;

use super::UniqueField;

/// Errors that can occur while registering, loading or deleting users.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UserError {
    /// No user with this username exists.
    #[error("User not found: {username}")]
    UserNotFound {
        /// The username that was looked up
        username: String,
    },

    /// Registration collided with an existing username or email.
    #[error("Duplicate {field}: already registered")]
    DuplicateField {
        /// Which unique column collided
        field: UniqueField,
    },

    /// Argon2 refused to hash the password.
    #[error("Password hashing failed: {reason}")]
    PasswordHashFailed {
        /// Description from the hashing library
        reason: String,
    },
}

impl UserError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::UserNotFound { .. })
    }

    /// Check if this error indicates a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, UserError::DuplicateField { .. })
    }

    /// Get the username if this error is about a specific user.
    pub fn username(&self) -> Option<&str> {
        match self {
            UserError::UserNotFound { username } => Some(username),
            _ => None,
        }
    }
}

// Conversion from UserError to the main Error type
impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = UserError::UserNotFound {
            username: "alice".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.username(), Some("alice"));

        let err = UserError::DuplicateField {
            field: UniqueField::Email,
        };
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Duplicate email: already registered");
    }

    #[test]
    fn test_conversion_keeps_classification() {
        let err: crate::Error = UserError::DuplicateField {
            field: UniqueField::Username,
        }
        .into();
        assert!(err.is_conflict());
        assert_eq!(err.duplicate_field(), Some(UniqueField::Username));
        assert_eq!(err.module(), "user");
    }
}
