//!
//! Feedback: user accounts that each own a private board of feedback items.
//! This library provides the domain model, storage backends, and the authorization
//! rules used by the `feedback` web server.
//!
//! ## Core Concepts
//!
//! * **Users (`user::User`)**: Accounts keyed by a unique username, with a unique email and an
//!   Argon2id password digest. Plaintext passwords are never stored.
//! * **Feedback (`feedback::Feedback`)**: Titled notes with an auto-assigned id, owned by exactly
//!   one user. Deleting a user deletes everything they own.
//! * **Backends (`backend::Backend`)**: Pluggable storage implementing both `UserStore` and
//!   `FeedbackStore`:
//!     * **InMemory (`backend::InMemory`)**: Lock-protected maps with optional JSON persistence.
//!     * **SqlxBackend (`backend::SqlxBackend`)**: SQLite or PostgreSQL through sqlx, relying on
//!       UNIQUE and FOREIGN KEY ... ON DELETE CASCADE constraints.
//! * **Identity (`auth::Identity`)**: Who is making a request, derived fresh for every request.
//!   Only `AuthenticatedAs(owner)` may view or change resources belonging to `owner`.
//! * **Service (`service::Service`)**: Cheap-to-clone facade tying the backend, password hashing
//!   and the authorization policy together.
//! * **Forms (`forms`)**: Validation and normalization of submitted form data.

pub mod auth;
pub mod backend;
pub mod constants;
pub mod feedback;
pub mod forms;
pub mod password;
pub mod service;
pub mod user;

pub use auth::Identity;
pub use feedback::{Feedback, FeedbackUpdate, NewFeedback};
pub use service::{Service, UserPage};
pub use user::{LoginFailure, NewUser, UniqueField, User};

/// Result type used throughout the Feedback library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Feedback library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured authorization errors from the auth module
    #[error(transparent)]
    Auth(auth::AuthError),

    /// Structured user errors from the user module
    #[error(transparent)]
    User(user::UserError),

    /// Structured feedback errors from the feedback module
    #[error(transparent)]
    Feedback(feedback::FeedbackError),

    /// Rejected form submissions from the forms module
    #[error(transparent)]
    Validation(forms::ValidationErrors),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Auth(_) => "auth",
            Error::User(_) => "user",
            Error::Feedback(_) => "feedback",
            Error::Validation(_) => "forms",
            Error::Backend(_) => "backend",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_not_found(),
            Error::Feedback(feedback_err) => feedback_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Auth(auth_err) => auth_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Validation(_) => true,
            Error::Feedback(feedback_err) => feedback_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related, including unreadable snapshot files.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// The field that collided when a registration hit a uniqueness constraint.
    pub fn duplicate_field(&self) -> Option<UniqueField> {
        match self {
            Error::User(user::UserError::DuplicateField { field }) => Some(*field),
            _ => None,
        }
    }
}
