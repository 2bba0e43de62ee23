//! Storage backends for Feedback
//!
//! This module provides the [`Backend`] trait and its implementations, organized by
//! category under [`database`].
//!
//! A backend is the single source of truth for users and feedback. It enforces the
//! uniqueness of usernames and emails, refuses feedback whose owner does not exist and
//! removes a user's feedback together with the user. The [`crate::Service`] layer on top
//! adds hashing and authorization and never needs to know which backend it talks to.

use std::any::Any;

use crate::feedback::FeedbackStore;
use crate::user::UserStore;

pub mod database;
pub mod errors;

pub use database::InMemory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub use database::{DbKind, SqlxBackend};
pub use errors::BackendError;

/// Storage backend combining user and feedback persistence.
///
/// All backends must be `Send` and `Sync` to be shared across request handlers, and
/// implement `Any` so callers can downcast to reach backend-specific operations such as
/// [`InMemory::save_to_file`].
pub trait Backend: UserStore + FeedbackStore + Send + Sync + Any {
    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Short name used in logs and status output.
    fn label(&self) -> &'static str;
}
