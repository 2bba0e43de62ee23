//! User accounts
//!
//! A [`User`] is keyed by its username and carries an Argon2id digest instead of a
//! password. Storage backends implement [`UserStore`]; registration and login go through
//! [`crate::Service`], which owns the hashing step.

pub mod errors;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use errors::UserError;

/// A registered account as persisted in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key, immutable after creation
    pub username: String,
    /// Argon2id digest in PHC format
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// First and last name joined with a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration data that has passed form validation.
///
/// The password is still plaintext here; [`crate::Service::register`] hashes it before
/// anything reaches a backend.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Column protected by a uniqueness constraint on `users`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

/// Why a login attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    UnknownUser,
    WrongPassword,
}

/// Persistence contract for user accounts.
///
/// Implementations enforce username and email uniqueness atomically, and deleting a user
/// removes every feedback row that references it.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user.
    ///
    /// Fails with [`UserError::DuplicateField`] if the username or the email is taken.
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Load a user by username.
    async fn get_user(&self, username: &str) -> Result<User>;

    /// Delete a user and, by cascade, all of its feedback.
    async fn delete_user(&self, username: &str) -> Result<()>;

    /// All users ordered by username.
    async fn list_users(&self) -> Result<Vec<User>>;
}
