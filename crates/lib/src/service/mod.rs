//! The `Service` facade
//!
//! `Service` ties a storage [`Backend`] to password hashing and the ownership rule. Every
//! operation that touches a user's private data takes the caller's [`Identity`] and checks
//! it here, so request handlers cannot forget the check.
//!
//! `Service` is a cheap-to-clone handle; clones share the same backend.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    Feedback, FeedbackUpdate, Identity, LoginFailure, NewFeedback, NewUser, Result, User,
    auth::AuthError,
    backend::Backend,
    feedback::FeedbackStore,
    password::{hash_password, verify_password},
    user::UserStore,
};


/// A user together with the feedback they own, as shown on their private page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    pub user: User,
    pub feedback: Vec<Feedback>,
}

/// Handle to the application's storage and rules.
#[derive(Clone)]
pub struct Service {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("backend", &self.backend.label())
            .finish()
    }
}

impl Service {
    /// Wrap a backend.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend: Arc::from(backend),
        }
    }

    /// The backend this service stores into.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Hash the password and store a new user.
    ///
    /// Fails with `UserError::DuplicateField` when the username or email is taken, in
    /// which case nothing is stored.
    pub async fn register(&self, new: NewUser) -> Result<User> {
        let user = User {
            password_hash: hash_password(&new.password)?,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
        };

        self.backend.insert_user(&user).await?;
        info!(username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// Returns `None` for an unknown user and for a wrong password alike.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = match self.backend.get_user(username).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                warn!(username, "Login failed: unknown user");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            warn!(username, "Login failed: wrong password");
            Ok(None)
        }
    }

    /// Explain a failed login. Only meaningful after `authenticate` returned `None`.
    pub async fn login_failure(&self, username: &str) -> Result<LoginFailure> {
        match self.backend.get_user(username).await {
            Ok(_) => Ok(LoginFailure::WrongPassword),
            Err(e) if e.is_not_found() => Ok(LoginFailure::UnknownUser),
            Err(e) => Err(e),
        }
    }

    /// Load a user without any ownership check.
    pub async fn get_user(&self, username: &str) -> Result<User> {
        self.backend.get_user(username).await
    }

    /// Resolve the username stored in a session into an identity.
    ///
    /// A session naming a user that no longer exists is anonymous.
    pub async fn identify(&self, session_user: Option<&str>) -> Result<Identity> {
        let Some(username) = session_user else {
            return Ok(Identity::Anonymous);
        };
        match self.backend.get_user(username).await {
            Ok(user) => Ok(Identity::AuthenticatedAs(user.username)),
            Err(e) if e.is_not_found() => Ok(Identity::Anonymous),
            Err(e) => Err(e),
        }
    }

    /// The private page of `username`, visible to that user only.
    pub async fn user_page(&self, identity: &Identity, username: &str) -> Result<UserPage> {
        identity.authorize(username)?;
        let user = self.backend.get_user(username).await?;
        let feedback = self.backend.list_feedback_by_user(username).await?;
        Ok(UserPage { user, feedback })
    }

    /// Delete `username` and everything it owns. Only the user may delete itself.
    pub async fn delete_user(&self, identity: &Identity, username: &str) -> Result<()> {
        identity.authorize(username)?;
        self.backend.delete_user(username).await?;
        info!(username, "Deleted user");
        Ok(())
    }

    /// Add feedback to `username`'s board.
    pub async fn create_feedback(
        &self,
        identity: &Identity,
        username: &str,
        title: &str,
        content: &str,
    ) -> Result<Feedback> {
        identity.authorize(username)?;
        let feedback = self
            .backend
            .create_feedback(&NewFeedback::new(title, content, username))
            .await?;
        info!(id = feedback.id, username, "Created feedback");
        Ok(feedback)
    }

    /// Load a feedback item for its edit form.
    ///
    /// Anonymous callers are refused before the lookup, so they cannot discover which ids
    /// exist.
    pub async fn feedback_for_edit(&self, identity: &Identity, id: i64) -> Result<Feedback> {
        let username = identity.require_user()?;
        let feedback = self.backend.get_feedback(id).await?;
        if feedback.username != username {
            return Err(AuthError::Unauthorized {
                owner: feedback.username,
            }
            .into());
        }
        Ok(feedback)
    }

    /// Change a feedback item. The check is against the item's owner.
    pub async fn update_feedback(
        &self,
        identity: &Identity,
        id: i64,
        update: &FeedbackUpdate,
    ) -> Result<Feedback> {
        identity.require_user()?;
        let existing = self.backend.get_feedback(id).await?;
        identity.authorize(&existing.username)?;
        let feedback = self.backend.update_feedback(id, update).await?;
        info!(id, username = %feedback.username, "Updated feedback");
        Ok(feedback)
    }

    /// Delete a feedback item and return what was removed.
    ///
    /// The check is against the item's owner. A refusal of a logged-in user carries that
    /// owner in `AuthError::Unauthorized` so callers can send the visitor back to the
    /// right page. Anonymous callers are refused before the lookup, with no owner.
    pub async fn delete_feedback(&self, identity: &Identity, id: i64) -> Result<Feedback> {
        identity.require_user()?;
        let feedback = self.backend.get_feedback(id).await?;
        identity.authorize(&feedback.username)?;
        self.backend.delete_feedback(id).await?;
        info!(id, username = %feedback.username, "Deleted feedback");
        Ok(feedback)
    }

    /// Load a feedback item without any ownership check.
    pub async fn get_feedback(&self, id: i64) -> Result<Feedback> {
        self.backend.get_feedback(id).await
    }

    /// Feedback owned by `username`, oldest first, without any ownership check.
    pub async fn list_feedback(&self, username: &str) -> Result<Vec<Feedback>> {
        self.backend.list_feedback_by_user(username).await
    }

    /// All users ordered by username.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.backend.list_users().await
    }

    /// Total number of feedback items.
    pub async fn count_feedback(&self) -> Result<u64> {
        self.backend.count_feedback().await
    }
}
