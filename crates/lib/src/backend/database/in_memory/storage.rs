//! Record operations for the InMemory backend.
//!
//! Every write takes the state lock once and performs its checks and its change under
//! that same guard.

use super::InMemory;
use crate::Result;
use crate::feedback::{Feedback, FeedbackError, FeedbackUpdate, NewFeedback};
use crate::user::{UniqueField, User, UserError};

pub(crate) async fn insert_user(backend: &InMemory, user: &User) -> Result<()> {
    let mut state = backend.state.write().await;

    if state.users.contains_key(&user.username) {
        return Err(UserError::DuplicateField {
            field: UniqueField::Username,
        }
        .into());
    }
    if state.users.values().any(|u| u.email == user.email) {
        return Err(UserError::DuplicateField {
            field: UniqueField::Email,
        }
        .into());
    }

    state.users.insert(user.username.clone(), user.clone());
    Ok(())
}

pub(crate) async fn get_user(backend: &InMemory, username: &str) -> Result<User> {
    let state = backend.state.read().await;
    state.users.get(username).cloned().ok_or_else(|| {
        UserError::UserNotFound {
            username: username.to_string(),
        }
        .into()
    })
}

pub(crate) async fn delete_user(backend: &InMemory, username: &str) -> Result<()> {
    let mut state = backend.state.write().await;

    if state.users.remove(username).is_none() {
        return Err(UserError::UserNotFound {
            username: username.to_string(),
        }
        .into());
    }
    state.feedback.retain(|_, f| f.username != username);
    Ok(())
}

pub(crate) async fn list_users(backend: &InMemory) -> Result<Vec<User>> {
    let state = backend.state.read().await;
    Ok(state.users.values().cloned().collect())
}

pub(crate) async fn create_feedback(backend: &InMemory, new: &NewFeedback) -> Result<Feedback> {
    new.validate()?;

    let mut state = backend.state.write().await;
    if !state.users.contains_key(&new.username) {
        return Err(FeedbackError::OwnerNotFound {
            username: new.username.clone(),
        }
        .into());
    }

    let id = state.next_feedback_id;
    state.next_feedback_id += 1;

    let feedback = Feedback {
        id,
        title: new.title.clone(),
        content: new.content.clone(),
        username: new.username.clone(),
    };
    state.feedback.insert(id, feedback.clone());
    Ok(feedback)
}

pub(crate) async fn update_feedback(
    backend: &InMemory,
    id: i64,
    update: &FeedbackUpdate,
) -> Result<Feedback> {
    update.validate()?;

    let mut state = backend.state.write().await;
    let feedback = state
        .feedback
        .get_mut(&id)
        .ok_or(FeedbackError::FeedbackNotFound { id })?;
    update.apply_to(feedback);
    Ok(feedback.clone())
}

pub(crate) async fn delete_feedback(backend: &InMemory, id: i64) -> Result<()> {
    let mut state = backend.state.write().await;
    match state.feedback.remove(&id) {
        Some(_) => Ok(()),
        None => Err(FeedbackError::FeedbackNotFound { id }.into()),
    }
}

pub(crate) async fn get_feedback(backend: &InMemory, id: i64) -> Result<Feedback> {
    let state = backend.state.read().await;
    state
        .feedback
        .get(&id)
        .cloned()
        .ok_or_else(|| FeedbackError::FeedbackNotFound { id }.into())
}

pub(crate) async fn list_feedback_by_user(
    backend: &InMemory,
    username: &str,
) -> Result<Vec<Feedback>> {
    let state = backend.state.read().await;
    // BTreeMap iteration is in id order, which is creation order
    Ok(state
        .feedback
        .values()
        .filter(|f| f.username == username)
        .cloned()
        .collect())
}
