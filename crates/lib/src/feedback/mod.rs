//! Feedback records
//!
//! Each [`Feedback`] belongs to exactly one user through its `username` column. Ids are
//! assigned by the backend and never reused. Backends implement [`FeedbackStore`] and must
//! refuse records whose owner does not exist.

pub mod errors;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, constants::TITLE_MAX_LEN};

pub use errors::FeedbackError;

/// A stored feedback item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Owning user
    pub username: String,
}

/// A feedback item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub title: String,
    pub content: String,
    pub username: String,
}

impl NewFeedback {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            username: username.into(),
        }
    }

    /// Check field contents before they reach storage.
    pub fn validate(&self) -> Result<()> {
        check_title(&self.title)?;
        if self.content.is_empty() {
            return Err(FeedbackError::EmptyField { field: "content" }.into());
        }
        Ok(())
    }
}

/// Partial update of a feedback item. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl FeedbackUpdate {
    /// Update only the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// Update only the content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// True when applying this update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Check the fields that are present.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(content) = &self.content
            && content.is_empty()
        {
            return Err(FeedbackError::EmptyField { field: "content" }.into());
        }
        Ok(())
    }

    /// Overwrite the present fields of `feedback`.
    pub fn apply_to(&self, feedback: &mut Feedback) {
        if let Some(title) = &self.title {
            feedback.title = title.clone();
        }
        if let Some(content) = &self.content {
            feedback.content = content.clone();
        }
    }
}

fn check_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(FeedbackError::EmptyField { field: "title" }.into());
    }
    let len = title.chars().count();
    if len > TITLE_MAX_LEN {
        return Err(FeedbackError::TitleTooLong {
            len,
            max: TITLE_MAX_LEN,
        }
        .into());
    }
    Ok(())
}

/// Persistence contract for feedback items.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Store a new item and return it with its assigned id.
    ///
    /// Fails with [`FeedbackError::OwnerNotFound`] if `username` does not reference a user.
    async fn create_feedback(&self, new: &NewFeedback) -> Result<Feedback>;

    /// Apply a partial update and return the stored result.
    async fn update_feedback(&self, id: i64, update: &FeedbackUpdate) -> Result<Feedback>;

    /// Remove an item.
    async fn delete_feedback(&self, id: i64) -> Result<()>;

    /// Load an item by id.
    async fn get_feedback(&self, id: i64) -> Result<Feedback>;

    /// All items owned by `username`, oldest first.
    async fn list_feedback_by_user(&self, username: &str) -> Result<Vec<Feedback>>;

    /// Total number of stored items.
    async fn count_feedback(&self) -> Result<u64>;
}
