//! Error types for feedback records
use thiserror::Error;

/// Errors that can occur while creating, changing or loading feedback.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// No feedback with this id exists.
    #[error("Feedback not found: {id}")]
    FeedbackNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// The referenced owner does not exist.
    #[error("Feedback owner does not exist: {username}")]
    OwnerNotFound {
        /// The username the feedback pointed at
        username: String,
    },

    /// A required field was empty.
    #[error("Feedback {field} must not be empty")]
    EmptyField {
        /// Name of the empty field
        field: &'static str,
    },

    /// Title exceeds the column width.
    #[error("Feedback title is {len} characters, maximum is {max}")]
    TitleTooLong {
        /// Length of the rejected title, in characters
        len: usize,
        /// Allowed maximum
        max: usize,
    },
}

impl FeedbackError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FeedbackError::FeedbackNotFound { .. } | FeedbackError::OwnerNotFound { .. }
        )
    }

    /// Check if this error is caused by invalid field contents.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            FeedbackError::EmptyField { .. } | FeedbackError::TitleTooLong { .. }
        )
    }

    /// Get the feedback id if this error is about a specific record.
    pub fn feedback_id(&self) -> Option<i64> {
        match self {
            FeedbackError::FeedbackNotFound { id } => Some(*id),
            _ => None,
        }
    }
}

// Conversion from FeedbackError to the main Error type
impl From<FeedbackError> for crate::Error {
    fn from(err: FeedbackError) -> Self {
        crate::Error::Feedback(err)
    }
}
