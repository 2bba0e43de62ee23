//! Storage error types for the Feedback backends.
//!
//! Logical failures (missing user, duplicate email, unknown owner) are reported through
//! the user and feedback error types. This module covers failures of the storage layer
//! itself: driver errors, file I/O and persistence encoding.

use thiserror::Error;

/// Errors that can occur inside a storage backend.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// The SQL driver reported an error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context and driver message
        reason: String,
        /// The underlying driver error, if any
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The database URL scheme is not one this build can open.
    #[error("Unsupported database URL: {url}")]
    UnsupportedUrl {
        /// The rejected URL, with credentials redacted
        url: String,
    },

    /// Stored data is not what the schema promises.
    #[error("Database state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the inconsistency
        reason: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error came from the SQL driver.
    pub fn is_sql_error(&self) -> bool {
        #[cfg(any(feature = "sqlite", feature = "postgres"))]
        if matches!(self, BackendError::SqlxError { .. }) {
            return true;
        }
        false
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = BackendError::FileIo {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test"),
        };
        assert!(err.is_io_error());
        assert!(!err.is_sql_error());

        let err = BackendError::StateInconsistency {
            reason: "test".to_string(),
        };
        assert!(!err.is_io_error());
    }

    #[test]
    fn test_error_conversion() {
        let err: crate::Error = BackendError::UnsupportedUrl {
            url: "mysql://localhost".to_string(),
        }
        .into();
        assert!(err.is_database_error());
        assert_eq!(err.module(), "backend");
        match err {
            crate::Error::Backend(BackendError::UnsupportedUrl { url }) => {
                assert_eq!(url, "mysql://localhost")
            }
            _ => panic!("Unexpected error variant"),
        }
    }
}
