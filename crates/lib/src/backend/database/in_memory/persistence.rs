//! JSON snapshots of the InMemory state
//!
//! The file holds both maps plus the id counter, so ids stay unique across restarts.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, State};
use crate::{
    Error, Result, backend::errors::BackendError, feedback::Feedback, user::User,
};

/// Snapshot format version. Version 0 is still allowed to change incompatibly.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Refuse snapshots written in any other format version.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout of the InMemory state
#[derive(Serialize, Deserialize)]
struct SerializableDatabase {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    users: BTreeMap<String, User>,
    feedback: BTreeMap<i64, Feedback>,
    next_feedback_id: i64,
}

/// Write a pretty-printed snapshot to `path`.
pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let state = backend.state.read().await.clone();
    let serializable = SerializableDatabase {
        version: PERSISTENCE_VERSION,
        users: state.users,
        feedback: state.feedback,
        next_feedback_id: state.next_feedback_id,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Read a snapshot from `path`. A missing file yields an empty database; an unreadable
/// or malformed one is an error.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let database: SerializableDatabase = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            })?;
            let mut state = State {
                users: database.users,
                feedback: database.feedback,
                next_feedback_id: database.next_feedback_id,
            };

            // A hand-edited file may carry a stale counter; never hand out a used id
            let max_id = state.feedback.keys().next_back().copied().unwrap_or(0);
            if state.next_feedback_id <= max_id {
                tracing::warn!(
                    next_feedback_id = state.next_feedback_id,
                    max_id,
                    "Persisted feedback id counter is behind stored ids; advancing it"
                );
                state.next_feedback_id = max_id + 1;
            }

            Ok(InMemory {
                state: RwLock::new(state),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
