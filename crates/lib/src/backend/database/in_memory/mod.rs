//! In-memory database backend implementation
//!
//! This module provides an in-memory implementation of the Backend trait,
//! suitable for testing, development, or single-process deployments that save
//! their state to a JSON file on shutdown.

mod persistence;
mod storage;

use std::any::Any;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::Backend;
use crate::feedback::{Feedback, FeedbackStore, FeedbackUpdate, NewFeedback};
use crate::user::{User, UserStore};

/// Everything the backend holds, guarded by a single lock so that uniqueness checks,
/// owner checks and cascades see one consistent view.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) users: BTreeMap<String, User>,
    pub(crate) feedback: BTreeMap<i64, Feedback>,
    /// Next id to hand out. Ids are never reused, even after deletes.
    pub(crate) next_feedback_id: i64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            feedback: BTreeMap::new(),
            next_feedback_id: 1,
        }
    }
}

/// A simple in-memory backend using ordered maps for storage.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the whole state to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) state: RwLock<State>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Saves the entire database state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the database state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` database is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` database or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl UserStore for InMemory {
    async fn insert_user(&self, user: &User) -> Result<()> {
        storage::insert_user(self, user).await
    }

    async fn get_user(&self, username: &str) -> Result<User> {
        storage::get_user(self, username).await
    }

    async fn delete_user(&self, username: &str) -> Result<()> {
        storage::delete_user(self, username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        storage::list_users(self).await
    }
}

#[async_trait]
impl FeedbackStore for InMemory {
    async fn create_feedback(&self, new: &NewFeedback) -> Result<Feedback> {
        storage::create_feedback(self, new).await
    }

    async fn update_feedback(&self, id: i64, update: &FeedbackUpdate) -> Result<Feedback> {
        storage::update_feedback(self, id, update).await
    }

    async fn delete_feedback(&self, id: i64) -> Result<()> {
        storage::delete_feedback(self, id).await
    }

    async fn get_feedback(&self, id: i64) -> Result<Feedback> {
        storage::get_feedback(self, id).await
    }

    async fn list_feedback_by_user(&self, username: &str) -> Result<Vec<Feedback>> {
        storage::list_feedback_by_user(self, username).await
    }

    async fn count_feedback(&self) -> Result<u64> {
        Ok(self.state.read().await.feedback.len() as u64)
    }
}

impl Backend for InMemory {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> &'static str {
        "inmemory"
    }
}
