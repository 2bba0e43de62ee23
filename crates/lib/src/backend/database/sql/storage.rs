//! Record operations for SQL backends.
//!
//! This module implements the user and feedback CRUD operations using sqlx.

use crate::Result;
use crate::feedback::{Feedback, FeedbackError, FeedbackUpdate, NewFeedback};
use crate::user::{User, UserError};

use super::{SqlxBackend, SqlxResultExt, map_feedback_insert_error, map_user_insert_error};

type UserRow = (String, String, String, String, String);
type FeedbackRow = (i64, String, String, String);

fn user_from_row(
    (username, password_hash, email, first_name, last_name): UserRow,
) -> User {
    User {
        username,
        password_hash,
        email,
        first_name,
        last_name,
    }
}

fn feedback_from_row((id, title, content, username): FeedbackRow) -> Feedback {
    Feedback {
        id,
        title,
        content,
        username,
    }
}

/// Insert a user. Constraint violations become `UserError::DuplicateField`.
pub async fn insert_user(backend: &SqlxBackend, user: &User) -> Result<()> {
    sqlx::query(
        "INSERT INTO users (username, password, email, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .execute(backend.pool())
    .await
    .map_err(map_user_insert_error)?;

    Ok(())
}

/// Get a user by username.
pub async fn get_user(backend: &SqlxBackend, username: &str) -> Result<User> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT username, password, email, first_name, last_name FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(backend.pool())
    .await
    .sql_context("Failed to get user")?;

    row.map(user_from_row).ok_or_else(|| {
        UserError::UserNotFound {
            username: username.to_string(),
        }
        .into()
    })
}

/// Delete a user. The foreign key removes the user's feedback in the same statement.
pub async fn delete_user(backend: &SqlxBackend, username: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete user")?;

    if result.rows_affected() == 0 {
        return Err(UserError::UserNotFound {
            username: username.to_string(),
        }
        .into());
    }
    Ok(())
}

/// All users, ordered by username.
pub async fn list_users(backend: &SqlxBackend) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT username, password, email, first_name, last_name FROM users ORDER BY username",
    )
    .fetch_all(backend.pool())
    .await
    .sql_context("Failed to list users")?;

    Ok(rows.into_iter().map(user_from_row).collect())
}

/// Insert a feedback item and return it with its assigned id.
pub async fn create_feedback(backend: &SqlxBackend, new: &NewFeedback) -> Result<Feedback> {
    new.validate()?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO feedback (title, content, username) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&new.title)
    .bind(&new.content)
    .bind(&new.username)
    .fetch_one(backend.pool())
    .await
    .map_err(|e| map_feedback_insert_error(e, &new.username))?;

    Ok(Feedback {
        id,
        title: new.title.clone(),
        content: new.content.clone(),
        username: new.username.clone(),
    })
}

/// Apply a partial update inside a transaction and return the stored row.
pub async fn update_feedback(
    backend: &SqlxBackend,
    id: i64,
    update: &FeedbackUpdate,
) -> Result<Feedback> {
    update.validate()?;

    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let row: Option<FeedbackRow> =
        sqlx::query_as("SELECT id, title, content, username FROM feedback WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .sql_context("Failed to load feedback for update")?;

    let mut feedback = row
        .map(feedback_from_row)
        .ok_or(FeedbackError::FeedbackNotFound { id })?;
    update.apply_to(&mut feedback);

    sqlx::query("UPDATE feedback SET title = $1, content = $2 WHERE id = $3")
        .bind(&feedback.title)
        .bind(&feedback.content)
        .bind(id)
        .execute(&mut *tx)
        .await
        .sql_context("Failed to update feedback")?;

    tx.commit().await.sql_context("Failed to commit update")?;

    Ok(feedback)
}

/// Delete a feedback item by id.
pub async fn delete_feedback(backend: &SqlxBackend, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM feedback WHERE id = $1")
        .bind(id)
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete feedback")?;

    if result.rows_affected() == 0 {
        return Err(FeedbackError::FeedbackNotFound { id }.into());
    }
    Ok(())
}

/// Get a feedback item by id.
pub async fn get_feedback(backend: &SqlxBackend, id: i64) -> Result<Feedback> {
    let row: Option<FeedbackRow> =
        sqlx::query_as("SELECT id, title, content, username FROM feedback WHERE id = $1")
            .bind(id)
            .fetch_optional(backend.pool())
            .await
            .sql_context("Failed to get feedback")?;

    row.map(feedback_from_row)
        .ok_or_else(|| FeedbackError::FeedbackNotFound { id }.into())
}

/// Feedback owned by `username`, oldest first.
pub async fn list_feedback_by_user(backend: &SqlxBackend, username: &str) -> Result<Vec<Feedback>> {
    let rows: Vec<FeedbackRow> = sqlx::query_as(
        "SELECT id, title, content, username FROM feedback WHERE username = $1 ORDER BY id",
    )
    .bind(username)
    .fetch_all(backend.pool())
    .await
    .sql_context("Failed to list feedback")?;

    Ok(rows.into_iter().map(feedback_from_row).collect())
}

/// Total number of feedback rows.
pub async fn count_feedback(backend: &SqlxBackend) -> Result<u64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedback")
        .fetch_one(backend.pool())
        .await
        .sql_context("Failed to count feedback")?;

    Ok(count.max(0) as u64)
}
