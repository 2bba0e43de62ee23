//! Table definitions and the schema version check.
//!
//! Almost all DDL is portable between SQLite and Postgres. The feedback id column is
//! the exception, since each dialect spells auto-increment differently.
//!
//! The version stored in `schema_version` is compared with [`SCHEMA_VERSION`] on every
//! connect, and any database written with a different version is refused. Only one
//! schema version exists so far, so there is nothing to migrate from.

use crate::Result;
use crate::backend::errors::BackendError;

use super::{DbKind, SqlxBackend, SqlxResultExt};

/// Version of the tables this build creates.
pub const SCHEMA_VERSION: i64 = 1;

/// Tables shared by both dialects.
pub const CREATE_TABLES: &[&str] = &[
    // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // Passwords are Argon2id PHC strings, never plaintext
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY NOT NULL,
        password TEXT NOT NULL,
        email VARCHAR(50) NOT NULL UNIQUE,
        first_name VARCHAR(30) NOT NULL,
        last_name VARCHAR(30) NOT NULL
    )",
];

/// Feedback table for SQLite. AUTOINCREMENT keeps deleted ids from being reused.
const CREATE_FEEDBACK_SQLITE: &str = "CREATE TABLE IF NOT EXISTS feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(100) NOT NULL,
        content TEXT NOT NULL,
        username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE
    )";

/// Feedback table for PostgreSQL.
const CREATE_FEEDBACK_POSTGRES: &str = "CREATE TABLE IF NOT EXISTS feedback (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        content TEXT NOT NULL,
        username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE
    )";

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_feedback_username ON feedback(username)"];

/// The feedback table statement for a dialect.
pub fn create_feedback_table(kind: DbKind) -> &'static str {
    match kind {
        DbKind::Sqlite => CREATE_FEEDBACK_SQLITE,
        DbKind::Postgres => CREATE_FEEDBACK_POSTGRES,
    }
}

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist and records [`SCHEMA_VERSION`] in a
/// fresh database. Fails if the database carries any other version.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    let statements = CREATE_TABLES
        .iter()
        .copied()
        .chain(std::iter::once(create_feedback_table(backend.kind())));
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Schema creation failed - SQL: {statement}"))?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .sql_context("Failed to check schema version")?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .sql_context("Failed to initialize schema version")?;
        }
        Some((current_version,)) if current_version != SCHEMA_VERSION => {
            return Err(BackendError::StateInconsistency {
                reason: format!(
                    "database schema v{current_version} does not match supported v{SCHEMA_VERSION}"
                ),
            }
            .into());
        }
        Some(_) => {}
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .sql_context(&format!("Index creation failed - SQL: {statement}"))?;
    }

    Ok(())
}
