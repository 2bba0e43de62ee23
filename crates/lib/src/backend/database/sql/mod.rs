//! Relational storage for users and feedback.
//!
//! [`SqlxBackend`] talks to SQLite (feature `sqlite`) or PostgreSQL (feature `postgres`)
//! through a single sqlx `AnyPool`. The tables carry the integrity rules themselves:
//! `UNIQUE` on username and email, and a foreign key from `feedback.username` to
//! `users.username` with `ON DELETE CASCADE`. Constraint failures reported by the driver
//! are turned back into [`UserError::DuplicateField`] and [`FeedbackError::OwnerNotFound`].
//!
//! Tables are created by [`schema::initialize`] every time a backend connects. The DDL
//! lives in code because the two dialects disagree on auto-increment columns.

mod storage;

pub mod schema;

use std::any::Any;

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::Executor;
use sqlx::any::AnyPoolOptions;

use crate::Result;
use crate::backend::Backend;
use crate::backend::errors::BackendError;
use crate::feedback::{Feedback, FeedbackError, FeedbackStore, FeedbackUpdate, NewFeedback};
use crate::user::{UniqueField, User, UserError, UserStore};

/// Adds context to sqlx failures while turning them into [`BackendError::SqlxError`].
pub(crate) trait SqlxResultExt<T> {
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// Which uniqueness constraint a failed insert hit, if any.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<UniqueField> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    // Postgres names the constraint (users_email_key); SQLite only puts the
    // column in the message (UNIQUE constraint failed: users.email)
    let hint = db_err
        .constraint()
        .map(str::to_string)
        .unwrap_or_else(|| db_err.message().to_string());
    if hint.contains("email") {
        Some(UniqueField::Email)
    } else {
        Some(UniqueField::Username)
    }
}

/// True if the driver rejected a row because its foreign key has no target.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

/// SQL dialect behind a [`SqlxBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
}

/// Users and feedback stored in SQLite or PostgreSQL.
///
/// Every constructor initializes the schema before returning. For PostgreSQL,
/// [`SqlxBackend::connect_postgres_isolated`] places the tables in a fresh schema so
/// parallel test runs cannot see each other's rows.
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
}

impl SqlxBackend {
    /// The underlying connection pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }

    pub fn is_postgres(&self) -> bool {
        self.kind == DbKind::Postgres
    }

    /// Connect to whichever database `url` names.
    ///
    /// `sqlite:` URLs open SQLite, `postgres://` and `postgresql://` URLs open PostgreSQL.
    /// Anything else fails with [`BackendError::UnsupportedUrl`], naming only the scheme
    /// so credentials never end up in an error message.
    pub async fn connect(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            #[cfg(feature = "sqlite")]
            "sqlite" => Self::connect_sqlite(url).await,
            #[cfg(feature = "postgres")]
            "postgres" | "postgresql" => Self::connect_postgres(url).await,
            _ => Err(BackendError::UnsupportedUrl {
                url: format!("{scheme}:..."),
            }
            .into()),
        }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn initialized(pool: AnyPool, kind: DbKind) -> Result<Self> {
        let backend = Self { pool, kind };
        schema::initialize(&backend).await?;
        Ok(backend)
    }
}

#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open (or create) the SQLite database file at `path`.
    ///
    /// ```ignore
    /// let backend = SqlxBackend::open_sqlite("data/feedback.db").await?;
    /// ```
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect to SQLite with a full sqlx URL such as `sqlite:./feedback.db?mode=rwc`.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let in_memory = url.contains("mode=memory");

        // Foreign keys and the sync level are per-connection settings; the cascade from
        // users to feedback depends on the former.
        let mut pool_options = AnyPoolOptions::new()
            .max_connections(5)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000; \
                         PRAGMA synchronous = NORMAL;",
                    )
                    .await?;
                    Ok(())
                })
            });
        if in_memory {
            // A shared in-memory database disappears with its last connection
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect(url)
            .await
            .sql_context("Failed to connect to SQLite")?;

        // The journal mode is stored in the database file, so once is enough
        if !in_memory {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await
                .sql_context("Failed to enable WAL")?;
        }

        Self::initialized(pool, DbKind::Sqlite).await
    }

    /// A private in-memory SQLite database that lives as long as the backend.
    pub async fn sqlite_in_memory() -> Result<Self> {
        // Shared cache so every pooled connection sees the same database, and a
        // unique name so separate backends never share one.
        let name = uuid::Uuid::new_v4();
        Self::connect_sqlite(&format!("sqlite:file:mem_{name}?mode=memory&cache=shared")).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to PostgreSQL, keeping the tables in the default schema.
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_in(url, None).await
    }

    /// Connect to PostgreSQL with the tables in a new, uniquely named schema.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        // Schema names must start with a letter
        let schema = format!("test_{}", uuid::Uuid::new_v4().simple());
        Self::connect_postgres_in(url, Some(schema)).await
    }

    async fn connect_postgres_in(url: &str, schema: Option<String>) -> Result<Self> {
        sqlx::any::install_default_drivers();

        if let Some(schema) = &schema {
            let setup = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
                .execute(&setup)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;
            setup.close().await;
        }

        let pool_options = match schema {
            // Isolated backends come in numbers and share one server
            Some(_) => AnyPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(std::time::Duration::from_secs(30)),
            None => AnyPoolOptions::new().max_connections(5),
        };

        // search_path is per connection, so it is set on every new one
        let pool = pool_options
            .after_connect(move |conn, _meta| {
                let schema = schema.clone();
                Box::pin(async move {
                    if let Some(schema) = schema {
                        conn.execute(format!("SET search_path TO {schema}").as_str())
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        Self::initialized(pool, DbKind::Postgres).await
    }
}

#[async_trait]
impl UserStore for SqlxBackend {
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
impl FeedbackStore for SqlxBackend {
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
        storage::count_feedback(self).await
    }
}

impl Backend for SqlxBackend {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn label(&self) -> &'static str {
        match self.kind {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    }
}

/// Map an insert error on `users` to the typed duplicate error when it is one.
pub(crate) fn map_user_insert_error(err: sqlx::Error) -> crate::Error {
    match unique_violation(&err) {
        Some(field) => UserError::DuplicateField { field }.into(),
        None => BackendError::SqlxError {
            reason: format!("Failed to insert user: {err}"),
            source: Some(err),
        }
        .into(),
    }
}

/// Map an insert error on `feedback` to the typed owner error when it is one.
pub(crate) fn map_feedback_insert_error(err: sqlx::Error, username: &str) -> crate::Error {
    if is_foreign_key_violation(&err) {
        FeedbackError::OwnerNotFound {
            username: username.to_string(),
        }
        .into()
    } else {
        BackendError::SqlxError {
            reason: format!("Failed to insert feedback: {err}"),
            source: Some(err),
        }
        .into()
    }
}

/// [`SqlxBackend`] opened on SQLite.
#[cfg(feature = "sqlite")]
pub type Sqlite = SqlxBackend;

/// [`SqlxBackend`] opened on PostgreSQL.
#[cfg(feature = "postgres")]
pub type Postgres = SqlxBackend;
