//! Backend creation and utility functions.

use std::path::PathBuf;

use feedback::backend::{Backend as StorageBackend, InMemory, SqlxBackend};

use crate::cli::{Backend, BackendConfig};

/// File the SQLite backend stores into, relative to the data directory
pub const SQLITE_FILE: &str = "feedback.db";
/// File the in-memory backend persists to, relative to the data directory
pub const JSON_FILE: &str = "feedback.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Path of the JSON file used by the in-memory backend.
pub fn json_path(config: &BackendConfig) -> PathBuf {
    config.data_dir().join(JSON_FILE)
}

fn sqlite_url(config: &BackendConfig) -> Option<&str> {
    config
        .database_url
        .as_deref()
        .filter(|url| url.starts_with("sqlite:"))
}

/// Human-readable description of where the configured backend keeps its data
pub fn backend_label(config: &BackendConfig) -> String {
    match config.backend {
        Backend::Sqlite => match sqlite_url(config) {
            Some(url) => format!("sqlite ({url})"),
            None => format!("sqlite ({})", config.data_dir().join(SQLITE_FILE).display()),
        },
        Backend::Postgres => match &config.database_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        Backend::Inmemory => format!("inmemory ({})", json_path(config).display()),
    }
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<Box<dyn StorageBackend>, Box<dyn std::error::Error>> {
    let data_dir = config.data_dir();

    match config.backend {
        Backend::Sqlite => {
            if let Some(url) = sqlite_url(config) {
                tracing::info!("Using SQLite backend at {url}");
                return Ok(Box::new(SqlxBackend::connect(url).await?));
            }
            tokio::fs::create_dir_all(&data_dir).await?;
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Box::new(SqlxBackend::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config.database_url.as_ref().ok_or(
                "PostgreSQL backend requires --database-url or FEEDBACK_DATABASE_URL",
            )?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match SqlxBackend::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Box::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            tokio::fs::create_dir_all(&data_dir).await?;
            let json_path = json_path(config);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            // A missing file loads as an empty database; a corrupt one is an error
            let backend = InMemory::load_from_file(&json_path).await?;
            tracing::info!("Loaded {} users", backend.user_count().await);
            Ok(Box::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: Backend, database_url: Option<&str>) -> BackendConfig {
        BackendConfig {
            backend,
            data_dir: Some(PathBuf::from("/srv/feedback")),
            database_url: database_url.map(str::to_string),
        }
    }

    #[test]
    fn test_redact_postgres_url() {
        assert_eq!(
            redact_postgres_url("postgres://admin:hunter2@db:5432/feedback"),
            "postgres://***:***@db:5432/feedback"
        );
        assert_eq!(
            redact_postgres_url("postgres://db/feedback"),
            "postgres://db/feedback"
        );
        assert!(!redact_postgres_url("not a url hunter2").contains("hunter2"));
    }

    #[test]
    fn test_backend_label() {
        assert_eq!(
            backend_label(&config(Backend::Sqlite, None)),
            "sqlite (/srv/feedback/feedback.db)"
        );
        assert_eq!(
            backend_label(&config(Backend::Sqlite, Some("sqlite::memory:"))),
            "sqlite (sqlite::memory:)"
        );
        assert_eq!(
            backend_label(&config(Backend::Postgres, Some("postgres://u:p@db/f"))),
            "postgres (postgres://***:***@db/f)"
        );
        assert_eq!(
            backend_label(&config(Backend::Inmemory, None)),
            "inmemory (/srv/feedback/feedback.json)"
        );
    }

    #[tokio::test]
    async fn test_postgres_requires_url() {
        let err = create_backend(&config(Backend::Postgres, None))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("--database-url"));
    }

    #[tokio::test]
    async fn test_inmemory_starts_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = BackendConfig {
            backend: Backend::Inmemory,
            data_dir: Some(dir.path().to_path_buf()),
            database_url: None,
        };
        let backend = create_backend(&config).await.unwrap();
        assert_eq!(backend.label(), "inmemory");
    }
}
