use feedback::{
    Identity, NewUser, Service, User,
    backend::{Backend, InMemory},
};

/// Backend selected by the `TEST_BACKEND` environment variable.
///
/// `inmemory` (or unset) is the default. `sqlite` uses a private in-memory SQLite
/// database. `postgres` connects to `TEST_POSTGRES_URL` inside a fresh schema:
///
/// ```bash
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/feedback_test" cargo test
/// ```
///
/// Naming a backend whose feature is disabled panics rather than silently testing
/// something else.
pub async fn test_backend() -> Box<dyn Backend> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use feedback::backend::database::Sqlite;
                Box::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use feedback::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/feedback_test".to_string());
                Box::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Box::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// Creates a Service over the configured test backend.
pub async fn test_service() -> Service {
    Service::new(test_backend().await)
}

/// Registration data with a derived email and the password "secret".
pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: "secret".to_string(),
        email: format!("{username}@x.com"),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

/// Registers `username` and returns the stored user with its identity.
pub async fn register(service: &Service, username: &str) -> (User, Identity) {
    let user = service
        .register(new_user(username))
        .await
        .expect("Failed to register user");
    (user, Identity::authenticated(username))
}

/// A user record with a placeholder digest, for tests that bypass the Service.
pub fn user_record(username: &str, email: &str) -> User {
    User {
        username: username.to_string(),
        password_hash: "$argon2id$v=19$placeholder".to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}
