use tempfile::TempDir;

use feedback::{
    NewFeedback, Service, UniqueField,
    backend::{Backend, DbKind, SqlxBackend},
    feedback::FeedbackStore,
    user::UserStore,
};

use crate::helpers::{new_user, user_record};

#[tokio::test]
async fn test_file_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feedback.db");

    let id = {
        let backend = SqlxBackend::open_sqlite(&path).await.unwrap();
        backend
            .insert_user(&user_record("alice", "a@x.com"))
            .await
            .unwrap();
        let item = backend
            .create_feedback(&NewFeedback::new("Hi", "Hello", "alice"))
            .await
            .unwrap();
        backend.close().await;
        item.id
    };

    let backend = SqlxBackend::open_sqlite(&path).await.unwrap();
    assert_eq!(backend.kind(), DbKind::Sqlite);
    assert_eq!(backend.get_feedback(id).await.unwrap().title, "Hi");
    assert_eq!(backend.get_user("alice").await.unwrap().email, "a@x.com");
}

#[tokio::test]
async fn test_every_pooled_connection_gets_pragmas() {
    let dir = TempDir::new().unwrap();
    let backend = SqlxBackend::open_sqlite(dir.path().join("feedback.db"))
        .await
        .unwrap();

    // Hold several connections at once so each one comes from a separate connect
    let mut conns = Vec::new();
    for _ in 0..3 {
        conns.push(backend.pool().acquire().await.unwrap());
    }
    for conn in &mut conns {
        let synchronous: i64 = sqlx::query_scalar("PRAGMA synchronous")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        // 1 = NORMAL
        assert_eq!(synchronous, 1);
        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);
    }
}

#[tokio::test]
async fn test_connect_dispatches_on_scheme() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("feedback.db").display());
    let backend = SqlxBackend::connect(&url).await.unwrap();
    assert!(backend.is_sqlite());
    assert_eq!(backend.label(), "sqlite");

    let err = SqlxBackend::connect("mysql://root@localhost/feedback")
        .await
        .err()
        .unwrap();
    assert!(err.is_database_error());
    // Credentials never reach the error text
    assert!(!err.to_string().contains("root"));
}

#[tokio::test]
async fn test_constraint_errors_are_typed() {
    let backend = SqlxBackend::sqlite_in_memory().await.unwrap();
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();

    let err = backend
        .insert_user(&user_record("alice", "z@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.duplicate_field(), Some(UniqueField::Username));

    let err = backend
        .insert_user(&user_record("bob", "a@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.duplicate_field(), Some(UniqueField::Email));

    let err = backend
        .create_feedback(&NewFeedback::new("Hi", "Hello", "ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_cascade_uses_foreign_key() {
    let backend = SqlxBackend::sqlite_in_memory().await.unwrap();
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    for i in 0..3 {
        backend
            .create_feedback(&NewFeedback::new(format!("T{i}"), "C", "alice"))
            .await
            .unwrap();
    }

    backend.delete_user("alice").await.unwrap();

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedback")
        .fetch_one(backend.pool())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_deleted_ids_are_not_reused() {
    let backend = SqlxBackend::sqlite_in_memory().await.unwrap();
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    let first = backend
        .create_feedback(&NewFeedback::new("One", "1", "alice"))
        .await
        .unwrap();
    backend.delete_feedback(first.id).await.unwrap();
    let second = backend
        .create_feedback(&NewFeedback::new("Two", "2", "alice"))
        .await
        .unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn test_concurrent_registration_on_file_database() {
    let dir = TempDir::new().unwrap();
    let backend = SqlxBackend::open_sqlite(dir.path().join("feedback.db"))
        .await
        .unwrap();
    let service = Service::new(Box::new(backend));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.register(new_user("alice")).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(e.is_conflict(), "unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(service.list_users().await.unwrap().len(), 1);
}
