//! User store integration tests
//!
//! These run against whichever backend TEST_BACKEND selects.

use feedback::{UniqueField, user::UserStore};

use crate::helpers::*;

#[tokio::test]
async fn test_insert_and_get() {
    let backend = test_backend().await;
    let user = user_record("alice", "a@x.com");
    backend.insert_user(&user).await.unwrap();

    assert_eq!(backend.get_user("alice").await.unwrap(), user);
}

#[tokio::test]
async fn test_get_missing_user() {
    let backend = test_backend().await;
    let err = backend.get_user("nobody").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "user");
}

#[tokio::test]
async fn test_duplicate_username_keeps_one_user() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();

    let err = backend
        .insert_user(&user_record("alice", "other@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(err.duplicate_field(), Some(UniqueField::Username));

    let users = backend.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "a@x.com");
}

#[tokio::test]
async fn test_duplicate_email_keeps_one_user() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();

    let err = backend
        .insert_user(&user_record("bob", "a@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.duplicate_field(), Some(UniqueField::Email));
    assert!(backend.get_user("bob").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_users_is_sorted() {
    let backend = test_backend().await;
    for name in ["carol", "alice", "bob"] {
        backend
            .insert_user(&user_record(name, &format!("{name}@x.com")))
            .await
            .unwrap();
    }

    let names: Vec<String> = backend
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, ["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_delete_missing_user() {
    let backend = test_backend().await;
    assert!(backend.delete_user("nobody").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_username_can_be_reused_after_delete() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    backend.delete_user("alice").await.unwrap();

    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    assert_eq!(backend.list_users().await.unwrap().len(), 1);
}
