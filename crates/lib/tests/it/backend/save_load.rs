use tempfile::TempDir;

use feedback::{
    NewFeedback,
    backend::{Backend, InMemory},
    feedback::FeedbackStore,
    user::UserStore,
};

use crate::helpers::user_record;

#[tokio::test]
async fn test_in_memory_backend_save_and_load() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("feedback.json");

    {
        let backend = InMemory::new();
        backend
            .insert_user(&user_record("alice", "a@x.com"))
            .await
            .unwrap();
        backend
            .create_feedback(&NewFeedback::new("Hi", "Hello", "alice"))
            .await
            .unwrap();
        backend.save_to_file(&file_path).await.unwrap();
    }

    assert!(file_path.exists());

    let loaded = InMemory::load_from_file(&file_path).await.unwrap();
    assert_eq!(loaded.list_users().await.unwrap().len(), 1);
    assert_eq!(loaded.count_feedback().await.unwrap(), 1);

    // Constraints still hold on the reloaded state
    let err = loaded
        .insert_user(&user_record("bob", "a@x.com"))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let file_path = dir.path().join("feedback.json");
    tokio::fs::write(&file_path, "{ not json").await.unwrap();

    let err = InMemory::load_from_file(&file_path).await.unwrap_err();
    assert!(err.is_io_error());
    assert!(err.is_database_error());
}

#[tokio::test]
async fn test_downcast_through_backend_trait() {
    let backend: Box<dyn Backend> = Box::new(InMemory::new());
    assert_eq!(backend.label(), "inmemory");
    assert!(backend.as_any().downcast_ref::<InMemory>().is_some());
}
