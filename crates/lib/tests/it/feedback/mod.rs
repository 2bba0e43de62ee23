//! Feedback store integration tests

use feedback::{
    FeedbackUpdate, NewFeedback,
    feedback::FeedbackStore,
    user::UserStore,
};

use crate::helpers::*;

#[tokio::test]
async fn test_create_and_list_in_order() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();

    let first = backend
        .create_feedback(&NewFeedback::new("First", "One", "alice"))
        .await
        .unwrap();
    let second = backend
        .create_feedback(&NewFeedback::new("Second", "Two", "alice"))
        .await
        .unwrap();
    assert!(second.id > first.id);

    let items = backend.list_feedback_by_user("alice").await.unwrap();
    assert_eq!(items, vec![first, second]);
    assert_eq!(backend.count_feedback().await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_requires_existing_owner() {
    let backend = test_backend().await;
    let err = backend
        .create_feedback(&NewFeedback::new("Hi", "Hello", "ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "feedback");
    assert_eq!(backend.count_feedback().await.unwrap(), 0);
}

#[tokio::test]
async fn test_partial_updates() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    let item = backend
        .create_feedback(&NewFeedback::new("Old", "Body", "alice"))
        .await
        .unwrap();

    backend
        .update_feedback(item.id, &FeedbackUpdate::title("New"))
        .await
        .unwrap();
    let stored = backend.get_feedback(item.id).await.unwrap();
    assert_eq!((stored.title.as_str(), stored.content.as_str()), ("New", "Body"));

    backend
        .update_feedback(item.id, &FeedbackUpdate::content("Changed"))
        .await
        .unwrap();
    let stored = backend.get_feedback(item.id).await.unwrap();
    assert_eq!(
        (stored.title.as_str(), stored.content.as_str()),
        ("New", "Changed")
    );

    // An empty update is accepted and changes nothing
    let same = backend
        .update_feedback(item.id, &FeedbackUpdate::default())
        .await
        .unwrap();
    assert_eq!(same, stored);
}

#[tokio::test]
async fn test_update_rejects_long_title() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    let item = backend
        .create_feedback(&NewFeedback::new("Old", "Body", "alice"))
        .await
        .unwrap();

    let err = backend
        .update_feedback(item.id, &FeedbackUpdate::title("x".repeat(101)))
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(backend.get_feedback(item.id).await.unwrap().title, "Old");
}

#[tokio::test]
async fn test_missing_ids() {
    let backend = test_backend().await;
    assert!(backend.get_feedback(404).await.unwrap_err().is_not_found());
    assert!(backend.delete_feedback(404).await.unwrap_err().is_not_found());
    assert!(
        backend
            .update_feedback(404, &FeedbackUpdate::title("New"))
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_delete_user_cascades_to_feedback() {
    let backend = test_backend().await;
    backend
        .insert_user(&user_record("alice", "a@x.com"))
        .await
        .unwrap();
    backend
        .insert_user(&user_record("bob", "b@x.com"))
        .await
        .unwrap();
    let alice_item = backend
        .create_feedback(&NewFeedback::new("Mine", "Alice's", "alice"))
        .await
        .unwrap();
    let bob_item = backend
        .create_feedback(&NewFeedback::new("Yours", "Bob's", "bob"))
        .await
        .unwrap();

    backend.delete_user("alice").await.unwrap();

    assert!(backend.get_feedback(alice_item.id).await.unwrap_err().is_not_found());
    assert!(backend.list_feedback_by_user("alice").await.unwrap().is_empty());
    assert_eq!(backend.get_feedback(bob_item.id).await.unwrap(), bob_item);
}
