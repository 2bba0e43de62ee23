//! Service integration tests: authorization and end-to-end flows

use feedback::{
    FeedbackUpdate, Identity, Service, UniqueField,
    backend::InMemory,
    forms::{EditFeedbackForm, FeedbackForm, RegisterForm},
};

use crate::helpers::*;

#[tokio::test]
async fn test_register_create_delete_flow() {
    let service = test_service().await;

    let form = RegisterForm {
        username: "alice".to_string(),
        password: "secret".to_string(),
        email: "a@x.com".to_string(),
        first_name: "alice".to_string(),
        last_name: "liddell".to_string(),
    };
    let user = service.register(form.validate().unwrap()).await.unwrap();
    assert_eq!(user.full_name(), "Alice Liddell");

    let authenticated = service.authenticate("alice", "secret").await.unwrap();
    assert!(authenticated.is_some());
    let identity = service.identify(Some("alice")).await.unwrap();
    assert_eq!(identity, Identity::authenticated("alice"));

    let (title, content) = FeedbackForm {
        title: "Hi".to_string(),
        content: "hello".to_string(),
    }
    .validate()
    .unwrap();
    service
        .create_feedback(&identity, "alice", &title, &content)
        .await
        .unwrap();

    let items = service.list_feedback("alice").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!((items[0].title.as_str(), items[0].content.as_str()), ("Hi", "Hello"));

    service.delete_user(&identity, "alice").await.unwrap();
    assert!(service.list_feedback("alice").await.unwrap().is_empty());
    assert!(service.get_user("alice").await.unwrap_err().is_not_found());

    // The old session no longer names anyone
    assert_eq!(
        service.identify(Some("alice")).await.unwrap(),
        Identity::Anonymous
    );
}

#[tokio::test]
async fn test_duplicate_registration() {
    let service = test_service().await;
    register(&service, "alice").await;

    let err = service.register(new_user("alice")).await.unwrap_err();
    assert_eq!(err.duplicate_field(), Some(UniqueField::Username));

    let mut same_email = new_user("bob");
    same_email.email = "alice@x.com".to_string();
    let err = service.register(same_email).await.unwrap_err();
    assert_eq!(err.duplicate_field(), Some(UniqueField::Email));

    assert_eq!(service.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_registration_stores_one_user() {
    // Shared-cache SQLite reports table locks instead of waiting, so this one is
    // pinned to the lock-based backend; the file-backed SQLite case lives in backend/
    let service = Service::new(Box::new(InMemory::new()));

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

#[tokio::test]
async fn test_authenticate_never_leaks_which_part_failed() {
    let service = test_service().await;
    register(&service, "alice").await;

    assert!(service.authenticate("alice", "nope").await.unwrap().is_none());
    assert!(service.authenticate("nobody", "secret").await.unwrap().is_none());
    assert!(service.authenticate("alice", "secret").await.unwrap().is_some());
}

#[tokio::test]
async fn test_others_cannot_touch_feedback() {
    let service = test_service().await;
    let (_, alice) = register(&service, "alice").await;
    let (_, bob) = register(&service, "bob").await;

    let item = service
        .create_feedback(&alice, "alice", "Hi", "Hello")
        .await
        .unwrap();

    for identity in [&bob, &Identity::Anonymous] {
        assert!(
            service
                .update_feedback(identity, item.id, &FeedbackUpdate::title("X"))
                .await
                .unwrap_err()
                .is_permission_denied()
        );
        assert!(
            service
                .delete_feedback(identity, item.id)
                .await
                .unwrap_err()
                .is_permission_denied()
        );
        assert!(
            service
                .create_feedback(identity, "alice", "Spam", "Spam")
                .await
                .unwrap_err()
                .is_permission_denied()
        );
    }

    assert_eq!(service.list_feedback("alice").await.unwrap(), vec![item]);
}

#[tokio::test]
async fn test_owner_edits_then_deletes() {
    let service = test_service().await;
    let (_, alice) = register(&service, "alice").await;
    let item = service
        .create_feedback(&alice, "alice", "Hi", "Hello")
        .await
        .unwrap();

    let update = EditFeedbackForm {
        title: "new title".to_string(),
        content: String::new(),
    }
    .validate()
    .unwrap();
    let updated = service
        .update_feedback(&alice, item.id, &update)
        .await
        .unwrap();
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.content, "Hello");

    let removed = service.delete_feedback(&alice, item.id).await.unwrap();
    assert_eq!(removed.title, "New title");
    assert!(service.get_feedback(item.id).await.unwrap_err().is_not_found());
}
