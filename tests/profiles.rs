//! Profile store tests: username rules, ownership, updated_at maintenance.

use serde_json::json;
use trade_journal::error::{ConstraintKind, StoreError};
use trade_journal::policy::Requester;
use trade_journal::store::{JournalStore, MemoryStore};
use trade_journal::types::profile::{NewProfile, ProfileUpdate};
use trade_journal::types::subject::AuthSubject;
use uuid::Uuid;

fn subject(id: Uuid) -> AuthSubject {
    AuthSubject {
        id,
        email: format!("u{}@x.com", &id.simple().to_string()[..12]),
        user_metadata: json!({}),
    }
}

/// Subject known to the store, no profile yet.
async fn registered(store: &MemoryStore) -> Uuid {
    let id = Uuid::new_v4();
    store.register_subject(&Requester::Service, &subject(id)).await.unwrap();
    id
}

/// Subject with a provisioned profile.
async fn signed_up(store: &MemoryStore) -> Uuid {
    let id = registered(store).await;
    store.provision_profile(&Requester::Service, id).await.unwrap();
    id
}

fn new_profile(id: Uuid, username: &str) -> NewProfile {
    NewProfile {
        id,
        email: format!("{username}@example.com"),
        username: username.to_string(),
        country: Some("PT".to_string()),
        date_of_birth: None,
        avatar_url: None,
    }
}

fn violation(err: StoreError) -> (&'static str, ConstraintKind) {
    match err {
        StoreError::ConstraintViolation { field, kind } => (field, kind),
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

#[tokio::test]
async fn check_username_is_case_insensitive() {
    let store = MemoryStore::new();
    let id = signed_up(&store).await;
    store
        .update_profile(
            &Requester::User(id),
            id,
            ProfileUpdate {
                username: Some("Alice".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!store.check_username("alice").await.unwrap());
    assert!(!store.check_username("ALICE").await.unwrap());
    assert!(store.check_username("alicia").await.unwrap());
}

#[tokio::test]
async fn check_username_does_not_validate_candidate() {
    let store = MemoryStore::new();
    assert!(store.check_username("bad name!").await.unwrap());
    assert!(store.check_username("").await.unwrap());
}

#[tokio::test]
async fn usernames_differing_by_case_conflict() {
    let store = MemoryStore::new();
    let a = signed_up(&store).await;
    let b = signed_up(&store).await;
    store
        .update_profile(
            &Requester::User(a),
            a,
            ProfileUpdate {
                username: Some("trader_joe".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = store
        .update_profile(
            &Requester::User(b),
            b,
            ProfileUpdate {
                username: Some("Trader_Joe".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(violation(err), ("username", ConstraintKind::Unique));
}

#[tokio::test]
async fn client_insert_rejects_case_duplicate() {
    let store = MemoryStore::new();
    let a = registered(&store).await;
    let b = registered(&store).await;

    store
        .insert_profile(&Requester::User(a), new_profile(a, "carol"))
        .await
        .unwrap();
    let err = store
        .insert_profile(&Requester::User(b), new_profile(b, "CAROL"))
        .await
        .unwrap_err();
    assert_eq!(violation(err), ("username", ConstraintKind::Unique));
}

#[tokio::test]
async fn concurrent_claims_only_one_wins() {
    let store = MemoryStore::new();
    let a = registered(&store).await;
    let b = registered(&store).await;

    // Both see the name as free; the store still lets only one through.
    assert!(store.check_username("racer").await.unwrap());
    let (req_a, req_b) = (Requester::User(a), Requester::User(b));
    let (ra, rb) = tokio::join!(
        store.insert_profile(&req_a, new_profile(a, "racer")),
        store.insert_profile(&req_b, new_profile(b, "Racer")),
    );
    assert_eq!([ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert!(!store.check_username("RACER").await.unwrap());
}

#[tokio::test]
async fn malformed_usernames_rejected_on_insert() {
    let store = MemoryStore::new();
    let id = registered(&store).await;

    for bad in ["ab", "bad name!", "way_too_long_username_x"] {
        let err = store
            .insert_profile(&Requester::User(id), new_profile(id, bad))
            .await
            .unwrap_err();
        assert_eq!(violation(err), ("username", ConstraintKind::Format), "{bad}");
    }
    assert!(store.get_profile(&Requester::User(id), id).await.is_err());
}

#[tokio::test]
async fn missing_email_rejected() {
    let store = MemoryStore::new();
    let id = registered(&store).await;
    let mut profile = new_profile(id, "dana");
    profile.email = String::new();

    let err = store.insert_profile(&Requester::User(id), profile).await.unwrap_err();
    assert_eq!(violation(err), ("email", ConstraintKind::Required));
}

#[tokio::test]
async fn insert_for_someone_else_denied() {
    let store = MemoryStore::new();
    let me = registered(&store).await;
    let other = registered(&store).await;

    let err = store
        .insert_profile(&Requester::User(me), new_profile(other, "impostor"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotPermitted));
    let err = store
        .insert_profile(&Requester::Anonymous, new_profile(other, "impostor"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotPermitted));
}

#[tokio::test]
async fn insert_without_subject_violates_reference() {
    let store = MemoryStore::new();
    let id = Uuid::new_v4();
    let err = store
        .insert_profile(&Requester::User(id), new_profile(id, "ghost"))
        .await
        .unwrap_err();
    assert_eq!(violation(err), ("id", ConstraintKind::ForeignKey));
}

#[tokio::test]
async fn second_profile_for_same_subject_rejected() {
    let store = MemoryStore::new();
    let id = registered(&store).await;
    store
        .insert_profile(&Requester::User(id), new_profile(id, "first"))
        .await
        .unwrap();
    let err = store
        .insert_profile(&Requester::User(id), new_profile(id, "second"))
        .await
        .unwrap_err();
    assert_eq!(violation(err), ("id", ConstraintKind::Unique));
}

#[tokio::test]
async fn profiles_are_owner_only() {
    let store = MemoryStore::new();
    let owner = signed_up(&store).await;
    let other = signed_up(&store).await;

    assert!(store.get_profile(&Requester::User(owner), owner).await.is_ok());
    assert!(matches!(
        store.get_profile(&Requester::User(other), owner).await,
        Err(StoreError::NotPermitted)
    ));
    assert!(matches!(
        store.get_profile(&Requester::Anonymous, owner).await,
        Err(StoreError::NotPermitted)
    ));
    assert!(matches!(
        store
            .update_profile(&Requester::User(other), owner, ProfileUpdate::default())
            .await,
        Err(StoreError::NotPermitted)
    ));
}

#[tokio::test]
async fn missing_and_foreign_profiles_look_the_same() {
    let store = MemoryStore::new();
    let me = registered(&store).await;
    let other = signed_up(&store).await;

    let missing = store.get_profile(&Requester::User(me), me).await.unwrap_err();
    let foreign = store.get_profile(&Requester::User(me), other).await.unwrap_err();
    assert_eq!(missing.to_string(), foreign.to_string());
}

#[tokio::test]
async fn update_refreshes_updated_at_and_keeps_other_fields() {
    let store = MemoryStore::new();
    let id = registered(&store).await;
    let created = store
        .insert_profile(&Requester::User(id), new_profile(id, "erin"))
        .await
        .unwrap();

    let updated = store
        .update_profile(
            &Requester::User(id),
            id,
            ProfileUpdate {
                avatar_url: Some(Some("avatars/erin.png".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.username, "erin");
    assert_eq!(updated.country.as_deref(), Some("PT"));
    assert_eq!(updated.avatar_url.as_deref(), Some("avatars/erin.png"));
}

#[tokio::test]
async fn optional_fields_can_be_cleared() {
    let store = MemoryStore::new();
    let id = registered(&store).await;
    let mut profile = new_profile(id, "gwen");
    profile.date_of_birth = chrono::NaiveDate::from_ymd_opt(1990, 4, 2);
    store.insert_profile(&Requester::User(id), profile).await.unwrap();

    let updated = store
        .update_profile(
            &Requester::User(id),
            id,
            ProfileUpdate {
                country: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.country, None);
    assert_eq!(updated.date_of_birth, chrono::NaiveDate::from_ymd_opt(1990, 4, 2));
}

#[tokio::test]
async fn renaming_frees_old_username() {
    let store = MemoryStore::new();
    let id = registered(&store).await;
    store
        .insert_profile(&Requester::User(id), new_profile(id, "frank"))
        .await
        .unwrap();
    store
        .update_profile(
            &Requester::User(id),
            id,
            ProfileUpdate {
                username: Some("Franklin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(store.check_username("frank").await.unwrap());
    assert!(!store.check_username("franklin").await.unwrap());

    // Changing only the case of one's own name is allowed.
    let renamed = store
        .update_profile(
            &Requester::User(id),
            id,
            ProfileUpdate {
                username: Some("FRANKLIN".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.username, "FRANKLIN");
}
