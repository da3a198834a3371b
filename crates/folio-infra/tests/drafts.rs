//! Draft store scoping against the in-memory adapters.

use std::sync::Arc;

use uuid::Uuid;

use folio_core::domain::DraftInput;
use folio_core::error::DomainError;
use folio_core::ports::DraftStore;
use folio_core::services::DraftService;
use folio_infra::InMemoryDraftRepository;

fn input(title: &str) -> DraftInput {
    DraftInput {
        title: title.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_save_with_id_updates_in_place() {
    let service = DraftService::new(Arc::new(InMemoryDraftRepository::new()));
    let author = Uuid::new_v4();
    let store = service.for_author(author);

    let id = store.save_draft(input("v1")).await.unwrap();
    let again = store
        .save_draft(DraftInput {
            id: Some(id),
            ..input("v2")
        })
        .await
        .unwrap();

    assert_eq!(again, id);
    let drafts = service.list_drafts(author).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "v2");
}

#[tokio::test]
async fn test_unknown_or_foreign_id_creates_new_draft() {
    let service = DraftService::new(Arc::new(InMemoryDraftRepository::new()));
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let owned = service.save_draft(owner, input("mine")).await.unwrap();

    let foreign = service
        .save_draft(
            intruder,
            DraftInput {
                id: Some(owned.id),
                ..input("theirs")
            },
        )
        .await
        .unwrap();
    assert_ne!(foreign.id, owned.id);
    assert_eq!(service.get_draft(owner, owned.id).await.unwrap().title, "mine");

    let unknown = service
        .save_draft(
            owner,
            DraftInput {
                id: Some(Uuid::new_v4()),
                ..input("fresh")
            },
        )
        .await
        .unwrap();
    assert_eq!(service.list_drafts(owner).await.unwrap().len(), 2);
    assert_ne!(unknown.id, owned.id);
}

#[tokio::test]
async fn test_drafts_are_private_to_their_author() {
    let service = DraftService::new(Arc::new(InMemoryDraftRepository::new()));
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let draft = service.save_draft(owner, input("secret")).await.unwrap();

    let read = service.get_draft(other, draft.id).await;
    assert!(matches!(read, Err(DomainError::NotFound { .. })));
    let delete = service.delete_draft(other, draft.id).await;
    assert!(matches!(delete, Err(DomainError::NotFound { .. })));

    service.delete_draft(owner, draft.id).await.unwrap();
    assert!(service.list_drafts(owner).await.unwrap().is_empty());
}
