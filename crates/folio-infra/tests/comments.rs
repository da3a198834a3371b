//! Comment threads against the in-memory adapters.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use folio_core::document::EditorDocument;
use folio_core::domain::{CurrentUser, Post};
use folio_core::error::DomainError;
use folio_core::ports::BaseRepository;
use folio_core::services::CommentService;
use folio_infra::{InMemoryCommentRepository, InMemoryPostRepository};

async fn setup() -> (CommentService, Uuid) {
    let posts = Arc::new(InMemoryPostRepository::new());
    let now = Utc::now();
    let post = Post {
        id: Uuid::new_v4(),
        title: "Threads".into(),
        slug: "threads".into(),
        content: EditorDocument::from_text("Body"),
        excerpt: "Body".into(),
        cover_image: None,
        published: true,
        featured: false,
        author_id: Uuid::new_v4(),
        author_name: "Ada".into(),
        author_image: None,
        published_at: Some(now),
        reading_time: 1,
        seo_title: "Threads".into(),
        seo_description: "Body".into(),
        categories: Vec::new(),
        tags: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    let post_id = posts.save(post).await.unwrap().id;

    let service = CommentService::new(Arc::new(InMemoryCommentRepository::new()), posts);
    (service, post_id)
}

fn reader(name: Option<&str>) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        name: name.map(str::to_string),
        image: None,
        roles: Vec::new(),
    }
}

#[tokio::test]
async fn test_replies_attach_to_their_root() {
    let (service, post_id) = setup().await;
    let alice = reader(Some("Alice"));

    let root = service.add_comment(post_id, &alice, "Great post", None).await.unwrap();
    let reply = service
        .add_comment(post_id, &alice, "Thanks", Some(root.id))
        .await
        .unwrap();
    let nested = service
        .add_comment(post_id, &alice, "Replying to the reply", Some(reply.id))
        .await
        .unwrap();
    assert_eq!(nested.reply_to_id, Some(root.id));

    let threads = service.thread(post_id).await.unwrap();
    assert_eq!(threads.len(), 1);
    let replies: Vec<Uuid> = threads[0].replies.iter().map(|c| c.id).collect();
    assert_eq!(replies, vec![reply.id, nested.id]);
}

#[tokio::test]
async fn test_deleting_root_removes_replies() {
    let (service, post_id) = setup().await;
    let bob = reader(Some("Bob"));

    let root = service.add_comment(post_id, &bob, "First", None).await.unwrap();
    service.add_comment(post_id, &bob, "Second", Some(root.id)).await.unwrap();
    let other = service.add_comment(post_id, &bob, "Separate", None).await.unwrap();

    assert_eq!(service.delete_comment(root.id).await.unwrap(), 2);

    let threads = service.thread(post_id).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].comment.id, other.id);

    let err = service.delete_comment(root.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_comment_rules() {
    let (service, post_id) = setup().await;
    let anon = reader(None);

    let comment = service.add_comment(post_id, &anon, "  hi  ", None).await.unwrap();
    assert_eq!(comment.content, "hi");
    assert_eq!(comment.author_name, "Anonymous");

    let blank = service.add_comment(post_id, &anon, "   ", None).await;
    assert!(matches!(blank, Err(DomainError::Validation(_))));

    let too_long = "x".repeat(5001);
    let long = service.add_comment(post_id, &anon, &too_long, None).await;
    assert!(matches!(long, Err(DomainError::Validation(_))));

    let missing_parent = service
        .add_comment(post_id, &anon, "reply", Some(Uuid::new_v4()))
        .await;
    assert!(matches!(missing_parent, Err(DomainError::Validation(_))));

    let missing_post = service.add_comment(Uuid::new_v4(), &anon, "hello", None).await;
    assert!(matches!(missing_post, Err(DomainError::NotFound { .. })));
}
