//! Publishing workflow against the in-memory adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use folio_core::domain::{CurrentUser, Draft, DraftInput, Post};
use folio_core::error::{PublishError, RepoError};
use folio_core::ports::{BaseRepository, DraftRepository, PostRepository, TermRepository};
use folio_core::services::{PostInput, PublishConfig, PublishingWorkflow, TaxonomyResolver};
use folio_infra::{InMemoryDraftRepository, InMemoryPostRepository, InMemoryTermRepository};

struct Harness {
    workflow: PublishingWorkflow,
    posts: Arc<InMemoryPostRepository>,
    drafts: Arc<dyn DraftRepository>,
    categories: Arc<InMemoryTermRepository>,
    tags: Arc<InMemoryTermRepository>,
}

fn harness_with(drafts: Arc<dyn DraftRepository>, config: PublishConfig) -> Harness {
    let posts = Arc::new(InMemoryPostRepository::new());
    let categories = Arc::new(InMemoryTermRepository::categories());
    let tags = Arc::new(InMemoryTermRepository::tags());
    let taxonomy = TaxonomyResolver::new(categories.clone(), tags.clone());
    let workflow = PublishingWorkflow::new(posts.clone(), drafts.clone(), taxonomy, config);

    Harness {
        workflow,
        posts,
        drafts,
        categories,
        tags,
    }
}

fn harness() -> Harness {
    harness_with(
        Arc::new(InMemoryDraftRepository::new()),
        PublishConfig::default(),
    )
}

fn author() -> CurrentUser {
    CurrentUser::new(Uuid::new_v4(), "Ada Lovelace")
}

fn post(slug: &str) -> PostInput {
    PostInput {
        title: "On Engines".into(),
        slug: slug.into(),
        content: r#"{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"The analytical engine weaves algebraic patterns."}]}]}"#.into(),
        status: "published".into(),
        category: "Architecture".into(),
        tags: vec!["history".into(), "computing".into()],
        ..Default::default()
    }
}

async fn stored_draft(drafts: &dyn DraftRepository, author_id: Uuid) -> Draft {
    let draft = Draft::create(
        author_id,
        DraftInput {
            title: "On Engines".into(),
            ..Default::default()
        },
    );
    drafts.save(draft).await.unwrap()
}

#[tokio::test]
async fn test_published_post_is_readable_with_derived_fields() {
    let h = harness();
    let user = author();

    let outcome = h.workflow.create_post(Some(&user), post("engines")).await.unwrap();
    assert_eq!(outcome.slug, "engines");

    let stored = h.posts.find_by_id(outcome.post_id).await.unwrap().unwrap();
    assert!(stored.published);
    assert!(stored.published_at.is_some());
    assert_eq!(stored.reading_time, 1);
    assert_eq!(stored.author_name, "Ada Lovelace");
    assert_eq!(stored.seo_title, "On Engines");
    assert_eq!(stored.excerpt, "The analytical engine weaves algebraic patterns.");
    assert_eq!(stored.seo_description, stored.excerpt);
    assert_eq!(stored.categories[0].slug, "architecture");
    assert_eq!(stored.tags.len(), 2);

    let visible = h.workflow.find_published_by_slug("engines").await.unwrap();
    assert_eq!(visible.map(|p| p.id), Some(outcome.post_id));
}

#[tokio::test]
async fn test_slug_collision_only_between_different_posts() {
    let h = harness();
    let user = author();

    let first = h.workflow.create_post(Some(&user), post("engines")).await.unwrap();

    let err = h
        .workflow
        .create_post(Some(&user), post("engines"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::SlugTaken(ref slug) if slug == "engines"));

    let update = PostInput {
        post_id: Some(first.post_id),
        title: "On Engines, revised".into(),
        ..post("engines")
    };
    let updated = h.workflow.update_post(Some(&user), update).await.unwrap();
    assert_eq!(updated.post_id, first.post_id);

    let stored = h.posts.find_by_slug("engines").await.unwrap().unwrap();
    assert_eq!(stored.title, "On Engines, revised");
}

#[tokio::test]
async fn test_category_spellings_resolve_to_one_record() {
    let h = harness();
    let user = author();

    for (slug, category) in [
        ("one", "Architecture"),
        ("two", "architecture"),
        ("three", "Architecture "),
        ("four", "ARCHITECTURE"),
        ("five", "Architecture!"),
    ] {
        let input = PostInput {
            category: category.into(),
            ..post(slug)
        };
        h.workflow.create_post(Some(&user), input).await.unwrap();
    }

    let categories = h.categories.list().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Architecture");
}

#[tokio::test]
async fn test_update_replaces_associations() {
    let h = harness();
    let user = author();

    let first = h.workflow.create_post(Some(&user), post("engines")).await.unwrap();
    let update = PostInput {
        post_id: Some(first.post_id),
        category: String::new(),
        tags: vec!["mathematics".into()],
        ..post("engines")
    };
    h.workflow.update_post(Some(&user), update).await.unwrap();

    let stored = h.posts.find_by_id(first.post_id).await.unwrap().unwrap();
    assert!(stored.categories.is_empty());
    let tags: Vec<&str> = stored.tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(tags, ["mathematics"]);
    // Terms are created lazily and kept.
    assert_eq!(h.tags.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_by_another_author_is_not_found() {
    let h = harness();
    let first = h.workflow.create_post(Some(&author()), post("engines")).await.unwrap();

    let update = PostInput {
        post_id: Some(first.post_id),
        ..post("engines")
    };
    let err = h
        .workflow
        .update_post(Some(&author()), update)
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound));
}

#[tokio::test]
async fn test_scheduled_post_stays_hidden() {
    let h = harness();
    let input = PostInput {
        publish_date: Some(Utc::now() + TimeDelta::days(7)),
        ..post("later")
    };
    h.workflow.create_post(Some(&author()), input).await.unwrap();

    assert!(h.workflow.find_published_by_slug("later").await.unwrap().is_none());
    assert!(h.workflow.list_published(10, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_draft_status_leaves_post_unpublished() {
    let h = harness();
    let input = PostInput {
        status: "draft".into(),
        publish_date: Some(Utc::now() - TimeDelta::days(1)),
        ..post("private")
    };
    let outcome = h.workflow.create_post(Some(&author()), input).await.unwrap();

    let stored = h.posts.find_by_id(outcome.post_id).await.unwrap().unwrap();
    assert!(!stored.published);
    assert!(stored.published_at.is_none());
}

#[tokio::test]
async fn test_publish_retires_originating_draft() {
    let h = harness();
    let user = author();
    let draft = stored_draft(h.drafts.as_ref(), user.id).await;

    let input = PostInput {
        draft_id: Some(draft.id),
        ..post("engines")
    };
    h.workflow.create_post(Some(&user), input).await.unwrap();

    assert!(h.drafts.find_by_id(draft.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_draft_of_another_author_is_kept() {
    let h = harness();
    let owner = author();
    let draft = stored_draft(h.drafts.as_ref(), owner.id).await;

    let input = PostInput {
        draft_id: Some(draft.id),
        ..post("engines")
    };
    h.workflow.create_post(Some(&author()), input).await.unwrap();

    assert!(h.drafts.find_by_id(draft.id).await.unwrap().is_some());
}

/// Draft repository whose first `failures` deletes fail.
struct FlakyDrafts {
    inner: InMemoryDraftRepository,
    failures: AtomicUsize,
}

#[async_trait]
impl BaseRepository<Draft, Uuid> for FlakyDrafts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Draft>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, draft: Draft) -> Result<Draft, RepoError> {
        self.inner.save(draft).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepoError::Connection("connection reset".into()));
        }
        self.inner.delete(id).await
    }
}

#[async_trait]
impl DraftRepository for FlakyDrafts {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Draft>, RepoError> {
        self.inner.find_by_author(author_id).await
    }
}

fn flaky_harness(failures: usize) -> Harness {
    harness_with(
        Arc::new(FlakyDrafts {
            inner: InMemoryDraftRepository::new(),
            failures: AtomicUsize::new(failures),
        }),
        PublishConfig::default(),
    )
}

#[tokio::test]
async fn test_transient_cleanup_failure_is_retried() {
    let h = flaky_harness(1);
    let user = author();
    let draft = stored_draft(h.drafts.as_ref(), user.id).await;

    let input = PostInput {
        draft_id: Some(draft.id),
        ..post("engines")
    };
    h.workflow.create_post(Some(&user), input).await.unwrap();

    assert!(h.drafts.find_by_id(draft.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_persistent_cleanup_failure_does_not_fail_publish() {
    let h = flaky_harness(usize::MAX);
    let user = author();
    let draft = stored_draft(h.drafts.as_ref(), user.id).await;

    let input = PostInput {
        draft_id: Some(draft.id),
        ..post("engines")
    };
    let outcome = h.workflow.create_post(Some(&user), input).await.unwrap();

    assert_eq!(outcome.slug, "engines");
    assert!(h.drafts.find_by_id(draft.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_author_name_fallback() {
    let nameless = CurrentUser {
        name: None,
        ..author()
    };

    let strict = harness();
    let err = strict
        .workflow
        .create_post(Some(&nameless), post("engines"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::NotAuthenticated));

    let lenient = harness_with(
        Arc::new(InMemoryDraftRepository::new()),
        PublishConfig {
            author_fallback_name: Some("Site Owner".into()),
        },
    );
    let outcome = lenient
        .workflow
        .create_post(Some(&nameless), post("engines"))
        .await
        .unwrap();
    let stored = lenient.posts.find_by_id(outcome.post_id).await.unwrap().unwrap();
    assert_eq!(stored.author_name, "Site Owner");
}

#[tokio::test]
async fn test_rejected_publish_has_no_side_effects() {
    let h = harness();
    let input = PostInput {
        title: String::new(),
        ..post("engines")
    };
    let err = h.workflow.create_post(Some(&author()), input).await.unwrap_err();
    assert!(matches!(err, PublishError::Validation(_)));

    assert!(h.posts.find_by_slug("engines").await.unwrap().is_none());
    assert!(h.categories.list().await.unwrap().is_empty());
    assert!(h.tags.list().await.unwrap().is_empty());
}

/// Post repository that loses the slug race: the lookup misses, then the
/// first write trips the unique constraint.
struct RacingPosts {
    inner: InMemoryPostRepository,
    lost: AtomicUsize,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for RacingPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        if self.lost.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(RepoError::Constraint("posts_slug_key".into()));
        }
        self.inner.save(post).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl PostRepository for RacingPosts {
    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(None)
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError> {
        self.inner.list_published(now, limit, offset).await
    }
}

#[tokio::test]
async fn test_constraint_on_save_is_reported_as_slug_taken() {
    let posts = Arc::new(RacingPosts {
        inner: InMemoryPostRepository::new(),
        lost: AtomicUsize::new(0),
    });
    let categories = Arc::new(InMemoryTermRepository::categories());
    let tags = Arc::new(InMemoryTermRepository::tags());
    let workflow = PublishingWorkflow::new(
        posts.clone(),
        Arc::new(InMemoryDraftRepository::new()),
        TaxonomyResolver::new(categories.clone(), tags.clone()),
        PublishConfig::default(),
    );
    let user = author();

    let err = workflow
        .create_post(Some(&user), post("engines"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::SlugTaken(ref slug) if slug == "engines"));
    assert!(posts.inner.find_by_slug("engines").await.unwrap().is_none());

    // Terms written before the failed save are picked up again, not duplicated.
    let created = categories.list().await.unwrap();
    assert_eq!(created.len(), 1);

    let outcome = workflow.create_post(Some(&user), post("engines")).await.unwrap();
    let stored = posts.inner.find_by_id(outcome.post_id).await.unwrap().unwrap();
    assert_eq!(stored.categories, created);
    assert_eq!(categories.list().await.unwrap().len(), 1);
    assert_eq!(tags.list().await.unwrap().len(), 2);
}
