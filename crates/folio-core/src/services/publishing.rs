//! The publish/update state transition.
//!
//! A commit runs authentication, validation, the slug check, taxonomy
//! resolution and the post write strictly in that order; any failure stops the
//! sequence before the post becomes visible.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::document::{DocumentSource, EditorDocument, estimate_reading_time, to_canonical};
use crate::domain::{CurrentUser, Post, PostStatus, TermKind};
use crate::error::{DomainError, FieldError, PublishError, RepoError};
use crate::ports::{DraftRepository, PostRepository};
use crate::services::taxonomy::TaxonomyResolver;
use crate::slug::is_valid_slug;

/// Length of an excerpt derived from the content.
pub const EXCERPT_LENGTH: usize = 160;

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Display name used when the signed-in author has none.
    pub author_fallback_name: Option<String>,
}

/// Post fields as submitted by the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    pub post_id: Option<Uuid>,
    pub draft_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    /// Serialized document: JSON tree or legacy HTML.
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub status: String,
    pub featured: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub category: String,
    pub tags: Vec<String>,
    pub seo_title: String,
    pub seo_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub post_id: Uuid,
    pub slug: String,
}

struct ValidPost {
    title: String,
    slug: String,
    content: EditorDocument,
    status: PostStatus,
}

#[derive(Clone)]
pub struct PublishingWorkflow {
    posts: Arc<dyn PostRepository>,
    drafts: Arc<dyn DraftRepository>,
    taxonomy: TaxonomyResolver,
    config: PublishConfig,
}

impl PublishingWorkflow {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        drafts: Arc<dyn DraftRepository>,
        taxonomy: TaxonomyResolver,
        config: PublishConfig,
    ) -> Self {
        Self {
            posts,
            drafts,
            taxonomy,
            config,
        }
    }

    /// Commits a new post and retires the draft it came from.
    pub async fn create_post(
        &self,
        user: Option<&CurrentUser>,
        input: PostInput,
    ) -> Result<PublishOutcome, PublishError> {
        let user = user.ok_or(PublishError::NotAuthenticated)?;
        let draft_id = input.draft_id;
        let outcome = self.commit(user, None, input).await?;

        info!(post_id = %outcome.post_id, slug = %outcome.slug, "post created");
        if let Some(draft_id) = draft_id {
            self.retire_draft(user.id, draft_id).await;
        }
        Ok(outcome)
    }

    /// Re-commits an existing post owned by `user`.
    pub async fn update_post(
        &self,
        user: Option<&CurrentUser>,
        input: PostInput,
    ) -> Result<PublishOutcome, PublishError> {
        let user = user.ok_or(PublishError::NotAuthenticated)?;
        let post_id = input.post_id.ok_or_else(|| {
            PublishError::Validation(vec![FieldError::new("postId", "post id is required")])
        })?;

        let existing = self
            .posts
            .find_by_id(post_id)
            .await?
            .filter(|post| post.author_id == user.id)
            .ok_or(PublishError::NotFound)?;

        let outcome = self.commit(user, Some(existing), input).await?;
        info!(post_id = %outcome.post_id, slug = %outcome.slug, "post updated");
        Ok(outcome)
    }

    /// Published posts visible now, newest first.
    pub async fn list_published(&self, limit: u64, offset: u64) -> Result<Vec<Post>, DomainError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(self.posts.list_published(Utc::now(), limit, offset).await?)
    }

    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        let post = self.posts.find_by_slug(slug).await?;
        Ok(post.filter(|p| p.is_visible_at(Utc::now())))
    }

    async fn commit(
        &self,
        user: &CurrentUser,
        existing: Option<Post>,
        input: PostInput,
    ) -> Result<PublishOutcome, PublishError> {
        let author_name = self.author_name(user)?;
        let valid = validate(&input)?;
        let post_id = existing.as_ref().map(|p| p.id);

        if let Some(other) = self.posts.find_by_slug(&valid.slug).await? {
            if Some(other.id) != post_id {
                debug!(slug = %valid.slug, "slug already used by another post");
                return Err(PublishError::SlugTaken(valid.slug));
            }
        }

        let category = match input.category.trim() {
            "" => None,
            name => Some(self.taxonomy.resolve_category(name).await?),
        };
        let tag_names: Vec<String> = input
            .tags
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        let tags = self.taxonomy.resolve_tags(&tag_names).await?;

        // Terms are written ahead of the post. If the post write then fails
        // they stay unattached and the next resolution connects to them.
        let categories = match category {
            Some(resolution) => vec![self.taxonomy.commit(TermKind::Category, resolution).await?],
            None => Vec::new(),
        };
        let tags = self.taxonomy.commit_all(TermKind::Tag, tags).await?;

        let now = Utc::now();
        let excerpt = match input.excerpt.trim() {
            "" => valid.content.excerpt(EXCERPT_LENGTH),
            text => text.to_string(),
        };
        let published = valid.status == PostStatus::Published;
        let published_at = published.then(|| input.publish_date.unwrap_or(now));

        let post = Post {
            id: post_id.unwrap_or_else(Uuid::new_v4),
            seo_title: non_blank(&input.seo_title).unwrap_or_else(|| valid.title.clone()),
            seo_description: non_blank(&input.seo_description).unwrap_or_else(|| excerpt.clone()),
            title: valid.title,
            slug: valid.slug.clone(),
            reading_time: estimate_reading_time(DocumentSource::Tree(&valid.content)),
            content: valid.content,
            excerpt,
            cover_image: input.cover_image.as_deref().and_then(non_blank),
            published,
            featured: input.featured,
            author_id: user.id,
            author_name,
            author_image: user.image.clone(),
            published_at,
            categories,
            tags,
            created_at: existing.as_ref().map_or(now, |p| p.created_at),
            updated_at: now,
        };

        let saved = self.posts.save(post).await.map_err(|e| match e {
            RepoError::Constraint(_) => PublishError::SlugTaken(valid.slug),
            other => {
                error!(error = %other, "failed to save post");
                PublishError::Persistence(other)
            }
        })?;

        Ok(PublishOutcome {
            post_id: saved.id,
            slug: saved.slug,
        })
    }

    fn author_name(&self, user: &CurrentUser) -> Result<String, PublishError> {
        user.display_name()
            .or(self.config.author_fallback_name.as_deref())
            .map(str::to_string)
            .ok_or(PublishError::NotAuthenticated)
    }

    /// Best-effort removal of the originating draft. Never fails the publish.
    async fn retire_draft(&self, author_id: Uuid, draft_id: Uuid) {
        for attempt in 1..=2 {
            match self.delete_owned_draft(author_id, draft_id).await {
                Ok(()) => return,
                Err(e) if attempt == 1 => {
                    warn!(%draft_id, error = %e, "draft cleanup failed, retrying");
                }
                Err(e) => {
                    error!(%draft_id, error = %e, "draft cleanup failed, the draft is left behind");
                }
            }
        }
    }

    async fn delete_owned_draft(&self, author_id: Uuid, draft_id: Uuid) -> Result<(), RepoError> {
        match self.drafts.find_by_id(draft_id).await? {
            Some(draft) if draft.author_id == author_id => match self.drafts.delete(draft_id).await {
                Ok(()) | Err(RepoError::NotFound) => Ok(()),
                Err(e) => Err(e),
            },
            Some(_) => {
                warn!(%draft_id, "draft belongs to another author, not deleting");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn validate(input: &PostInput) -> Result<ValidPost, PublishError> {
    let mut errors = Vec::new();

    let title = input.title.trim().to_string();
    if title.is_empty() {
        errors.push(FieldError::new("title", "title is required"));
    }

    let slug = input.slug.trim().to_string();
    if slug.is_empty() {
        errors.push(FieldError::new("slug", "slug is required"));
    } else if !is_valid_slug(&slug) {
        errors.push(FieldError::new(
            "slug",
            "slug may only contain lowercase letters, digits and hyphens",
        ));
    }

    let content = to_canonical(DocumentSource::Serialized(&input.content));
    if content.is_empty() {
        errors.push(FieldError::new("content", "content is required"));
    }

    let status = input.status.parse::<PostStatus>();
    if status.is_err() {
        errors.push(FieldError::new(
            "status",
            "status must be either 'draft' or 'published'",
        ));
    }

    match status {
        Ok(status) if errors.is_empty() => Ok(ValidPost {
            title,
            slug,
            content,
            status,
        }),
        _ => Err(PublishError::Validation(errors)),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
