use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Draft, Post, Term, TermKind};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
///
/// `save` replaces the post's category and tag associations wholesale and
/// fails with [`RepoError::Constraint`] when another post already owns the slug.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Published posts visible at `now`, newest `published_at` first.
    async fn list_published(
        &self,
        now: DateTime<Utc>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Draft repository.
#[async_trait]
pub trait DraftRepository: BaseRepository<Draft, Uuid> {
    /// Drafts owned by `author_id`, most recently updated first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Draft>, RepoError>;
}

/// Storage for one taxonomy (categories or tags).
#[async_trait]
pub trait TermRepository: Send + Sync {
    fn kind(&self) -> TermKind;

    /// A term whose name equals `name` ignoring case, or whose slug equals `slug`.
    async fn find_matching(&self, name: &str, slug: &str) -> Result<Option<Term>, RepoError>;

    /// Inserts a new term. Fails with [`RepoError::Constraint`] when the name
    /// (case-insensitively) or the slug is already taken.
    async fn create(&self, term: Term) -> Result<Term, RepoError>;

    async fn list(&self) -> Result<Vec<Term>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on `post_id` in `created_at` order.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Deletes a comment and every comment replying to it. Returns the number
    /// of removed comments.
    async fn delete_with_replies(&self, id: Uuid) -> Result<u64, RepoError>;
}
