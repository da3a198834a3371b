use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Draft, DraftInput};
use crate::error::DomainError;
use crate::ports::{DraftRepository, DraftStore};

/// Author-scoped access to stored drafts.
#[derive(Clone)]
pub struct DraftService {
    drafts: Arc<dyn DraftRepository>,
}

impl DraftService {
    pub fn new(drafts: Arc<dyn DraftRepository>) -> Self {
        Self { drafts }
    }

    /// Updates the draft named by `input.id` when it exists and belongs to
    /// `author_id`; otherwise creates a new draft.
    pub async fn save_draft(&self, author_id: Uuid, input: DraftInput) -> Result<Draft, DomainError> {
        let existing = match input.id {
            Some(id) => self.owned(author_id, id).await?,
            None => None,
        };

        let draft = match existing {
            Some(mut draft) => {
                draft.apply(input);
                draft
            }
            None => {
                if let Some(id) = input.id {
                    debug!(%id, %author_id, "draft id not found for author, creating a new draft");
                }
                Draft::create(author_id, input)
            }
        };

        Ok(self.drafts.save(draft).await?)
    }

    pub async fn get_draft(&self, author_id: Uuid, id: Uuid) -> Result<Draft, DomainError> {
        self.owned(author_id, id).await?.ok_or(DomainError::NotFound {
            entity_type: "Draft",
            id,
        })
    }

    pub async fn list_drafts(&self, author_id: Uuid) -> Result<Vec<Draft>, DomainError> {
        Ok(self.drafts.find_by_author(author_id).await?)
    }

    pub async fn delete_draft(&self, author_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let draft = self.get_draft(author_id, id).await?;
        Ok(self.drafts.delete(draft.id).await?)
    }

    /// The draft store one author's autosave session writes through.
    pub fn for_author(&self, author_id: Uuid) -> AuthorDrafts {
        AuthorDrafts {
            service: self.clone(),
            author_id,
        }
    }

    async fn owned(&self, author_id: Uuid, id: Uuid) -> Result<Option<Draft>, DomainError> {
        let draft = self.drafts.find_by_id(id).await?;
        Ok(draft.filter(|d| d.author_id == author_id))
    }
}

pub struct AuthorDrafts {
    service: DraftService,
    author_id: Uuid,
}

#[async_trait]
impl DraftStore for AuthorDrafts {
    async fn save_draft(&self, input: DraftInput) -> Result<Uuid, DomainError> {
        let draft = self.service.save_draft(self.author_id, input).await?;
        Ok(draft.id)
    }
}
