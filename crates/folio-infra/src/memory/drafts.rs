use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::Draft;
use folio_core::error::RepoError;
use folio_core::ports::{BaseRepository, DraftRepository};

#[derive(Default)]
pub struct InMemoryDraftRepository {
    drafts: RwLock<HashMap<Uuid, Draft>>,
}

impl InMemoryDraftRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Draft, Uuid> for InMemoryDraftRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Draft>, RepoError> {
        Ok(self.drafts.read().await.get(&id).cloned())
    }

    async fn save(&self, draft: Draft) -> Result<Draft, RepoError> {
        self.drafts.write().await.insert(draft.id, draft.clone());
        Ok(draft)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.drafts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl DraftRepository for InMemoryDraftRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Draft>, RepoError> {
        let drafts = self.drafts.read().await;
        let mut owned: Vec<Draft> = drafts
            .values()
            .filter(|d| d.author_id == author_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }
}
