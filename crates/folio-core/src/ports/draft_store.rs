use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::DraftInput;
use crate::error::DomainError;

/// Remote draft storage as seen by one authoring session.
///
/// Updates the draft named by `input.id` when it exists, otherwise creates a
/// new one. Returns the id subsequent saves must target.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, input: DraftInput) -> Result<Uuid, DomainError>;
}
