//! Draft endpoints. Drafts are only ever visible to their author.

use actix_web::{HttpResponse, web};
use folio_core::domain::{Draft, DraftInput};
use folio_core::error::PublishError;
use folio_shared::ApiResponse;
use folio_shared::dto::{DraftResponse, SaveDraftRequest, SaveDraftResponse};
use uuid::Uuid;

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppResult, EnvelopeError};
use crate::state::AppState;

/// POST /api/drafts
pub async fn save_draft(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<SaveDraftRequest>,
) -> Result<HttpResponse, EnvelopeError> {
    let user = identity.0.ok_or(PublishError::NotAuthenticated)?;
    let req = body.into_inner();
    let input = DraftInput {
        id: req.id,
        title: req.title,
        slug: req.slug,
        serialized_content: req.serialized_content,
        excerpt: req.excerpt,
        cover_image: req.cover_image,
        category: req.category,
        tags: req.tags,
        is_featured: req.is_featured,
        publish_date: req.publish_date,
    };

    let draft = state.drafts.save_draft(user.id, input).await?;
    Ok(HttpResponse::Ok().json(SaveDraftResponse {
        success: true,
        draft_id: draft.id,
    }))
}

/// GET /api/drafts
pub async fn list_drafts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let drafts = state.drafts.list_drafts(identity.user().id).await?;
    let drafts: Vec<DraftResponse> = drafts.into_iter().map(draft_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(drafts)))
}

/// GET /api/drafts/{id}
pub async fn get_draft(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let draft = state
        .drafts
        .get_draft(identity.user().id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(draft_response(draft))))
}

/// DELETE /api/drafts/{id}
pub async fn delete_draft(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .drafts
        .delete_draft(identity.user().id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

fn draft_response(draft: Draft) -> DraftResponse {
    DraftResponse {
        id: draft.id,
        title: draft.title,
        slug: draft.slug,
        serialized_content: draft.serialized_content,
        excerpt: draft.excerpt,
        cover_image: draft.cover_image,
        category: draft.category,
        tags: draft.tags,
        is_featured: draft.featured,
        publish_date: draft.publish_date,
        updated_at: draft.updated_at,
    }
}
