//! Comment endpoints.

use actix_web::{HttpResponse, web};
use folio_core::domain::{Comment, CommentThread};
use folio_shared::ApiResponse;
use folio_shared::dto::{
    CommentResponse, CommentThreadResponse, CreateCommentRequest, DeletedResponse,
};
use uuid::Uuid;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

const MODERATOR_ROLE: &str = "admin";

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let threads = state.comments.thread(path.into_inner()).await?;
    let threads: Vec<CommentThreadResponse> = threads.into_iter().map(thread_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(threads)))
}

/// POST /api/posts/{id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let comment = state
        .comments
        .add_comment(path.into_inner(), identity.user(), &req.content, req.reply_to_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(comment))))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    identity.require_role(MODERATOR_ROLE)?;
    let deleted = state.comments.delete_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(DeletedResponse { deleted })))
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_name: comment.author_name,
        content: comment.content,
        created_at: comment.created_at,
        reply_to_id: comment.reply_to_id,
    }
}

fn thread_response(thread: CommentThread) -> CommentThreadResponse {
    CommentThreadResponse {
        comment: comment_response(thread.comment),
        replies: thread.replies.into_iter().map(comment_response).collect(),
    }
}
