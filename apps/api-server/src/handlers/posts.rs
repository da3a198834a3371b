//! Post endpoints: the public read side and the publish/update commits.

use actix_web::{HttpResponse, web};
use folio_core::document::render;
use folio_core::domain::{Post, Term};
use folio_core::services::PostInput;
use folio_shared::dto::{PageQuery, PostRequest, PostResponse, PostSummary, TermResponse};
use folio_shared::{ApiResponse, PublishResponse};
use uuid::Uuid;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult, EnvelopeError};
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .publishing
        .list_published(query.limit, query.offset)
        .await?;
    let summaries: Vec<PostSummary> = posts.into_iter().map(summary).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(summaries)))
}

/// GET /api/posts/{slug}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let post = state
        .publishing
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", slug)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(detail(post)?)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Json<PostRequest>,
) -> Result<HttpResponse, EnvelopeError> {
    let input = post_input(body.into_inner(), None);
    let outcome = state
        .publishing
        .create_post(identity.0.as_ref(), input)
        .await?;
    Ok(HttpResponse::Created().json(PublishResponse::published(outcome.slug)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> Result<HttpResponse, EnvelopeError> {
    let input = post_input(body.into_inner(), Some(path.into_inner()));
    let outcome = state
        .publishing
        .update_post(identity.0.as_ref(), input)
        .await?;
    Ok(HttpResponse::Ok().json(PublishResponse::published(outcome.slug)))
}

fn post_input(req: PostRequest, post_id: Option<Uuid>) -> PostInput {
    PostInput {
        post_id,
        // An update never retires a draft.
        draft_id: if post_id.is_some() { None } else { req.draft_id },
        title: req.title,
        slug: req.slug,
        content: req.content,
        excerpt: req.excerpt,
        cover_image: req.cover_image,
        status: req.status,
        featured: req.featured,
        publish_date: req.publish_date,
        category: req.category,
        tags: req.tags,
        seo_title: req.seo_title,
        seo_description: req.seo_description,
    }
}

fn term(term: Term) -> TermResponse {
    TermResponse {
        id: term.id,
        name: term.name,
        slug: term.slug,
    }
}

fn summary(post: Post) -> PostSummary {
    PostSummary {
        id: post.id,
        title: post.title,
        slug: post.slug,
        excerpt: post.excerpt,
        cover_image: post.cover_image,
        featured: post.featured,
        author_name: post.author_name,
        published_at: post.published_at,
        reading_time: post.reading_time,
        categories: post.categories.into_iter().map(term).collect(),
        tags: post.tags.into_iter().map(term).collect(),
    }
}

fn detail(post: Post) -> AppResult<PostResponse> {
    let html = render(&post.content);
    let content =
        serde_json::to_value(&post.content).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        content,
        html,
        excerpt: post.excerpt,
        cover_image: post.cover_image,
        featured: post.featured,
        author_name: post.author_name,
        author_image: post.author_image,
        published_at: post.published_at,
        reading_time: post.reading_time,
        seo_title: post.seo_title,
        seo_description: post.seo_description,
        categories: post.categories.into_iter().map(term).collect(),
        tags: post.tags.into_iter().map(term).collect(),
    })
}
