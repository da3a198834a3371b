//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `createPost` and `updatePost`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostRequest {
    pub draft_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    /// JSON document tree or legacy HTML.
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

/// Body of `saveDraft`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDraftRequest {
    pub id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub serialized_content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub publish_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftResponse {
    pub success: bool,
    pub draft_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub serialized_content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A published post as shown to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Canonical JSON document.
    pub content: serde_json::Value,
    /// Read-only HTML rendering of `content`.
    pub html: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub featured: bool,
    pub author_name: String,
    pub author_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: u32,
    pub seo_title: String,
    pub seo_description: String,
    pub categories: Vec<TermResponse>,
    pub tags: Vec<TermResponse>,
}

/// Listing entry; omits the document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub featured: bool,
    pub author_name: String,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: u32,
    pub categories: Vec<TermResponse>,
    pub tags: Vec<TermResponse>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub reply_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_id: Option<Uuid>,
}

/// A root comment with its replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
