use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a post. `reply_to_id` is `None` for root comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub reply_to_id: Option<Uuid>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: Uuid,
        author_name: String,
        content: String,
        reply_to_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            author_name,
            content,
            created_at: Utc::now(),
            reply_to_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.reply_to_id.is_none()
    }
}

/// A root comment with its direct replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}
