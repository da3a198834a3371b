//! Comment threading.
//!
//! Threads are exactly one level deep: a root comment and its direct replies.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Comment, CommentThread, CurrentUser};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository};

pub const MAX_COMMENT_CHARS: usize = 5000;

const ANONYMOUS: &str = "Anonymous";

/// Rebuilds root/reply threads from a flat list.
///
/// Roots keep their list order and replies keep theirs. A reply to a reply is
/// attached to the root of its chain; a reply whose chain does not end at a
/// root in `comments` is dropped.
pub fn build_tree(comments: Vec<Comment>) -> Vec<CommentThread> {
    let parents: HashMap<Uuid, Option<Uuid>> =
        comments.iter().map(|c| (c.id, c.reply_to_id)).collect();

    let mut threads = Vec::new();
    let mut root_index = HashMap::new();
    let mut replies = Vec::new();
    for comment in comments {
        if comment.is_root() {
            root_index.insert(comment.id, threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push(comment);
        }
    }

    for reply in replies {
        let root = reply
            .reply_to_id
            .and_then(|parent| root_of(parent, &parents))
            .and_then(|root| root_index.get(&root));
        match root {
            Some(&index) => threads[index].replies.push(reply),
            None => debug!(comment_id = %reply.id, "dropping orphan reply"),
        }
    }

    threads
}

/// Follows `reply_to_id` links up to a root comment.
fn root_of(mut id: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> Option<Uuid> {
    for _ in 0..=parents.len() {
        match parents.get(&id)? {
            None => return Some(id),
            Some(parent) => id = *parent,
        }
    }
    None
}

/// Removes comment `id` and its direct replies from `comments`.
pub fn cascade_delete(comments: &mut Vec<Comment>, id: Uuid) -> usize {
    let before = comments.len();
    comments.retain(|c| c.id != id && c.reply_to_id != Some(id));
    before - comments.len()
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: &CurrentUser,
        content: &str,
        reply_to: Option<Uuid>,
    ) -> Result<Comment, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity_type: "Post",
                id: post_id,
            });
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation("comment must not be empty".into()));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(DomainError::Validation(format!(
                "comment must be at most {MAX_COMMENT_CHARS} characters"
            )));
        }

        let reply_to = match reply_to {
            Some(parent_id) => Some(self.reply_target(post_id, parent_id).await?),
            None => None,
        };

        let comment = Comment::new(
            post_id,
            author.id,
            author.display_name().unwrap_or(ANONYMOUS).to_string(),
            content.to_string(),
            reply_to,
        );
        Ok(self.comments.save(comment).await?)
    }

    /// Threads of a post, oldest first.
    pub async fn thread(&self, post_id: Uuid) -> Result<Vec<CommentThread>, DomainError> {
        let comments = self.comments.find_by_post(post_id).await?;
        Ok(build_tree(comments))
    }

    /// Deletes a comment and its replies, returning how many were removed.
    pub async fn delete_comment(&self, id: Uuid) -> Result<u64, DomainError> {
        match self.comments.delete_with_replies(id).await? {
            0 => Err(DomainError::NotFound {
                entity_type: "Comment",
                id,
            }),
            removed => Ok(removed),
        }
    }

    async fn reply_target(&self, post_id: Uuid, parent_id: Uuid) -> Result<Uuid, DomainError> {
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| {
                DomainError::Validation("reply target must be a comment on the same post".into())
            })?;

        match parent.reply_to_id {
            Some(root) => {
                debug!(%parent_id, %root, "reply to a reply, attaching to its root");
                Ok(root)
            }
            None => Ok(parent.id),
        }
    }
}
