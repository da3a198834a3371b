use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Term;
use crate::document::EditorDocument;

/// Publication state requested for a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => f.write_str("draft"),
            PostStatus::Published => f.write_str("published"),
        }
    }
}

/// Post entity - a committed article, visible to readers once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: EditorDocument,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub reading_time: u32,
    pub seo_title: String,
    pub seo_description: String,
    pub categories: Vec<Term>,
    pub tags: Vec<Term>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn status(&self) -> PostStatus {
        if self.published {
            PostStatus::Published
        } else {
            PostStatus::Draft
        }
    }

    /// Whether readers can see the post at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.published && self.published_at.is_some_and(|at| at <= now)
    }
}
