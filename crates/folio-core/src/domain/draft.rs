use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An in-progress, unpublished authoring record owned by one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub serialized_content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a draft save. `id` names the draft to update, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftInput {
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

impl Draft {
    /// A new draft for `author_id` holding `input`.
    pub fn create(author_id: Uuid, input: DraftInput) -> Self {
        let now = Utc::now();
        let mut draft = Self {
            id: Uuid::new_v4(),
            author_id,
            title: String::new(),
            slug: String::new(),
            serialized_content: String::new(),
            excerpt: String::new(),
            cover_image: None,
            category: String::new(),
            tags: Vec::new(),
            featured: false,
            publish_date: None,
            created_at: now,
            updated_at: now,
        };
        draft.apply(input);
        draft
    }

    /// Overwrites every authored field with `input`, keeping identity.
    pub fn apply(&mut self, input: DraftInput) {
        self.title = input.title;
        self.slug = input.slug;
        self.serialized_content = input.serialized_content;
        self.excerpt = input.excerpt;
        self.cover_image = input.cover_image;
        self.category = input.category;
        self.tags = input.tags;
        self.featured = input.is_featured;
        self.publish_date = input.publish_date;
        self.updated_at = Utc::now();
    }
}
