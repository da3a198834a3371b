use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two independent taxonomies a post is classified by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Category,
    Tag,
}

impl TermKind {
    /// Input field a problem with this kind is reported against.
    pub fn field_name(self) -> &'static str {
        match self {
            TermKind::Category => "category",
            TermKind::Tag => "tags",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TermKind::Category => "category",
            TermKind::Tag => "tag",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Category => f.write_str("Category"),
            TermKind::Tag => f.write_str("Tag"),
        }
    }
}

/// A category or tag record. Names are unique case-insensitively and slugs
/// are unique, each within one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Term {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
        }
    }
}

pub type Category = Term;
pub type Tag = Term;
