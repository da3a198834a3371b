//! Post entity for SeaORM.
//!
//! Content is stored as the canonical JSON document; category and tag links
//! live in `post_terms`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::document::{DocumentSource, to_canonical};
use folio_core::domain::{Post, Term};
use folio_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_image: Option<String>,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub reading_time: i32,
    pub seo_title: String,
    #[sea_orm(column_type = "Text")]
    pub seo_description: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_term::Entity")]
    PostTerm,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::post_term::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTerm.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Domain post with the given taxonomy links.
    pub fn into_post(self, categories: Vec<Term>, tags: Vec<Term>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            slug: self.slug,
            content: to_canonical(DocumentSource::Serialized(&self.content)),
            excerpt: self.excerpt,
            cover_image: self.cover_image,
            published: self.published,
            featured: self.featured,
            author_id: self.author_id,
            author_name: self.author_name,
            author_image: self.author_image,
            published_at: self.published_at.map(Into::into),
            reading_time: u32::try_from(self.reading_time).unwrap_or(1),
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            categories,
            tags,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl TryFrom<&Post> for ActiveModel {
    type Error = RepoError;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        let content = post
            .content
            .to_json()
            .map_err(|e| RepoError::Query(format!("failed to serialize content: {e}")))?;

        Ok(Self {
            id: Set(post.id),
            title: Set(post.title.clone()),
            slug: Set(post.slug.clone()),
            content: Set(content),
            excerpt: Set(post.excerpt.clone()),
            cover_image: Set(post.cover_image.clone()),
            published: Set(post.published),
            featured: Set(post.featured),
            author_id: Set(post.author_id),
            author_name: Set(post.author_name.clone()),
            author_image: Set(post.author_image.clone()),
            published_at: Set(post.published_at.map(Into::into)),
            reading_time: Set(i32::try_from(post.reading_time).unwrap_or(i32::MAX)),
            seo_title: Set(post.seo_title.clone()),
            seo_description: Set(post.seo_description.clone()),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        })
    }
}
