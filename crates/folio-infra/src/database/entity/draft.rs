//! Draft entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::Draft;

use crate::database::postgres_base::Keyed;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "drafts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub serialized_content: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    /// JSON array of tag names.
    pub tags: Json,
    pub featured: bool,
    pub publish_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Keyed<Uuid> for Draft {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Conversion from SeaORM Model to Domain Draft.
impl From<Model> for Draft {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            slug: model.slug,
            serialized_content: model.serialized_content,
            excerpt: model.excerpt,
            cover_image: model.cover_image,
            category: model.category,
            tags: serde_json::from_value(model.tags).unwrap_or_default(),
            featured: model.featured,
            publish_date: model.publish_date.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Draft to SeaORM ActiveModel.
impl From<Draft> for ActiveModel {
    fn from(draft: Draft) -> Self {
        Self {
            id: Set(draft.id),
            author_id: Set(draft.author_id),
            title: Set(draft.title),
            slug: Set(draft.slug),
            serialized_content: Set(draft.serialized_content),
            excerpt: Set(draft.excerpt),
            cover_image: Set(draft.cover_image),
            category: Set(draft.category),
            tags: Set(Json::from(draft.tags)),
            featured: Set(draft.featured),
            publish_date: Set(draft.publish_date.map(Into::into)),
            created_at: Set(draft.created_at.into()),
            updated_at: Set(draft.updated_at.into()),
        }
    }
}
