//! Category and tag entity. Both taxonomies share one table keyed by `kind`.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::{Term, TermKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "terms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_term::Entity")]
    PostTerm,
}

impl Related<super::post_term::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostTerm.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_kind(&self, kind: TermKind) -> bool {
        self.kind == kind.as_str()
    }
}

impl From<Model> for Term {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
        }
    }
}

impl ActiveModel {
    pub fn from_term(kind: TermKind, term: Term) -> Self {
        Self {
            id: Set(term.id),
            kind: Set(kind.as_str().to_string()),
            name: Set(term.name),
            slug: Set(term.slug),
        }
    }
}
