//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use folio_core::domain::{Comment, Draft, Post, Term, TermKind};
use folio_core::error::RepoError;
use folio_core::ports::{
    BaseRepository, CommentRepository, DraftRepository, PostRepository, TermRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::draft::{self, Entity as DraftEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_term::{self, Entity as PostTermEntity};
use super::entity::term::{self, Entity as TermEntity};
use super::postgres_base::{PostgresBaseRepository, sql_err};

/// PostgreSQL draft repository.
pub type PostgresDraftRepository = PostgresBaseRepository<DraftEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl DraftRepository for PostgresDraftRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Draft>, RepoError> {
        let result = DraftEntity::find()
            .filter(draft::Column::AuthorId.eq(author_id))
            .order_by_desc(draft::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(sql_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(sql_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_with_replies(&self, id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::Id.eq(id))
                    .add(comment::Column::ReplyToId.eq(id)),
            )
            .exec(&self.db)
            .await
            .map_err(sql_err)?;

        Ok(result.rows_affected)
    }
}

/// PostgreSQL post repository. Posts are written together with their
/// taxonomy links in one transaction.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Attaches categories and tags to loaded rows, keeping row order.
    async fn hydrate(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTermEntity::find()
            .filter(post_term::Column::PostId.is_in(post_ids))
            .order_by_asc(post_term::Column::Position)
            .all(&self.db)
            .await
            .map_err(sql_err)?;

        let terms: HashMap<Uuid, term::Model> = if links.is_empty() {
            HashMap::new()
        } else {
            let term_ids: Vec<Uuid> = links.iter().map(|l| l.term_id).collect();
            TermEntity::find()
                .filter(term::Column::Id.is_in(term_ids))
                .all(&self.db)
                .await
                .map_err(sql_err)?
                .into_iter()
                .map(|t| (t.id, t))
                .collect()
        };

        let posts = models
            .into_iter()
            .map(|model| {
                let mut categories = Vec::new();
                let mut tags = Vec::new();
                for link in links.iter().filter(|l| l.post_id == model.id) {
                    let Some(term) = terms.get(&link.term_id) else {
                        continue;
                    };
                    if term.is_kind(TermKind::Category) {
                        categories.push(Term::from(term.clone()));
                    } else {
                        tags.push(Term::from(term.clone()));
                    }
                }
                model.into_post(categories, tags)
            })
            .collect();

        Ok(posts)
    }

    async fn hydrate_one(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.hydrate(vec![model]).await?.into_iter().next()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(sql_err)?;
        self.hydrate_one(model).await
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let active_model = post::ActiveModel::try_from(&post)?;
        let links: Vec<post_term::ActiveModel> = post
            .categories
            .iter()
            .chain(post.tags.iter())
            .enumerate()
            .map(|(position, term)| post_term::ActiveModel {
                post_id: Set(post.id),
                term_id: Set(term.id),
                position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            })
            .collect();

        let txn = self.db.begin().await.map_err(sql_err)?;

        let exists = PostEntity::find_by_id(post.id)
            .one(&txn)
            .await
            .map_err(sql_err)?
            .is_some();
        if exists {
            active_model.update(&txn).await.map_err(sql_err)?;
        } else {
            active_model.insert(&txn).await.map_err(sql_err)?;
        }

        PostTermEntity::delete_many()
            .filter(post_term::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(sql_err)?;
        if !links.is_empty() {
            PostTermEntity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(sql_err)?;
        }

        txn.commit().await.map_err(sql_err)?;
        tracing::debug!(post_id = %post.id, slug = %post.slug, "post saved");
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(sql_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(sql_err)?;
        self.hydrate_one(model).await
    }

    async fn list_published(
        &self,
        now: DateTime<Utc>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::Published.eq(true))
            .filter(post::Column::PublishedAt.lte(now))
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(sql_err)?;
        self.hydrate(models).await
    }
}

/// PostgreSQL storage for one taxonomy.
pub struct PostgresTermRepository {
    db: DbConn,
    kind: TermKind,
}

impl PostgresTermRepository {
    pub fn new(db: DbConn, kind: TermKind) -> Self {
        Self { db, kind }
    }
}

#[async_trait]
impl TermRepository for PostgresTermRepository {
    fn kind(&self) -> TermKind {
        self.kind
    }

    async fn find_matching(&self, name: &str, slug: &str) -> Result<Option<Term>, RepoError> {
        let result = TermEntity::find()
            .filter(term::Column::Kind.eq(self.kind.as_str()))
            .filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(term::Column::Name))).eq(name.to_lowercase()))
                    .add(term::Column::Slug.eq(slug)),
            )
            .one(&self.db)
            .await
            .map_err(sql_err)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, term: Term) -> Result<Term, RepoError> {
        let model = term::ActiveModel::from_term(self.kind, term)
            .insert(&self.db)
            .await
            .map_err(sql_err)?;
        tracing::debug!(kind = %self.kind, name = %model.name, "term created");
        Ok(model.into())
    }

    async fn list(&self) -> Result<Vec<Term>, RepoError> {
        let result = TermEntity::find()
            .filter(term::Column::Kind.eq(self.kind.as_str()))
            .order_by_asc(term::Column::Name)
            .all(&self.db)
            .await
            .map_err(sql_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
