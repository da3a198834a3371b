//! Posts, drafts, taxonomy terms and comments.
//!
//! Uniqueness is enforced here: `posts.slug`, and per term kind both
//! `lower(name)` and `slug`. Writers rely on these indexes to detect races.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Excerpt).text().not_null())
                    .col(ColumnDef::new(Posts::CoverImage).string())
                    .col(ColumnDef::new(Posts::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Posts::AuthorName).string().not_null())
                    .col(ColumnDef::new(Posts::AuthorImage).string())
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Posts::ReadingTime).integer().not_null().default(1))
                    .col(ColumnDef::new(Posts::SeoTitle).string().not_null())
                    .col(ColumnDef::new(Posts::SeoDescription).text().not_null())
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_published_at")
                    .table(Posts::Table)
                    .col(Posts::Published)
                    .col(Posts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Terms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Terms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Terms::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Terms::Name).string().not_null())
                    .col(ColumnDef::new(Terms::Slug).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_terms_kind_slug")
                    .table(Terms::Table)
                    .col(Terms::Kind)
                    .col(Terms::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Expression indexes are not expressible through the index builder.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_terms_kind_lower_name ON terms (kind, lower(name))",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTerms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTerms::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTerms::TermId).uuid().not_null())
                    .col(ColumnDef::new(PostTerms::Position).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostTerms::PostId)
                            .col(PostTerms::TermId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_terms_post")
                            .from(PostTerms::Table, PostTerms::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_terms_term")
                            .from(PostTerms::Table, PostTerms::TermId)
                            .to(Terms::Table, Terms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Drafts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Drafts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Drafts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Drafts::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Drafts::Slug).string().not_null().default(""))
                    .col(ColumnDef::new(Drafts::SerializedContent).text().not_null().default(""))
                    .col(ColumnDef::new(Drafts::Excerpt).text().not_null().default(""))
                    .col(ColumnDef::new(Drafts::CoverImage).string())
                    .col(ColumnDef::new(Drafts::Category).string().not_null().default(""))
                    .col(ColumnDef::new(Drafts::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Drafts::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(Drafts::PublishDate).timestamp_with_time_zone())
                    .col(timestamp(Drafts::CreatedAt))
                    .col(timestamp(Drafts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_drafts_author")
                    .table(Drafts::Table)
                    .col(Drafts::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::PostId).uuid().not_null())
                    .col(ColumnDef::new(Comments::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Comments::AuthorName).string().not_null())
                    .col(ColumnDef::new(Comments::Content).text().not_null())
                    .col(timestamp(Comments::CreatedAt))
                    .col(ColumnDef::new(Comments::ReplyToId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post")
                            .from(Comments::Table, Comments::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_reply_to")
                            .from(Comments::Table, Comments::ReplyToId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_post_created")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drafts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostTerms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Terms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Slug,
    Content,
    Excerpt,
    CoverImage,
    Published,
    Featured,
    AuthorId,
    AuthorName,
    AuthorImage,
    PublishedAt,
    ReadingTime,
    SeoTitle,
    SeoDescription,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Terms {
    Table,
    Id,
    Kind,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum PostTerms {
    Table,
    PostId,
    TermId,
    Position,
}

#[derive(DeriveIden)]
enum Drafts {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    SerializedContent,
    Excerpt,
    CoverImage,
    Category,
    Tags,
    Featured,
    PublishDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    AuthorId,
    AuthorName,
    Content,
    CreatedAt,
    ReplyToId,
}
