//! Create idea table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Idea::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Idea::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Idea::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Idea::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Idea::StatusId).integer().not_null().default(1))
                    .col(ColumnDef::new(Idea::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Idea::Slug).string_len(300).not_null())
                    .col(ColumnDef::new(Idea::Description).text().not_null())
                    .col(ColumnDef::new(Idea::VotesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Idea::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Idea::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_user")
                            .from(Idea::Table, Idea::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_category")
                            .from(Idea::Table, Idea::CategoryId)
                            .to(Category::Table, Category::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_status")
                            .from(Idea::Table, Idea::StatusId)
                            .to(Status::Table, Status::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_idea_slug")
                    .table(Idea::Table)
                    .col(Idea::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status_id (for filtering the board by stage)
        manager
            .create_index(
                Index::create()
                    .name("idx_idea_status_id")
                    .table(Idea::Table)
                    .col(Idea::StatusId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Idea::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Idea {
    Table,
    Id,
    UserId,
    CategoryId,
    StatusId,
    Title,
    Slug,
    Description,
    VotesCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum Status {
    Table,
    Id,
}
