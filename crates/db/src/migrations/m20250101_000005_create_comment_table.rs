//! Create comment table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comment::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Comment::IdeaId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Comment::Body).text().not_null())
                    .col(ColumnDef::new(Comment::SpamReports).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Comment::IsStatusUpdate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Comment::StatusId).integer())
                    .col(
                        ColumnDef::new(Comment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Comment::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_idea")
                            .from(Comment::Table, Comment::IdeaId)
                            .to(Idea::Table, Idea::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(Comment::Table, Comment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_status")
                            .from(Comment::Table, Comment::StatusId)
                            .to(Status::Table, Status::Id),
                    )
                    .check(
                        Expr::col(Comment::IsStatusUpdate)
                            .eq(false)
                            .or(Expr::col(Comment::StatusId).is_not_null()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (idea_id, created_at) (for the idea page comment list)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_idea_created_at")
                    .table(Comment::Table)
                    .col(Comment::IdeaId)
                    .col(Comment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Comment {
    Table,
    Id,
    IdeaId,
    UserId,
    Body,
    SpamReports,
    IsStatusUpdate,
    StatusId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Idea {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Status {
    Table,
    Id,
}
