//! Create category and status tables, seeded with the default board stages.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const STATUSES: [(i32, &str); 5] = [
    (1, "Open"),
    (2, "Considering"),
    (3, "In Progress"),
    (4, "Implemented"),
    (5, "Closed"),
];

const CATEGORIES: [(i32, &str); 4] = [
    (1, "Category 1"),
    (2, "Category 2"),
    (3, "Category 3"),
    (4, "Category 4"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Category::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Category::Name).string_len(128).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Status::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Status::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Status::Name).string_len(64).not_null())
                    .to_owned(),
            )
            .await?;

        let mut statuses = Query::insert();
        statuses
            .into_table(Status::Table)
            .columns([Status::Id, Status::Name]);
        for (id, name) in STATUSES {
            statuses.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(statuses.to_owned()).await?;

        let mut categories = Query::insert();
        categories
            .into_table(Category::Table)
            .columns([Category::Id, Category::Name]);
        for (id, name) in CATEGORIES {
            categories.values_panic([id.into(), name.into()]);
        }
        manager.exec_stmt(categories.to_owned()).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Status::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Status {
    Table,
    Id,
    Name,
}
