use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    Content,
    Completed,
    DateCreated,
}

const IDX_TASK_DATE_CREATED: &str = "idx-task-date_created";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // pk_auto emits AUTOINCREMENT on SQLite, so ids of deleted rows are never handed out again
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(string_len(Task::Content, 200))
                    .col(integer(Task::Completed).default(0))
                    .col(timestamp_with_time_zone(Task::DateCreated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TASK_DATE_CREATED)
                    .table(Task::Table)
                    .col(Task::DateCreated)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_TASK_DATE_CREATED)
                    .table(Task::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await
    }
}
