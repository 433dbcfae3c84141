use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecordLabels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecordLabels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecordLabels::Name)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecordLabels::Website).string_len(500))
                    .col(ColumnDef::new(RecordLabels::Country).string_len(50))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecordLabels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RecordLabels {
    Table,
    Id,
    Name,
    Website,
    Country,
}
