use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_artists_table::Artists;
use super::m20250301_000002_create_genres_table::Genres;
use super::m20250301_000003_create_record_labels_table::RecordLabels;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Albums::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Albums::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Albums::Title)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Albums::AlbumArtist).string_len(200))
                    .col(ColumnDef::new(Albums::ArtistId).integer())
                    .col(ColumnDef::new(Albums::GenreId).integer())
                    .col(ColumnDef::new(Albums::RecordLabelId).integer())
                    .col(ColumnDef::new(Albums::ReleaseDate).date())
                    .col(
                        ColumnDef::new(Albums::DurationInSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Albums::CoverImageUrl).string_len(500))
                    .col(ColumnDef::new(Albums::Description).text())
                    .col(
                        ColumnDef::new(Albums::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Albums::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Albums outlive the rows they point at.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_albums_artist_id")
                            .from(Albums::Table, Albums::ArtistId)
                            .to(Artists::Table, Artists::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_albums_genre_id")
                            .from(Albums::Table, Albums::GenreId)
                            .to(Genres::Table, Genres::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_albums_record_label_id")
                            .from(Albums::Table, Albums::RecordLabelId)
                            .to(RecordLabels::Table, RecordLabels::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes
        manager
            .create_index(
                Index::create()
                    .name("idx_albums_artist_id")
                    .table(Albums::Table)
                    .col(Albums::ArtistId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_genre_id")
                    .table(Albums::Table)
                    .col(Albums::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_record_label_id")
                    .table(Albums::Table)
                    .col(Albums::RecordLabelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_release_date")
                    .table(Albums::Table)
                    .col(Albums::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Albums::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Albums {
    Table,
    Id,
    Title,
    AlbumArtist,
    ArtistId,
    GenreId,
    RecordLabelId,
    ReleaseDate,
    DurationInSeconds,
    CoverImageUrl,
    Description,
    CreatedAt,
    UpdatedAt,
}
