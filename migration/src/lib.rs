pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_artists_table;
mod m20250301_000002_create_genres_table;
mod m20250301_000003_create_record_labels_table;
mod m20250301_000004_create_albums_table;
mod m20250301_000005_create_tracks_table;
mod m20250301_000006_create_users_table;
mod m20250301_000007_create_reviews_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_artists_table::Migration),
            Box::new(m20250301_000002_create_genres_table::Migration),
            Box::new(m20250301_000003_create_record_labels_table::Migration),
            Box::new(m20250301_000004_create_albums_table::Migration),
            Box::new(m20250301_000005_create_tracks_table::Migration),
            Box::new(m20250301_000006_create_users_table::Migration),
            Box::new(m20250301_000007_create_reviews_table::Migration),
        ]
    }
}
