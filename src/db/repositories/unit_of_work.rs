use sea_orm::DatabaseConnection;

use super::{
    AlbumRepository, ArtistRepository, DbContext, GenreRepository, RecordLabelRepository,
    ReviewRepository, TrackRepository, UserRepository,
};
use crate::error::Result;

/// One persistence context shared by every repository it hands out.
///
/// Changes staged through any repository are committed together by
/// [`UnitOfWork::save_changes`]. Dropping the unit discards whatever is
/// still pending.
#[derive(Debug)]
pub struct UnitOfWork {
    context: DbContext,
}

impl UnitOfWork {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self {
            context: DbContext::new(connection),
        }
    }

    pub fn artists(&self) -> ArtistRepository<'_> {
        ArtistRepository::new(&self.context)
    }

    pub fn albums(&self) -> AlbumRepository<'_> {
        AlbumRepository::new(&self.context)
    }

    pub fn tracks(&self) -> TrackRepository<'_> {
        TrackRepository::new(&self.context)
    }

    pub fn genres(&self) -> GenreRepository<'_> {
        GenreRepository::new(&self.context)
    }

    pub fn record_labels(&self) -> RecordLabelRepository<'_> {
        RecordLabelRepository::new(&self.context)
    }

    pub fn reviews(&self) -> ReviewRepository<'_> {
        ReviewRepository::new(&self.context)
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.context)
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.context.connection()
    }

    pub fn has_changes(&self) -> bool {
        self.context.has_changes()
    }

    /// Commit every staged change atomically, returning the rows affected.
    pub async fn save_changes(&self) -> Result<u64> {
        self.context.save_changes().await
    }

    /// Release the unit, discarding any unsaved changes.
    pub fn dispose(self) {}
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        let discarded = self.context.discard_changes();
        if discarded > 0 {
            tracing::warn!("Unit of work dropped with {} unsaved change(s)", discarded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::{album, artist, genre, track};
    use crate::db::repositories::Repository;
    use crate::test_utils::{create_test_artist, setup_test_db};
    use pretty_assertions::assert_eq;
    use sea_orm::{ActiveValue::NotSet, ColumnTrait, Set};

    fn new_genre(name: &str) -> genre::ActiveModel {
        genre::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(None),
        }
    }

    #[tokio::test]
    async fn test_staged_insert_is_invisible_until_saved() {
        let db = setup_test_db().await;
        let uow = UnitOfWork::new(db);

        let staged = uow.genres().add(new_genre("Jazz"));
        assert!(uow.has_changes());
        assert!(!staged.is_saved());
        assert!(uow.genres().get_all().await.unwrap().is_empty());

        assert_eq!(uow.save_changes().await.unwrap(), 1);
        assert!(!uow.has_changes());

        let saved = staged.into_saved().unwrap();
        assert!(saved.id > 0);
        assert_eq!(
            uow.genres().get_by_id(saved.id).await.unwrap(),
            Some(saved)
        );
    }

    #[tokio::test]
    async fn test_save_without_changes_is_a_no_op() {
        let db = setup_test_db().await;
        let uow = UnitOfWork::new(db);

        assert_eq!(uow.save_changes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_changes_across_repositories_commit_together() {
        let db = setup_test_db().await;
        let artist = create_test_artist(&db, "Miles Davis").await;
        let uow = UnitOfWork::new(db);

        let mut renamed = artist.clone();
        renamed.name = "Miles Dewey Davis".to_string();
        uow.artists().update(renamed);
        uow.genres().add(new_genre("Bebop"));

        assert_eq!(uow.save_changes().await.unwrap(), 2);
        assert_eq!(
            uow.artists().get_by_id(artist.id).await.unwrap().unwrap().name,
            "Miles Dewey Davis"
        );
        assert_eq!(uow.genres().query().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_every_change() {
        let db = setup_test_db().await;
        let uow = UnitOfWork::new(db);

        uow.genres().add(new_genre("Soul"));
        // A track pointing at an album that does not exist.
        uow.tracks().add(track::ActiveModel {
            id: NotSet,
            title: Set("Orphan".to_string()),
            track_number: Set(1),
            duration_in_seconds: Set(60),
            album_id: Set(9999),
        });

        assert!(uow.save_changes().await.is_err());
        assert!(!uow.has_changes());
        assert!(uow.genres().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropping_unit_discards_pending_changes() {
        let db = setup_test_db().await;

        let uow = UnitOfWork::new(db.clone());
        uow.genres().add(new_genre("Blues"));
        uow.dispose();

        let uow = UnitOfWork::new(db);
        assert!(!uow.has_changes());
        assert!(uow.genres().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_query_handle() {
        let db = setup_test_db().await;
        let keep = create_test_artist(&db, "Nina Simone").await;
        let gone = create_test_artist(&db, "Sun Ra").await;
        let uow = UnitOfWork::new(db);

        uow.artists().remove(gone.clone());
        uow.save_changes().await.unwrap();

        let names: Vec<String> = uow
            .artists()
            .query()
            .order_by_asc(artist::Column::Name)
            .all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec![keep.name]);
        assert_eq!(uow.artists().get_by_id(gone.id).await.unwrap(), None);

        let none = uow
            .albums()
            .query()
            .filter(album::Column::Title.contains("anything"))
            .one()
            .await
            .unwrap();
        assert_eq!(none, None);
    }
}
