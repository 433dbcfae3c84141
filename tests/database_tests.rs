//! Database integration tests
//!
//! Exercises the repositories and unit of work against a migrated schema:
//! - Generic CRUD through `Repository<E>`
//! - Foreign key behaviour (cascade vs set null)
//! - Album detail loading, filters and search paging
//! - Atomic commits

use chrono::NaiveDate;
use sea_orm::{ActiveValue::NotSet, ColumnTrait, EntityTrait, Set};
use tokio_test::{assert_err, assert_ok};

use music_catalog::db::entities::{album, artist, genre, review, track};
use music_catalog::db::repositories::{Repository, UnitOfWork};
use music_catalog::test_utils::*;

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[tokio::test]
async fn test_create_and_read_artist_through_repository() {
    let db = setup_test_db().await;
    let uow = UnitOfWork::new(db);

    let now = chrono::Utc::now().into();
    let staged = uow.artists().add(artist::ActiveModel {
        id: NotSet,
        name: Set("The Beatles".to_string()),
        bio: Set(None),
        country: Set(Some("United Kingdom".to_string())),
        website: Set(None),
        image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    });
    assert_ok!(uow.save_changes().await);

    let stored = staged.into_saved().unwrap();
    assert!(stored.id > 0);
    assert!(stored.created_at.timestamp() > 0);

    let fetched = uow.artists().get_by_id(stored.id).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(uow.artists().get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_by_id_miss_is_none() {
    let db = setup_test_db().await;
    let uow = UnitOfWork::new(db);

    assert_eq!(uow.albums().get_by_id(42).await.unwrap(), None);
    assert_eq!(uow.albums().get_with_details(42).await.unwrap(), None);
}

#[tokio::test]
async fn test_update_overwrites_every_field() {
    let db = setup_test_db().await;
    let genre = create_test_genre(&db, "Rock").await;
    let uow = UnitOfWork::new(db);

    let mut changed = genre.clone();
    changed.name = "Rock and Roll".to_string();
    changed.description = Some("Loud".to_string());
    uow.genres().update(changed.clone());
    assert_eq!(uow.save_changes().await.unwrap(), 1);

    assert_eq!(uow.genres().get_by_id(genre.id).await.unwrap(), Some(changed));
}

#[tokio::test]
async fn test_deleting_album_cascades_to_tracks_and_reviews() {
    let db = setup_test_db().await;
    let album = create_test_album(&db, "Abbey Road", None, date(1969, 9, 26)).await;
    let track = create_test_track(&db, album.id, "Come Together", 1).await;
    let user = create_test_user(&db, "critic").await;
    let review = create_test_review(&db, album.id, &user.id, 5).await;

    let uow = UnitOfWork::new(db);
    uow.albums().remove(album);
    uow.save_changes().await.unwrap();

    assert_eq!(uow.tracks().get_by_id(track.id).await.unwrap(), None);
    assert_eq!(uow.reviews().get_by_id(review.id).await.unwrap(), None);
    assert!(uow.users().get_by_id(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleting_artist_unlinks_albums() {
    let db = setup_test_db().await;
    let artist = create_test_artist(&db, "Queen").await;
    let label = create_test_record_label(&db, "EMI").await;
    let album = create_test_album(&db, "A Kind of Magic", Some(artist.id), date(1986, 6, 2)).await;

    let uow = UnitOfWork::new(db);
    let mut linked = album.clone();
    linked.record_label_id = Some(label.id);
    uow.albums().update(linked);
    uow.save_changes().await.unwrap();

    uow.artists().remove(artist);
    uow.record_labels().remove(label);
    uow.save_changes().await.unwrap();

    let details = uow.albums().get_with_details(album.id).await.unwrap().unwrap();
    assert_eq!(details.album.artist_id, None);
    assert_eq!(details.album.record_label_id, None);
    assert_eq!(details.artist, None);
    assert_eq!(details.record_label, None);
}

#[tokio::test]
async fn test_track_requires_existing_album() {
    let db = setup_test_db().await;
    let uow = UnitOfWork::new(db);

    uow.tracks().add(track::ActiveModel {
        id: NotSet,
        title: Set("Orphan".to_string()),
        track_number: Set(1),
        duration_in_seconds: Set(100),
        album_id: Set(99999),
    });

    assert_err!(uow.save_changes().await);
    assert!(uow.tracks().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_review_rating_is_checked_by_schema() {
    let db = setup_test_db().await;
    let album = create_test_album(&db, "Thriller", None, None).await;
    let user = create_test_user(&db, "fan").await;
    let uow = UnitOfWork::new(db);

    let now = chrono::Utc::now().into();
    uow.reviews().add(review::ActiveModel {
        id: NotSet,
        album_id: Set(album.id),
        user_id: Set(user.id),
        rating: Set(6),
        comment: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    });

    assert_err!(uow.save_changes().await);
}

#[tokio::test]
async fn test_album_details_load_every_relation() {
    let db = setup_test_db().await;
    let artist = create_test_artist(&db, "Michael Jackson").await;
    let genre = create_test_genre(&db, "Pop").await;
    let album = create_test_album(&db, "Thriller", Some(artist.id), date(1982, 11, 30)).await;
    create_test_track(&db, album.id, "Beat It", 2).await;
    create_test_track(&db, album.id, "Wanna Be Startin' Somethin'", 1).await;
    let user = create_test_user(&db, "listener").await;
    create_test_review(&db, album.id, &user.id, 5).await;

    let uow = UnitOfWork::new(db);
    let mut with_genre = album.clone();
    with_genre.genre_id = Some(genre.id);
    uow.albums().update(with_genre);
    uow.save_changes().await.unwrap();

    let details = uow.albums().get_with_details(album.id).await.unwrap().unwrap();
    assert_eq!(details.artist.map(|a| a.name), Some("Michael Jackson".to_string()));
    assert_eq!(details.genre.map(|g| g.name), Some("Pop".to_string()));
    assert_eq!(details.record_label, None);

    let numbers: Vec<i32> = details.tracks.iter().map(|t| t.track_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    assert_eq!(details.reviews.len(), 1);
    assert_eq!(
        details.reviews[0].user.as_ref().map(|u| u.username.as_str()),
        Some("listener")
    );
}

#[tokio::test]
async fn test_filters_sort_newest_first() {
    let db = setup_test_db().await;
    let artist = create_test_artist(&db, "Taylor Swift").await;
    create_test_album(&db, "Fearless", Some(artist.id), date(2008, 11, 11)).await;
    create_test_album(&db, "Folklore", Some(artist.id), date(2020, 7, 24)).await;
    create_test_album(&db, "1989", Some(artist.id), date(2014, 10, 27)).await;
    create_test_album(&db, "Someone Else", None, date(2021, 1, 1)).await;

    let uow = UnitOfWork::new(db);
    let titles: Vec<String> = uow
        .albums()
        .get_by_artist(artist.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.album.title)
        .collect();

    assert_eq!(titles, vec!["Folklore", "1989", "Fearless"]);
    assert!(uow.albums().get_by_genre(1).await.unwrap().is_empty());
    assert!(uow.albums().get_by_record_label(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_title_artist_and_credit() {
    let db = setup_test_db().await;
    let beatles = create_test_artist(&db, "The Beatles").await;
    create_test_album(&db, "Abbey Road", None, date(1969, 9, 26)).await;
    create_test_album(&db, "Let It Be", Some(beatles.id), date(1970, 5, 8)).await;
    let credited = create_test_album(&db, "Compilation", None, date(1990, 1, 1)).await;
    create_test_album(&db, "Unrelated", None, date(2000, 1, 1)).await;

    let uow = UnitOfWork::new(db);
    let mut with_credit = credited.clone();
    with_credit.album_artist = Some("ABBEY Singers".to_string());
    uow.albums().update(with_credit);
    uow.save_changes().await.unwrap();

    let titles = |found: Vec<music_catalog::db::repositories::AlbumDetails>| {
        found.into_iter().map(|d| d.album.title).collect::<Vec<_>>()
    };

    assert_eq!(
        titles(uow.albums().search("abbey", 1, 10).await.unwrap()),
        vec!["Compilation", "Abbey Road"]
    );
    assert_eq!(
        titles(uow.albums().search("BEATLES", 1, 10).await.unwrap()),
        vec!["Let It Be"]
    );
    assert!(uow.albums().search("zzz", 1, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_treats_like_wildcards_literally() {
    let db = setup_test_db().await;
    create_test_album(&db, "abc", None, date(2001, 1, 1)).await;
    create_test_album(&db, "50 Percent", None, date(2002, 1, 1)).await;
    create_test_album(&db, "100% Hits", None, date(2003, 1, 1)).await;
    create_test_album(&db, "a_c Sessions", None, date(2004, 1, 1)).await;

    let uow = UnitOfWork::new(db);
    let titles = |found: Vec<music_catalog::db::repositories::AlbumDetails>| {
        found.into_iter().map(|d| d.album.title).collect::<Vec<_>>()
    };

    assert_eq!(
        titles(uow.albums().search("a_c", 1, 10).await.unwrap()),
        vec!["a_c Sessions"]
    );
    assert_eq!(
        titles(uow.albums().search("%", 1, 10).await.unwrap()),
        vec!["100% Hits"]
    );
    assert!(uow.albums().search("\\", 1, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_non_ascii_terms_as_written() {
    let db = setup_test_db().await;
    create_test_album(&db, "Édith Piaf Live", None, None).await;

    let uow = UnitOfWork::new(db);
    assert_eq!(uow.albums().search("Édith", 1, 10).await.unwrap().len(), 1);
    assert_eq!(uow.albums().search("PIAF", 1, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_page_past_any_offset_is_empty() {
    let db = setup_test_db().await;
    create_test_album(&db, "Mix", None, None).await;

    let uow = UnitOfWork::new(db);
    assert!(uow
        .albums()
        .search("mix", i64::MAX as u64, 100)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_search_blank_term_returns_everything_unpaged() {
    let db = setup_test_db().await;
    for i in 0..12 {
        create_test_album(&db, &format!("Album {}", i), None, None).await;
    }

    let uow = UnitOfWork::new(db);
    assert_eq!(uow.albums().search("", 1, 10).await.unwrap().len(), 12);
    assert_eq!(uow.albums().search("   ", 3, 1).await.unwrap().len(), 12);
}

#[tokio::test]
async fn test_search_pages_by_release_date() {
    let db = setup_test_db().await;
    for year in 2001..=2012 {
        create_test_album(&db, &format!("Mix {}", year), None, date(year, 1, 1)).await;
    }

    let uow = UnitOfWork::new(db);
    let page: Vec<String> = uow
        .albums()
        .search("mix", 2, 5)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.album.title)
        .collect();

    assert_eq!(
        page,
        vec!["Mix 2007", "Mix 2006", "Mix 2005", "Mix 2004", "Mix 2003"]
    );
    assert_eq!(uow.albums().search("mix", 3, 5).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_query_handle_composes_filters() {
    let db = setup_test_db().await;
    for name in ["Jazz", "Blues", "Rock", "Rockabilly"] {
        create_test_genre(&db, name).await;
    }

    let uow = UnitOfWork::new(db.clone());
    let rock = uow
        .genres()
        .query()
        .filter(genre::Column::Name.starts_with("Rock"))
        .order_by_desc(genre::Column::Name)
        .limit(1)
        .all()
        .await
        .unwrap();
    assert_eq!(rock[0].name, "Rockabilly");

    let count = uow
        .genres()
        .query()
        .filter(genre::Column::Name.contains("s"))
        .count()
        .await
        .unwrap();
    assert_eq!(count, 1);

    let select = uow.albums().query().into_select();
    assert!(select.all(&db).await.unwrap().is_empty());
    assert!(album::Entity::find().all(&db).await.unwrap().is_empty());
}
