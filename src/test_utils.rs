//! Test utilities for Music Catalog
//!
//! Provides helpers for creating isolated test environments with:
//! - In-memory SQLite databases (one per test)
//! - AppState factories
//! - Test data generators

use chrono::{NaiveDate, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use crate::{
    config::{Config, LogFormat},
    db::entities::{album, artist, genre, record_label, review, track, user},
    services::PasswordCredentials,
    state::AppState,
};

/// Setup an in-memory SQLite database with all migrations applied
///
/// Each call creates a fresh, isolated database perfect for parallel testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run all migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create a test configuration with sensible defaults
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 3000,
        run_migrations: true,
        seed_database: false,
        log_format: LogFormat::Pretty,
    }
}

/// Create a complete test AppState with an isolated database
pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    AppState::new(db, test_config())
}

// ============================================================================
// Test Data Factories
// ============================================================================

/// Create a test artist in the database
pub async fn create_test_artist(db: &DatabaseConnection, name: &str) -> artist::Model {
    let now = Utc::now().into();
    let artist = artist::ActiveModel {
        name: Set(name.to_string()),
        bio: Set(None),
        country: Set(None),
        website: Set(None),
        image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    artist.insert(db).await.expect("Failed to insert test artist")
}

pub async fn create_test_genre(db: &DatabaseConnection, name: &str) -> genre::Model {
    let genre = genre::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        ..Default::default()
    };

    genre.insert(db).await.expect("Failed to insert test genre")
}

pub async fn create_test_record_label(db: &DatabaseConnection, name: &str) -> record_label::Model {
    let label = record_label::ActiveModel {
        name: Set(name.to_string()),
        website: Set(None),
        country: Set(None),
        ..Default::default()
    };

    label.insert(db).await.expect("Failed to insert test record label")
}

/// Create a test album in the database, optionally linked to an artist
pub async fn create_test_album(
    db: &DatabaseConnection,
    title: &str,
    artist_id: Option<i32>,
    release_date: Option<NaiveDate>,
) -> album::Model {
    let now = Utc::now().into();
    let album = album::ActiveModel {
        title: Set(title.to_string()),
        album_artist: Set(None),
        artist_id: Set(artist_id),
        genre_id: Set(None),
        record_label_id: Set(None),
        release_date: Set(release_date),
        duration_in_seconds: Set(0),
        cover_image_url: Set(None),
        description: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    album.insert(db).await.expect("Failed to insert test album")
}

pub async fn create_test_track(
    db: &DatabaseConnection,
    album_id: i32,
    title: &str,
    track_number: i32,
) -> track::Model {
    let track = track::ActiveModel {
        title: Set(title.to_string()),
        track_number: Set(track_number),
        duration_in_seconds: Set(180),
        album_id: Set(album_id),
        ..Default::default()
    };

    track.insert(db).await.expect("Failed to insert test track")
}

/// Create a test user whose password is `password`
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> user::Model {
    let now = Utc::now().into();
    let credentials = PasswordCredentials::new("password").expect("Failed to hash test password");
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(credentials.hash),
        password_salt: Set(credentials.salt),
        role: Set(Some(user::DEFAULT_ROLE.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user.insert(db).await.expect("Failed to insert test user")
}

pub async fn create_test_review(
    db: &DatabaseConnection,
    album_id: i32,
    user_id: &str,
    rating: i32,
) -> review::Model {
    let now = Utc::now().into();
    let review = review::ActiveModel {
        album_id: Set(album_id),
        user_id: Set(user_id.to_string()),
        rating: Set(rating),
        comment: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    review.insert(db).await.expect("Failed to insert test review")
}
