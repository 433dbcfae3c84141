pub mod albums;
pub mod artists;
pub mod genres;
pub mod health;
pub mod record_labels;
pub mod reviews;
pub mod tracks;

use axum::{
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};

use crate::state::AppState;

/// Response for a successful create: 201, `Location` header and the stored resource.
pub type Created<T> = (StatusCode, [(header::HeaderName, String); 1], Json<T>);

pub(crate) fn created<T>(resource: &str, id: impl std::fmt::Display, body: T) -> Created<T> {
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/{}/{}", resource, id))],
        Json(body),
    )
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Album endpoints
        .route("/album", get(albums::list_albums).post(albums::create_album))
        .route("/album/search", get(albums::search_albums))
        .route("/album/artist/:artist_id", get(albums::get_albums_by_artist))
        .route("/album/genre/:genre_id", get(albums::get_albums_by_genre))
        .route(
            "/album/recordlabel/:record_label_id",
            get(albums::get_albums_by_record_label),
        )
        .route(
            "/album/:id",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )

        // Artist endpoints
        .route("/artist", get(artists::list_artists).post(artists::create_artist))
        .route(
            "/artist/:id",
            get(artists::get_artist)
                .put(artists::update_artist)
                .delete(artists::delete_artist),
        )

        // Genre endpoints
        .route("/genre", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genre/:id",
            get(genres::get_genre)
                .put(genres::update_genre)
                .delete(genres::delete_genre),
        )

        // Record label endpoints
        .route(
            "/recordlabel",
            get(record_labels::list_record_labels).post(record_labels::create_record_label),
        )
        .route(
            "/recordlabel/:id",
            get(record_labels::get_record_label)
                .put(record_labels::update_record_label)
                .delete(record_labels::delete_record_label),
        )

        // Review endpoints
        .route("/review", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/review/:id",
            get(reviews::get_review)
                .put(reviews::update_review)
                .delete(reviews::delete_review),
        )

        // Track endpoints
        .route("/track", get(tracks::list_tracks).post(tracks::create_track))
        .route(
            "/track/:id",
            get(tracks::get_track)
                .put(tracks::update_track)
                .delete(tracks::delete_track),
        )
}

/// Routes mounted outside `/api`.
pub fn root_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
