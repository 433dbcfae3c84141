//! Integration tests for the artist, genre, record label, track and review routes

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use fake::{
    faker::{company::en::CompanyName, lorem::en::Sentence, name::en::Name},
    Fake,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use music_catalog::handlers;
use music_catalog::state::AppState;
use music_catalog::test_utils::*;

fn create_test_router(state: &AppState) -> Router {
    Router::new()
        .nest("/api", handlers::api_routes())
        .with_state(state.clone())
}

async fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: axum::response::Response,
) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn request(
    state: &AppState,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> axum::response::Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };

    create_test_router(state)
        .oneshot(request.unwrap())
        .await
        .unwrap()
}

/// POST `body` and return the created resource id after checking status and Location.
async fn create(state: &AppState, resource: &str, body: Value) -> (i64, Value) {
    let response = request(state, Method::POST, &format!("/api/{}", resource), Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let created: Value = parse_json_response(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/{}/{}", resource, id));

    (id, created)
}

#[tokio::test]
async fn test_artist_crud() {
    let state = setup_test_app_state().await;
    let name: String = Name().fake();

    let (id, created) = create(
        &state,
        "artist",
        json!({ "name": name, "country": "Iceland", "website": "https://example.com" }),
    )
    .await;
    assert_eq!(created["name"], name);
    assert_eq!(created["country"], "Iceland");
    assert_eq!(created["bio"], Value::Null);

    let response = request(&state, Method::GET, "/api/artist", None).await;
    let list: Vec<Value> = parse_json_response(response).await;
    assert_eq!(list.len(), 1);

    let response = request(
        &state,
        Method::PUT,
        &format!("/api/artist/{}", id),
        Some(json!({ "name": "Björk", "bio": "Singer" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(&state, Method::GET, &format!("/api/artist/{}", id), None).await;
    let fetched: Value = parse_json_response(response).await;
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["name"], "Björk");
    assert_eq!(fetched["bio"], "Singer");
    assert_eq!(fetched["country"], Value::Null);

    let response = request(&state, Method::DELETE, &format!("/api/artist/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = request(&state, Method::GET, &format!("/api/artist/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_artist_validation() {
    let state = setup_test_app_state().await;

    let response = request(&state, Method::POST, "/api/artist", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = parse_json_response(response).await;
    assert_eq!(body["errors"]["name"][0], "The name field is required.");

    let response = request(
        &state,
        Method::POST,
        "/api/artist",
        Some(json!({ "name": "x".repeat(101) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request(
        &state,
        Method::PUT,
        "/api/artist/12345",
        Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_crud() {
    let state = setup_test_app_state().await;
    let description: String = Sentence(3..8).fake();

    let (id, created) = create(
        &state,
        "genre",
        json!({ "name": "Shoegaze", "description": description }),
    )
    .await;
    assert_eq!(created["description"], description);

    let response = request(&state, Method::GET, &format!("/api/genre/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = parse_json_response(response).await;
    assert_eq!(fetched, created);

    let response = request(
        &state,
        Method::PUT,
        &format!("/api/genre/{}", id),
        Some(json!({ "name": "Dream Pop" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(&state, Method::GET, "/api/genre", None).await;
    let list: Vec<Value> = parse_json_response(response).await;
    assert_eq!(list, vec![json!({ "id": id, "name": "Dream Pop", "description": null })]);

    let response = request(&state, Method::DELETE, &format!("/api/genre/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_genre_description_limit() {
    let state = setup_test_app_state().await;

    let response = request(
        &state,
        Method::POST,
        "/api/genre",
        Some(json!({ "name": "Noise", "description": "x".repeat(501) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = parse_json_response(response).await;
    assert!(body["errors"]["description"].is_array());
}

#[tokio::test]
async fn test_record_label_crud() {
    let state = setup_test_app_state().await;
    let name: String = CompanyName().fake();

    let (id, created) = create(
        &state,
        "recordlabel",
        json!({ "name": name, "labelCode": "LC-0001", "country": "Japan" }),
    )
    .await;
    assert_eq!(created, json!({ "id": id, "name": name, "website": null, "country": "Japan" }));

    let response = request(
        &state,
        Method::PUT,
        &format!("/api/recordlabel/{}", id),
        Some(json!({ "name": name, "country": "x".repeat(51) })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request(&state, Method::DELETE, &format!("/api/recordlabel/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = request(&state, Method::DELETE, &format!("/api/recordlabel/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_track_crud() {
    let state = setup_test_app_state().await;
    let album = create_test_album(&state.db, "Kind of Blue", None, None).await;

    let (id, created) = create(
        &state,
        "track",
        json!({ "title": "So What", "durationInSeconds": 562, "albumId": album.id }),
    )
    .await;
    assert_eq!(created["trackNumber"], 1);
    assert_eq!(created["albumId"], album.id);

    let response = request(
        &state,
        Method::PUT,
        &format!("/api/track/{}", id),
        Some(json!({
            "title": "Freddie Freeloader",
            "durationInSeconds": 589,
            "albumId": album.id,
            "trackNumber": 2
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(&state, Method::GET, &format!("/api/track/{}", id), None).await;
    let fetched: Value = parse_json_response(response).await;
    assert_eq!(fetched["title"], "Freddie Freeloader");
    assert_eq!(fetched["trackNumber"], 2);

    let response = request(&state, Method::DELETE, &format!("/api/track/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = request(&state, Method::GET, "/api/track", None).await;
    let list: Vec<Value> = parse_json_response(response).await;
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_track_validation() {
    let state = setup_test_app_state().await;

    let response = request(
        &state,
        Method::POST,
        "/api/track",
        Some(json!({ "title": "No Duration" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = parse_json_response(response).await;
    assert!(body["errors"]["durationInSeconds"].is_array());
    assert!(body["errors"]["albumId"].is_array());
}

#[tokio::test]
async fn test_track_for_missing_album_fails_at_commit() {
    let state = setup_test_app_state().await;

    let response = request(
        &state,
        Method::POST,
        "/api/track",
        Some(json!({ "title": "Lost", "durationInSeconds": 10, "albumId": 4242 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = parse_json_response(response).await;
    assert_eq!(body["error"], "Database error occurred");
}

#[tokio::test]
async fn test_review_crud() {
    let state = setup_test_app_state().await;
    let album = create_test_album(&state.db, "Blue", None, None).await;
    let user = create_test_user(&state.db, "joni_fan").await;
    let comment: String = Sentence(4..10).fake();

    let (id, created) = create(
        &state,
        "review",
        json!({ "albumId": album.id, "rating": 5, "comment": comment, "userId": user.id }),
    )
    .await;
    assert_eq!(created["rating"], 5);
    assert_eq!(created["comment"], comment);
    assert_eq!(created["username"], "joni_fan");
    assert!(created["createdAt"].is_string());

    let response = request(
        &state,
        Method::PUT,
        &format!("/api/review/{}", id),
        Some(json!({ "albumId": album.id, "rating": 3, "userId": user.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = request(&state, Method::GET, "/api/review", None).await;
    let list: Vec<Value> = parse_json_response(response).await;
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["rating"], 3);
    assert_eq!(list[0]["comment"], Value::Null);
    assert_eq!(list[0]["username"], "joni_fan");

    let response = request(&state, Method::GET, &format!("/api/album/{}", album.id), None).await;
    let album_body: Value = parse_json_response(response).await;
    assert_eq!(album_body["averageRating"], 3.0);
    assert_eq!(album_body["reviewCount"], 1);

    let response = request(&state, Method::DELETE, &format!("/api/review/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_review_validation() {
    let state = setup_test_app_state().await;
    let album = create_test_album(&state.db, "Court and Spark", None, None).await;

    for rating in [0, 6] {
        let response = request(
            &state,
            Method::POST,
            "/api/review",
            Some(json!({ "albumId": album.id, "rating": rating, "userId": "someone" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = parse_json_response(response).await;
        assert!(body["errors"]["rating"].is_array());
    }

    let response = request(
        &state,
        Method::POST,
        "/api/review",
        Some(json!({ "albumId": album.id, "rating": 4 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = parse_json_response(response).await;
    assert_eq!(body["errors"]["userId"][0], "The userId field is required.");
}
