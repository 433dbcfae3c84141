use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::album,
    db::repositories::{AlbumDetails, Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDto {
    pub id: i32,
    pub title: String,
    pub album_artist: Option<String>,
    pub artist_id: Option<i32>,
    /// Name of the linked artist.
    pub artist: Option<String>,
    pub genre: Option<String>,
    pub record_label: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub duration_in_seconds: i64,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

impl From<AlbumDetails> for AlbumDto {
    fn from(details: AlbumDetails) -> Self {
        let ratings: Vec<i32> = details.reviews.iter().map(|r| r.review.rating).collect();
        let AlbumDetails {
            album,
            artist,
            genre,
            record_label,
            ..
        } = details;

        Self {
            id: album.id,
            title: album.title,
            album_artist: album.album_artist,
            artist_id: album.artist_id,
            artist: artist.map(|a| a.name),
            genre: genre.map(|g| g.name),
            record_label: record_label.map(|l| l.name),
            release_date: album.release_date,
            duration_in_seconds: album.duration_in_seconds,
            cover_image_url: album.cover_image_url,
            description: album.description,
            average_rating: average_rating(&ratings),
            review_count: ratings.len(),
        }
    }
}

/// Mean rating rounded to one decimal place, ties to even.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let mean = ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64;
    Some((mean * 10.0).round_ties_even() / 10.0)
}

/// Body for both create and update. Update replaces every field it carries;
/// an absent `durationInSeconds` keeps the stored value.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRequest {
    pub title: Option<String>,
    pub album_artist: Option<String>,
    pub artist_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub record_label_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub duration_in_seconds: Option<i64>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlbumInput {
    pub title: String,
    pub album_artist: Option<String>,
    pub artist_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub record_label_id: Option<i32>,
    pub release_date: Option<NaiveDate>,
    pub duration_in_seconds: Option<i64>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
}

impl AlbumRequest {
    pub fn validate(self) -> std::result::Result<AlbumInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors.required_text("title", self.title, 200);
        let album_artist = errors.optional_text("albumArtist", self.album_artist, Some(200));
        let cover_image_url = errors.optional_text("coverImageUrl", self.cover_image_url, Some(500));
        let description = errors.optional_text("description", self.description, None);
        let duration_in_seconds = self
            .duration_in_seconds
            .and_then(|d| errors.in_range("durationInSeconds", d, 0, i64::MAX));

        errors.finish(title.map(|title| AlbumInput {
            title,
            album_artist,
            artist_id: self.artist_id,
            genre_id: self.genre_id,
            record_label_id: self.record_label_id,
            release_date: self.release_date,
            duration_in_seconds,
            cover_image_url,
            description,
        }))
    }
}

impl AlbumInput {
    fn into_active_model(self) -> album::ActiveModel {
        let now = Utc::now();
        album::ActiveModel {
            id: NotSet,
            title: Set(self.title),
            album_artist: Set(self.album_artist),
            artist_id: Set(self.artist_id),
            genre_id: Set(self.genre_id),
            record_label_id: Set(self.record_label_id),
            release_date: Set(self.release_date),
            duration_in_seconds: Set(self.duration_in_seconds.unwrap_or(0)),
            cover_image_url: Set(self.cover_image_url),
            description: Set(self.description),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    fn apply_to(self, album: &mut album::Model) {
        album.title = self.title;
        album.album_artist = self.album_artist;
        album.artist_id = self.artist_id;
        album.genre_id = self.genre_id;
        album.record_label_id = self.record_label_id;
        album.release_date = self.release_date;
        if let Some(duration) = self.duration_in_seconds {
            album.duration_in_seconds = duration;
        }
        album.cover_image_url = self.cover_image_url;
        album.description = self.description;
        album.updated_at = Utc::now().into();
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub term: Option<String>,
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
}

impl SearchQuery {
    /// Page number clamped to at least 1; a page size outside 1..=100 falls back to 10.
    pub fn paging(&self) -> (u64, u64) {
        let page_number = self.page_number.unwrap_or(1).max(1) as u64;
        let page_size = match self.page_size {
            Some(size) if (1..=MAX_PAGE_SIZE as i64).contains(&size) => size as u64,
            _ => DEFAULT_PAGE_SIZE,
        };
        (page_number, page_size)
    }
}

fn to_dtos(albums: Vec<AlbumDetails>) -> Vec<AlbumDto> {
    albums.into_iter().map(AlbumDto::from).collect()
}

fn non_empty(albums: Vec<AlbumDetails>, what: String) -> Result<Json<Vec<AlbumDto>>> {
    if albums.is_empty() {
        return Err(AppError::NotFound(what));
    }
    Ok(Json(to_dtos(albums)))
}

/// List all albums with their details
pub async fn list_albums(uow: UnitOfWork) -> Result<Json<Vec<AlbumDto>>> {
    let albums = uow.albums().get_all_with_details().await?;
    Ok(Json(to_dtos(albums)))
}

pub async fn get_album(uow: UnitOfWork, Path(id): Path<i32>) -> Result<Json<AlbumDto>> {
    let details = uow
        .albums()
        .get_with_details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Album", id))?;

    Ok(Json(details.into()))
}

pub async fn get_albums_by_artist(
    uow: UnitOfWork,
    Path(artist_id): Path<i32>,
) -> Result<Json<Vec<AlbumDto>>> {
    let albums = uow.albums().get_by_artist(artist_id).await?;
    non_empty(albums, format!("No albums found for artist {}", artist_id))
}

pub async fn get_albums_by_genre(
    uow: UnitOfWork,
    Path(genre_id): Path<i32>,
) -> Result<Json<Vec<AlbumDto>>> {
    let albums = uow.albums().get_by_genre(genre_id).await?;
    non_empty(albums, format!("No albums found for genre {}", genre_id))
}

pub async fn get_albums_by_record_label(
    uow: UnitOfWork,
    Path(record_label_id): Path<i32>,
) -> Result<Json<Vec<AlbumDto>>> {
    let albums = uow.albums().get_by_record_label(record_label_id).await?;
    non_empty(
        albums,
        format!("No albums found for record label {}", record_label_id),
    )
}

/// Search albums by title, artist name or album artist
pub async fn search_albums(
    uow: UnitOfWork,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<AlbumDto>>> {
    let (page_number, page_size) = query.paging();
    let term = query.term.as_deref().unwrap_or_default();

    let albums = uow.albums().search(term, page_number, page_size).await?;
    tracing::debug!(
        "Album search '{}' page {} (size {}) matched {} album(s)",
        term,
        page_number,
        page_size,
        albums.len()
    );

    Ok(Json(to_dtos(albums)))
}

pub async fn create_album(
    uow: UnitOfWork,
    Json(request): Json<AlbumRequest>,
) -> Result<Created<AlbumDto>> {
    let input = request.validate()?;

    let staged = uow.albums().add(input.into_active_model());
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let details = uow
        .albums()
        .get_with_details(id)
        .await?
        .ok_or_else(|| AppError::not_found("Album", id))?;

    tracing::info!("Created album {}", id);
    Ok(created("album", id, details.into()))
}

pub async fn update_album(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<AlbumRequest>,
) -> Result<StatusCode> {
    let input = request.validate()?;

    let mut album = uow
        .albums()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Album", id))?;

    input.apply_to(&mut album);
    uow.albums().update(album);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_album(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let album = uow
        .albums()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Album", id))?;

    uow.albums().remove(album);
    uow.save_changes().await?;

    tracing::info!("Deleted album {}", id);
    Ok(StatusCode::NO_CONTENT)
}
