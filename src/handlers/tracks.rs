use axum::{extract::Path, http::StatusCode, Json};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::track,
    db::repositories::{Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

pub const DEFAULT_TRACK_NUMBER: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    pub id: i32,
    pub title: String,
    pub track_number: i32,
    pub duration_in_seconds: i64,
    pub album_id: i32,
}

impl From<track::Model> for TrackDto {
    fn from(track: track::Model) -> Self {
        Self {
            id: track.id,
            title: track.title,
            track_number: track.track_number,
            duration_in_seconds: track.duration_in_seconds,
            album_id: track.album_id,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    pub title: Option<String>,
    pub duration_in_seconds: Option<i64>,
    pub album_id: Option<i32>,
    pub track_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackInput {
    pub title: String,
    pub duration_in_seconds: i64,
    pub album_id: i32,
    pub track_number: i32,
}

impl TrackRequest {
    pub fn validate(self) -> std::result::Result<TrackInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = errors.required_text("title", self.title, 200);
        let duration_in_seconds = errors
            .required("durationInSeconds", self.duration_in_seconds)
            .and_then(|d| errors.in_range("durationInSeconds", d, 1, i64::MAX));
        let album_id = errors.required("albumId", self.album_id);
        let track_number = self.track_number.unwrap_or(DEFAULT_TRACK_NUMBER);

        let input = title
            .zip(duration_in_seconds)
            .zip(album_id)
            .map(|((title, duration_in_seconds), album_id)| TrackInput {
                title,
                duration_in_seconds,
                album_id,
                track_number,
            });
        errors.finish(input)
    }
}

pub async fn list_tracks(uow: UnitOfWork) -> Result<Json<Vec<TrackDto>>> {
    let tracks = uow.tracks().get_all().await?;
    Ok(Json(tracks.into_iter().map(TrackDto::from).collect()))
}

pub async fn get_track(uow: UnitOfWork, Path(id): Path<i32>) -> Result<Json<TrackDto>> {
    let track = uow
        .tracks()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Track", id))?;

    Ok(Json(track.into()))
}

pub async fn create_track(
    uow: UnitOfWork,
    Json(request): Json<TrackRequest>,
) -> Result<Created<TrackDto>> {
    let input = request.validate()?;

    let staged = uow.tracks().add(track::ActiveModel {
        id: NotSet,
        title: Set(input.title),
        track_number: Set(input.track_number),
        duration_in_seconds: Set(input.duration_in_seconds),
        album_id: Set(input.album_id),
    });
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let track = uow
        .tracks()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Track", id))?;

    Ok(created("track", id, track.into()))
}

pub async fn update_track(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<TrackRequest>,
) -> Result<StatusCode> {
    let input = request.validate()?;

    let mut track = uow
        .tracks()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Track", id))?;

    track.title = input.title;
    track.track_number = input.track_number;
    track.duration_in_seconds = input.duration_in_seconds;
    track.album_id = input.album_id;
    uow.tracks().update(track);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_track(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let track = uow
        .tracks()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Track", id))?;

    uow.tracks().remove(track);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}
