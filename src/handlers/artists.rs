use axum::{extract::Path, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::artist,
    db::repositories::{Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDto {
    pub id: i32,
    pub name: String,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
}

impl From<artist::Model> for ArtistDto {
    fn from(artist: artist::Model) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            bio: artist.bio,
            country: artist.country,
            website: artist.website,
            image_url: artist.image_url,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistInput {
    pub name: String,
    pub bio: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub image_url: Option<String>,
}

impl ArtistRequest {
    pub fn validate(self) -> std::result::Result<ArtistInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required_text("name", self.name, 100);
        let bio = errors.optional_text("bio", self.bio, None);
        let country = errors.optional_text("country", self.country, Some(100));
        let website = errors.optional_text("website", self.website, Some(500));
        let image_url = errors.optional_text("imageUrl", self.image_url, Some(500));

        errors.finish(name.map(|name| ArtistInput {
            name,
            bio,
            country,
            website,
            image_url,
        }))
    }
}

impl ArtistInput {
    fn into_active_model(self) -> artist::ActiveModel {
        let now = Utc::now();
        artist::ActiveModel {
            id: NotSet,
            name: Set(self.name),
            bio: Set(self.bio),
            country: Set(self.country),
            website: Set(self.website),
            image_url: Set(self.image_url),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    fn apply_to(self, artist: &mut artist::Model) {
        artist.name = self.name;
        artist.bio = self.bio;
        artist.country = self.country;
        artist.website = self.website;
        artist.image_url = self.image_url;
        artist.updated_at = Utc::now().into();
    }
}

pub async fn list_artists(uow: UnitOfWork) -> Result<Json<Vec<ArtistDto>>> {
    let artists = uow.artists().get_all().await?;
    Ok(Json(artists.into_iter().map(ArtistDto::from).collect()))
}

pub async fn get_artist(uow: UnitOfWork, Path(id): Path<i32>) -> Result<Json<ArtistDto>> {
    let artist = uow
        .artists()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist", id))?;

    Ok(Json(artist.into()))
}

pub async fn create_artist(
    uow: UnitOfWork,
    Json(request): Json<ArtistRequest>,
) -> Result<Created<ArtistDto>> {
    let input = request.validate()?;

    let staged = uow.artists().add(input.into_active_model());
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let artist = uow
        .artists()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist", id))?;

    tracing::info!("Created artist {}", id);
    Ok(created("artist", id, artist.into()))
}

pub async fn update_artist(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<ArtistRequest>,
) -> Result<StatusCode> {
    let input = request.validate()?;

    let mut artist = uow
        .artists()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist", id))?;

    input.apply_to(&mut artist);
    uow.artists().update(artist);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an artist; their albums stay, unlinked.
pub async fn delete_artist(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let artist = uow
        .artists()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Artist", id))?;

    uow.artists().remove(artist);
    uow.save_changes().await?;

    tracing::info!("Deleted artist {}", id);
    Ok(StatusCode::NO_CONTENT)
}
