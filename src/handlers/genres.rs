use axum::{extract::Path, http::StatusCode, Json};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::genre,
    db::repositories::{Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<genre::Model> for GenreDto {
    fn from(genre: genre::Model) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
            description: genre.description,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl GenreRequest {
    pub fn validate(self) -> std::result::Result<(String, Option<String>), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.required_text("name", self.name, 100);
        let description = errors.optional_text("description", self.description, Some(500));
        errors.finish(name.map(|name| (name, description)))
    }
}

pub async fn list_genres(uow: UnitOfWork) -> Result<Json<Vec<GenreDto>>> {
    let genres = uow.genres().get_all().await?;
    Ok(Json(genres.into_iter().map(GenreDto::from).collect()))
}

pub async fn get_genre(uow: UnitOfWork, Path(id): Path<i32>) -> Result<Json<GenreDto>> {
    let genre = uow
        .genres()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Genre", id))?;

    Ok(Json(genre.into()))
}

pub async fn create_genre(
    uow: UnitOfWork,
    Json(request): Json<GenreRequest>,
) -> Result<Created<GenreDto>> {
    let (name, description) = request.validate()?;

    let staged = uow.genres().add(genre::ActiveModel {
        id: NotSet,
        name: Set(name),
        description: Set(description),
    });
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let genre = uow
        .genres()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Genre", id))?;

    Ok(created("genre", id, genre.into()))
}

pub async fn update_genre(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<GenreRequest>,
) -> Result<StatusCode> {
    let (name, description) = request.validate()?;

    let mut genre = uow
        .genres()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Genre", id))?;

    genre.name = name;
    genre.description = description;
    uow.genres().update(genre);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_genre(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let genre = uow
        .genres()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Genre", id))?;

    uow.genres().remove(genre);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}
