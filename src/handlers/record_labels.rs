use axum::{extract::Path, http::StatusCode, Json};
use sea_orm::{ActiveValue::NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::record_label,
    db::repositories::{Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLabelDto {
    pub id: i32,
    pub name: String,
    pub website: Option<String>,
    pub country: Option<String>,
}

impl From<record_label::Model> for RecordLabelDto {
    fn from(label: record_label::Model) -> Self {
        Self {
            id: label.id,
            name: label.name,
            website: label.website,
            country: label.country,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLabelRequest {
    pub name: Option<String>,
    /// Validated but never stored; there is no column for it.
    pub label_code: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordLabelInput {
    pub name: String,
    pub website: Option<String>,
    pub country: Option<String>,
}

impl RecordLabelRequest {
    pub fn validate(self) -> std::result::Result<RecordLabelInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.required_text("name", self.name, 100);
        errors.optional_text("labelCode", self.label_code, Some(50));
        let website = errors.optional_text("website", self.website, Some(500));
        let country = errors.optional_text("country", self.country, Some(50));

        errors.finish(name.map(|name| RecordLabelInput {
            name,
            website,
            country,
        }))
    }
}

pub async fn list_record_labels(uow: UnitOfWork) -> Result<Json<Vec<RecordLabelDto>>> {
    let labels = uow.record_labels().get_all().await?;
    Ok(Json(labels.into_iter().map(RecordLabelDto::from).collect()))
}

pub async fn get_record_label(
    uow: UnitOfWork,
    Path(id): Path<i32>,
) -> Result<Json<RecordLabelDto>> {
    let label = uow
        .record_labels()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Record label", id))?;

    Ok(Json(label.into()))
}

pub async fn create_record_label(
    uow: UnitOfWork,
    Json(request): Json<RecordLabelRequest>,
) -> Result<Created<RecordLabelDto>> {
    let input = request.validate()?;

    let staged = uow.record_labels().add(record_label::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        website: Set(input.website),
        country: Set(input.country),
    });
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let label = uow
        .record_labels()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Record label", id))?;

    Ok(created("recordlabel", id, label.into()))
}

pub async fn update_record_label(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<RecordLabelRequest>,
) -> Result<StatusCode> {
    let input = request.validate()?;

    let mut label = uow
        .record_labels()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Record label", id))?;

    label.name = input.name;
    label.website = input.website;
    label.country = input.country;
    uow.record_labels().update(label);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_record_label(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let label = uow
        .record_labels()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Record label", id))?;

    uow.record_labels().remove(label);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}
