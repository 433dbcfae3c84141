use std::collections::{BTreeSet, HashMap};

use axum::{extract::Path, http::StatusCode, Json};
use chrono::Utc;
use sea_orm::{entity::prelude::DateTimeWithTimeZone, ActiveValue::NotSet, ColumnTrait, Set};
use serde::{Deserialize, Serialize};

use crate::{
    db::entities::{review, user},
    db::repositories::{Repository, UnitOfWork},
    error::{AppError, Result},
    handlers::{created, Created},
    validation::ValidationErrors,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i32,
    pub album_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    /// Author's username, absent if the user row could not be resolved.
    pub username: Option<String>,
}

impl ReviewDto {
    fn new(review: review::Model, author: Option<&user::Model>) -> Self {
        Self {
            id: review.id,
            album_id: review.album_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            username: author.map(|u| u.username.clone()),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub album_id: Option<i32>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewInput {
    pub album_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_id: String,
}

impl ReviewRequest {
    pub fn validate(self) -> std::result::Result<ReviewInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let album_id = errors.required("albumId", self.album_id);
        let rating = errors
            .required("rating", self.rating)
            .and_then(|r| errors.in_range("rating", r, MIN_RATING, MAX_RATING));
        let comment = errors.optional_text("comment", self.comment, Some(1000));
        let user_id = errors.required_text("userId", self.user_id, 64);

        let input = album_id
            .zip(rating)
            .zip(user_id)
            .map(|((album_id, rating), user_id)| ReviewInput {
                album_id,
                rating,
                comment,
                user_id,
            });
        errors.finish(input)
    }
}

async fn author_of(uow: &UnitOfWork, review: &review::Model) -> Result<Option<user::Model>> {
    uow.users().get_by_id(review.user_id.clone()).await
}

pub async fn list_reviews(uow: UnitOfWork) -> Result<Json<Vec<ReviewDto>>> {
    let reviews = uow.reviews().get_all().await?;

    let user_ids: BTreeSet<String> = reviews.iter().map(|r| r.user_id.clone()).collect();
    let authors: HashMap<String, user::Model> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        uow.users()
            .query()
            .filter(user::Column::Id.is_in(user_ids))
            .all()
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect()
    };

    Ok(Json(
        reviews
            .into_iter()
            .map(|r| {
                let author = authors.get(&r.user_id);
                ReviewDto::new(r, author)
            })
            .collect(),
    ))
}

pub async fn get_review(uow: UnitOfWork, Path(id): Path<i32>) -> Result<Json<ReviewDto>> {
    let review = uow
        .reviews()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    let author = author_of(&uow, &review).await?;

    Ok(Json(ReviewDto::new(review, author.as_ref())))
}

pub async fn create_review(
    uow: UnitOfWork,
    Json(request): Json<ReviewRequest>,
) -> Result<Created<ReviewDto>> {
    let input = request.validate()?;
    let now = Utc::now();

    let staged = uow.reviews().add(review::ActiveModel {
        id: NotSet,
        album_id: Set(input.album_id),
        user_id: Set(input.user_id),
        rating: Set(input.rating),
        comment: Set(input.comment),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    });
    uow.save_changes().await?;
    let id = staged.into_saved()?.id;

    let review = uow
        .reviews()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    let author = author_of(&uow, &review).await?;

    tracing::info!("Created review {} for album {}", id, review.album_id);
    Ok(created("review", id, ReviewDto::new(review, author.as_ref())))
}

pub async fn update_review(
    uow: UnitOfWork,
    Path(id): Path<i32>,
    Json(request): Json<ReviewRequest>,
) -> Result<StatusCode> {
    let input = request.validate()?;

    let mut review = uow
        .reviews()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;

    review.album_id = input.album_id;
    review.rating = input.rating;
    review.comment = input.comment;
    review.user_id = input.user_id;
    review.updated_at = Utc::now().into();
    uow.reviews().update(review);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_review(uow: UnitOfWork, Path(id): Path<i32>) -> Result<StatusCode> {
    let review = uow
        .reviews()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;

    uow.reviews().remove(review);
    uow.save_changes().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_rating_bounds() {
        let request = |rating| ReviewRequest {
            album_id: Some(1),
            rating,
            comment: None,
            user_id: Some("u-1".into()),
        };

        assert!(request(Some(1)).validate().is_ok());
        assert!(request(Some(5)).validate().is_ok());
        assert!(request(Some(0)).validate().unwrap_err().field("rating").is_some());
        assert!(request(Some(6)).validate().unwrap_err().field("rating").is_some());
        assert!(request(None).validate().unwrap_err().field("rating").is_some());
    }

    #[test]
    fn test_review_requires_user_and_short_comment() {
        let errors = ReviewRequest {
            album_id: Some(1),
            rating: Some(4),
            comment: Some("x".repeat(1001)),
            user_id: None,
        }
        .validate()
        .unwrap_err();

        assert!(errors.field("userId").is_some());
        assert!(errors.field("comment").is_some());
        assert!(errors.field("albumId").is_none());
    }
}
