use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::DatabaseConnection;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::Config;
use crate::db::UnitOfWork;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.db.clone())
    }
}

/// Each request gets its own unit of work over the shared pool.
#[async_trait]
impl FromRequestParts<AppState> for UnitOfWork {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.unit_of_work())
    }
}
