//! Generic data access over the catalog entities.
//!
//! Every repository borrows a [`DbContext`]. Reads hit the database
//! immediately; `add`, `update` and `remove` only stage a change that is
//! applied when the owning context saves.

mod album;
mod context;
mod unit_of_work;

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    sea_query::IntoCondition, ActiveModelBehavior, ActiveModelTrait, EntityTrait, IntoActiveModel,
    IntoSimpleExpr, Iterable, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use crate::db::entities::{artist, genre, record_label, review, track, user};
use crate::error::Result;

pub use album::{AlbumDetails, AlbumRepository, ReviewWithUser};
pub use context::{ChangeKind, DbContext, Staged};
pub use unit_of_work::UnitOfWork;

/// Primary key value type of an entity.
pub type Id<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

pub type ArtistRepository<'ctx> = EntityRepository<'ctx, artist::Entity>;
pub type GenreRepository<'ctx> = EntityRepository<'ctx, genre::Entity>;
pub type RecordLabelRepository<'ctx> = EntityRepository<'ctx, record_label::Entity>;
pub type TrackRepository<'ctx> = EntityRepository<'ctx, track::Entity>;
pub type ReviewRepository<'ctx> = EntityRepository<'ctx, review::Entity>;
pub type UserRepository<'ctx> = EntityRepository<'ctx, user::Entity>;

#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelBehavior + Send + Sync + 'static,
{
    fn context(&self) -> &DbContext;

    async fn get_by_id(&self, id: Id<E>) -> Result<Option<E::Model>> {
        Ok(E::find_by_id(id).one(self.context().connection()).await?)
    }

    async fn get_all(&self) -> Result<Vec<E::Model>> {
        Ok(E::find().all(self.context().connection()).await?)
    }

    /// Stage an insert. Unset columns take their database defaults.
    fn add(&self, model: E::ActiveModel) -> Staged<E::Model> {
        self.context().stage_insert(model)
    }

    /// Stage a full-row update of `model`, matched by primary key.
    fn update(&self, model: E::Model) {
        let mut active = model.into_active_model();
        for column in E::Column::iter() {
            active.reset(column);
        }
        self.context().stage_update(active);
    }

    fn remove(&self, model: E::Model) {
        self.context().stage_delete(model.into_active_model());
    }

    fn query(&self) -> QueryHandle<'_, E> {
        QueryHandle::new(self.context())
    }
}

/// Repository for entities that need nothing beyond the generic operations.
pub struct EntityRepository<'ctx, E> {
    context: &'ctx DbContext,
    _entity: PhantomData<E>,
}

impl<'ctx, E: EntityTrait> EntityRepository<'ctx, E> {
    pub fn new(context: &'ctx DbContext) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<'ctx, E> Repository<E> for EntityRepository<'ctx, E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelBehavior + Send + Sync + 'static,
{
    fn context(&self) -> &DbContext {
        self.context
    }
}

/// A composable read query against one entity.
pub struct QueryHandle<'ctx, E: EntityTrait> {
    context: &'ctx DbContext,
    select: Select<E>,
}

impl<'ctx, E> QueryHandle<'ctx, E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    fn new(context: &'ctx DbContext) -> Self {
        Self {
            context,
            select: E::find(),
        }
    }

    pub fn filter<F: IntoCondition>(mut self, filter: F) -> Self {
        self.select = self.select.filter(filter);
        self
    }

    pub fn order_by_asc<C: IntoSimpleExpr>(mut self, column: C) -> Self {
        self.select = self.select.order_by_asc(column);
        self
    }

    pub fn order_by_desc<C: IntoSimpleExpr>(mut self, column: C) -> Self {
        self.select = self.select.order_by_desc(column);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.select = self.select.offset(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.select = self.select.limit(limit);
        self
    }

    pub async fn all(self) -> Result<Vec<E::Model>> {
        Ok(self.select.all(self.context.connection()).await?)
    }

    pub async fn one(self) -> Result<Option<E::Model>> {
        Ok(self.select.one(self.context.connection()).await?)
    }

    pub async fn count(self) -> Result<u64> {
        Ok(self.select.count(self.context.connection()).await?)
    }

    /// Hand the underlying select to callers that need joins or projections.
    pub fn into_select(self) -> Select<E> {
        self.select
    }
}
