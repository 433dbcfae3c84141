//! Persistence context
//!
//! A [`DbContext`] owns one database connection and the ordered set of
//! changes staged against it. Reads go straight to the connection and never
//! observe staged changes; [`DbContext::save_changes`] applies the whole set
//! inside a single transaction.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityName, EntityTrait, IntoActiveModel, TransactionTrait,
};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

#[async_trait]
trait StagedChange: Send {
    fn kind(&self) -> ChangeKind;

    fn table(&self) -> String;

    /// Execute the change, returning the number of rows it touched.
    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> std::result::Result<u64, DbErr>;
}

type Model<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

struct Change<A: ActiveModelTrait> {
    kind: ChangeKind,
    model: A,
    saved: Option<Arc<OnceLock<Model<A>>>>,
}

#[async_trait]
impl<A> StagedChange for Change<A>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
    Model<A>: IntoActiveModel<A> + Sync,
{
    fn kind(&self) -> ChangeKind {
        self.kind
    }

    fn table(&self) -> String {
        A::Entity::default().table_name().to_string()
    }

    async fn apply(self: Box<Self>, txn: &DatabaseTransaction) -> std::result::Result<u64, DbErr> {
        let Change { kind, model, saved } = *self;
        match kind {
            ChangeKind::Added => {
                let stored = model.insert(txn).await?;
                if let Some(slot) = saved {
                    let _ = slot.set(stored);
                }
                Ok(1)
            }
            ChangeKind::Modified => {
                model.update(txn).await?;
                Ok(1)
            }
            ChangeKind::Deleted => Ok(model.delete(txn).await?.rows_affected),
        }
    }
}

/// Handle to a staged insert.
///
/// The row the database stored (generated id and defaults included) becomes
/// available once the owning context has saved successfully.
#[derive(Debug)]
pub struct Staged<M> {
    slot: Arc<OnceLock<M>>,
}

impl<M: Clone> Staged<M> {
    pub fn is_saved(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn saved(&self) -> Option<M> {
        self.slot.get().cloned()
    }

    pub fn into_saved(self) -> Result<M> {
        self.saved()
            .ok_or_else(|| AppError::Internal("staged insert has not been saved".to_string()))
    }
}

pub struct DbContext {
    connection: DatabaseConnection,
    pending: Mutex<Vec<Box<dyn StagedChange>>>,
}

impl DbContext {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self {
            connection,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn pending_changes(&self) -> usize {
        self.pending().len()
    }

    pub fn has_changes(&self) -> bool {
        self.pending_changes() > 0
    }

    pub(crate) fn stage_insert<A>(&self, model: A) -> Staged<Model<A>>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        Model<A>: IntoActiveModel<A> + Sync,
    {
        let slot = Arc::new(OnceLock::new());
        self.stage(Change {
            kind: ChangeKind::Added,
            model,
            saved: Some(slot.clone()),
        });
        Staged { slot }
    }

    pub(crate) fn stage_update<A>(&self, model: A)
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        Model<A>: IntoActiveModel<A> + Sync,
    {
        self.stage(Change {
            kind: ChangeKind::Modified,
            model,
            saved: None,
        });
    }

    pub(crate) fn stage_delete<A>(&self, model: A)
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        Model<A>: IntoActiveModel<A> + Sync,
    {
        self.stage(Change {
            kind: ChangeKind::Deleted,
            model,
            saved: None,
        });
    }

    fn stage<A>(&self, change: Change<A>)
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + Sync + 'static,
        Model<A>: IntoActiveModel<A> + Sync,
    {
        tracing::debug!(kind = ?change.kind(), table = %change.table(), "Staged change");
        self.pending().push(Box::new(change));
    }

    /// Apply every staged change in staging order inside one transaction.
    ///
    /// The change set is emptied whether or not the commit succeeds. Constraint
    /// violations surface here and roll the whole transaction back.
    pub async fn save_changes(&self) -> Result<u64> {
        let changes = self.take_pending();
        if changes.is_empty() {
            return Ok(0);
        }

        let staged = changes.len();
        let txn = self.connection.begin().await?;
        let mut affected = 0;

        for change in changes {
            let (kind, table) = (change.kind(), change.table());
            match change.apply(&txn).await {
                Ok(rows) => affected += rows,
                Err(e) => {
                    tracing::error!(?kind, %table, "Failed to apply staged change: {}", e);
                    txn.rollback().await?;
                    return Err(e.into());
                }
            }
        }

        txn.commit().await?;
        tracing::info!("Saved {} change(s), {} row(s) affected", staged, affected);

        Ok(affected)
    }

    /// Drop every staged change without touching the database.
    pub fn discard_changes(&self) -> usize {
        self.take_pending().len()
    }

    fn take_pending(&self) -> Vec<Box<dyn StagedChange>> {
        std::mem::take(&mut *self.pending())
    }

    fn pending(&self) -> MutexGuard<'_, Vec<Box<dyn StagedChange>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DbContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContext")
            .field("pending_changes", &self.pending_changes())
            .finish_non_exhaustive()
    }
}
