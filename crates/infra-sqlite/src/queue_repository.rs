// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::{self, EntryRow, ACTIVE_STATUSES, ENTRY_COLUMNS};
use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use vaidya_core::domain::{EntryId, EntryStatus, Queue, QueueEntry, QueueId, TherapyType};
use vaidya_core::error::Result;
use vaidya_core::port::{QueueRepository, QueueRepositoryTransaction, TransactionalQueueRepository};

#[derive(Clone)]
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>> {
        rows::fetch_queue(&self.pool, id).await
    }

    async fn find_active_queue(
        &self,
        clinic_id: &str,
        therapy_type: &TherapyType,
    ) -> Result<Option<Queue>> {
        rows::fetch_active_queue(&self.pool, clinic_id, therapy_type).await
    }

    async fn list_queues(&self, clinic_id: &str, active_only: bool) -> Result<Vec<Queue>> {
        rows::fetch_clinic_queues(&self.pool, clinic_id, active_only).await
    }

    async fn find_entry(&self, id: &EntryId) -> Result<Option<QueueEntry>> {
        rows::fetch_entry(&self.pool, id).await
    }

    async fn find_active_entry_by_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Option<QueueEntry>> {
        let sql = format!(
            "SELECT {} FROM queue_entries WHERE appointment_id = ? AND status IN {} \
             ORDER BY created_at DESC LIMIT 1",
            ENTRY_COLUMNS, ACTIVE_STATUSES
        );
        sqlx::query_as::<_, EntryRow>(&sql)
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .map(EntryRow::into_domain)
            .transpose()
    }

    async fn find_entries(
        &self,
        queue_id: &QueueId,
        statuses: &[EntryStatus],
    ) -> Result<Vec<QueueEntry>> {
        rows::fetch_entries(&self.pool, queue_id, statuses).await
    }
}

#[async_trait]
impl TransactionalQueueRepository for SqliteQueueRepository {
    /// Engine transactions always write, so they take the write lock at BEGIN and
    /// queue on the busy timeout instead of failing with SQLITE_BUSY_SNAPSHOT.
    async fn begin_transaction(&self) -> Result<Box<dyn QueueRepositoryTransaction>> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }
}
