// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::rows;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tracing::debug;
use vaidya_core::domain::ordering::PositionUpdate;
use vaidya_core::domain::{EntryId, Queue, QueueEntry, QueueId, TherapyType};
use vaidya_core::error::{AppError, Result};
use vaidya_core::port::{QueueRepositoryTransaction, Transaction};

/// Open store transaction. Dropped without commit, sqlx rolls it back.
pub struct SqliteQueueTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteQueueTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl QueueRepositoryTransaction for SqliteQueueTransaction {
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>> {
        rows::fetch_queue(&mut *self.tx, id).await
    }

    async fn find_active_queue(
        &mut self,
        clinic_id: &str,
        therapy_type: &TherapyType,
    ) -> Result<Option<Queue>> {
        rows::fetch_active_queue(&mut *self.tx, clinic_id, therapy_type).await
    }

    async fn insert_queue(&mut self, queue: &Queue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queues (
                id, clinic_id, therapy_type, name, max_capacity,
                is_active, current_position, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&queue.id)
        .bind(&queue.clinic_id)
        .bind(queue.therapy_type.as_str())
        .bind(&queue.name)
        .bind(i64::from(queue.max_capacity))
        .bind(queue.is_active)
        .bind(queue.current_position)
        .bind(queue.created_at)
        .bind(queue.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_queue(&mut self, queue: &Queue) -> Result<()> {
        let result = sqlx::query(
            "UPDATE queues SET name = ?, max_capacity = ?, is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&queue.name)
        .bind(i64::from(queue.max_capacity))
        .bind(queue.is_active)
        .bind(queue.updated_at)
        .bind(&queue.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Queue not found: {}", queue.id)));
        }
        Ok(())
    }

    async fn increment_booking_counter(&mut self, queue_id: &QueueId, now: i64) -> Result<i64> {
        let counter: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE queues
            SET current_position = current_position + 1, updated_at = ?
            WHERE id = ?
            RETURNING current_position
            "#,
        )
        .bind(now)
        .bind(queue_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        counter.ok_or_else(|| AppError::NotFound(format!("Queue not found: {}", queue_id)))
    }

    async fn find_entry(&mut self, id: &EntryId) -> Result<Option<QueueEntry>> {
        rows::fetch_entry(&mut *self.tx, id).await
    }

    async fn active_entries(&mut self, queue_id: &QueueId) -> Result<Vec<QueueEntry>> {
        rows::fetch_active_entries(&mut *self.tx, queue_id).await
    }

    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, queue_id, patient_id, appointment_id, position,
                priority, status, estimated_wait_time, actual_wait_time,
                checked_in_at, started_at, completed_at,
                created_at, updated_at, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.queue_id)
        .bind(&entry.patient_id)
        .bind(&entry.appointment_id)
        .bind(entry.position.map(i64::from))
        .bind(i64::from(entry.priority))
        .bind(entry.status.to_string())
        .bind(entry.estimated_wait_time.map(i64::from))
        .bind(entry.actual_wait_time.map(i64::from))
        .bind(entry.checked_in_at)
        .bind(entry.started_at)
        .bind(entry.completed_at)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .bind(&entry.notes)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET position = ?, priority = ?, status = ?,
                estimated_wait_time = ?, actual_wait_time = ?,
                started_at = ?, completed_at = ?, updated_at = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.position.map(i64::from))
        .bind(i64::from(entry.priority))
        .bind(entry.status.to_string())
        .bind(entry.estimated_wait_time.map(i64::from))
        .bind(entry.actual_wait_time.map(i64::from))
        .bind(entry.started_at)
        .bind(entry.completed_at)
        .bind(entry.updated_at)
        .bind(&entry.notes)
        .bind(&entry.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Entry not found: {}", entry.id)));
        }
        Ok(())
    }

    async fn apply_positions(&mut self, updates: &[PositionUpdate], now: i64) -> Result<u64> {
        let mut affected = 0;
        for update in updates {
            let result = sqlx::query(
                "UPDATE queue_entries SET position = ?, estimated_wait_time = ?, updated_at = ? WHERE id = ?",
            )
            .bind(i64::from(update.position))
            .bind(i64::from(update.estimated_wait_time))
            .bind(now)
            .bind(&update.entry_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
            affected += result.rows_affected();
        }

        debug!(requested = updates.len(), affected, "Applied queue positions");
        Ok(affected)
    }
}
