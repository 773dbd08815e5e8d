// Row types and SQL shared by the pool-backed repository and the transaction

use crate::error::map_sqlx_error;
use sqlx::{Executor, FromRow, Sqlite};
use vaidya_core::domain::{EntryStatus, Queue, QueueEntry, TherapyType};
use vaidya_core::error::{AppError, Result};

pub(crate) const QUEUE_COLUMNS: &str = "id, clinic_id, therapy_type, name, max_capacity, \
     is_active, current_position, created_at, updated_at";

pub(crate) const ENTRY_COLUMNS: &str = "id, queue_id, patient_id, appointment_id, position, \
     priority, status, estimated_wait_time, actual_wait_time, checked_in_at, started_at, \
     completed_at, created_at, updated_at, notes";

/// Queue order, with id as the final tie-break
pub(crate) const QUEUE_ORDER: &str = "ORDER BY priority DESC, created_at ASC, id ASC";

pub(crate) const ACTIVE_STATUSES: &str = "('WAITING', 'IN_PROGRESS')";

#[derive(Debug, FromRow)]
pub(crate) struct QueueRow {
    id: String,
    clinic_id: String,
    therapy_type: String,
    name: String,
    max_capacity: i64,
    is_active: bool,
    current_position: i64,
    created_at: i64,
    updated_at: i64,
}

impl QueueRow {
    pub(crate) fn into_domain(self) -> Result<Queue> {
        Ok(Queue {
            id: self.id,
            clinic_id: self.clinic_id,
            therapy_type: TherapyType::new(self.therapy_type),
            name: self.name,
            max_capacity: to_u32("max_capacity", self.max_capacity)?,
            is_active: self.is_active,
            current_position: self.current_position,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct EntryRow {
    id: String,
    queue_id: String,
    patient_id: String,
    appointment_id: Option<String>,
    position: Option<i64>,
    priority: i64,
    status: String,
    estimated_wait_time: Option<i64>,
    actual_wait_time: Option<i64>,
    checked_in_at: Option<i64>,
    started_at: Option<i64>,
    completed_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
    notes: Option<String>,
}

impl EntryRow {
    pub(crate) fn into_domain(self) -> Result<QueueEntry> {
        let status = EntryStatus::parse(&self.status).ok_or_else(|| {
            AppError::Database(format!(
                "Unknown entry status '{}' for entry {}",
                self.status, self.id
            ))
        })?;
        let priority = i32::try_from(self.priority)
            .map_err(|_| AppError::Database(format!("Priority out of range: {}", self.priority)))?;

        Ok(QueueEntry {
            id: self.id,
            queue_id: self.queue_id,
            patient_id: self.patient_id,
            appointment_id: self.appointment_id,
            position: self.position.map(|p| to_u32("position", p)).transpose()?,
            priority,
            status,
            estimated_wait_time: self
                .estimated_wait_time
                .map(|m| to_u32("estimated_wait_time", m))
                .transpose()?,
            actual_wait_time: self
                .actual_wait_time
                .map(|m| to_u32("actual_wait_time", m))
                .transpose()?,
            checked_in_at: self.checked_in_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            notes: self.notes,
        })
    }
}

fn to_u32(column: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Database(format!("Column {} out of range: {}", column, value)))
}

fn into_queues(rows: Vec<QueueRow>) -> Result<Vec<Queue>> {
    rows.into_iter().map(QueueRow::into_domain).collect()
}

fn into_entries(rows: Vec<EntryRow>) -> Result<Vec<QueueEntry>> {
    rows.into_iter().map(EntryRow::into_domain).collect()
}

// Queries below are generic over the executor so the pool and an open
// transaction run the exact same SQL.

pub(crate) async fn fetch_queue<'e, E>(executor: E, id: &str) -> Result<Option<Queue>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM queues WHERE id = ?", QUEUE_COLUMNS);
    sqlx::query_as::<_, QueueRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?
        .map(QueueRow::into_domain)
        .transpose()
}

pub(crate) async fn fetch_active_queue<'e, E>(
    executor: E,
    clinic_id: &str,
    therapy_type: &TherapyType,
) -> Result<Option<Queue>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM queues WHERE clinic_id = ? AND therapy_type = ? AND is_active = 1",
        QUEUE_COLUMNS
    );
    sqlx::query_as::<_, QueueRow>(&sql)
        .bind(clinic_id)
        .bind(therapy_type.as_str())
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?
        .map(QueueRow::into_domain)
        .transpose()
}

pub(crate) async fn fetch_clinic_queues<'e, E>(
    executor: E,
    clinic_id: &str,
    active_only: bool,
) -> Result<Vec<Queue>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let filter = if active_only { " AND is_active = 1" } else { "" };
    let sql = format!(
        "SELECT {} FROM queues WHERE clinic_id = ?{} ORDER BY created_at DESC, id DESC",
        QUEUE_COLUMNS, filter
    );
    let rows = sqlx::query_as::<_, QueueRow>(&sql)
        .bind(clinic_id)
        .fetch_all(executor)
        .await
        .map_err(map_sqlx_error)?;
    into_queues(rows)
}

pub(crate) async fn fetch_entry<'e, E>(executor: E, id: &str) -> Result<Option<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM queue_entries WHERE id = ?", ENTRY_COLUMNS);
    sqlx::query_as::<_, EntryRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?
        .map(EntryRow::into_domain)
        .transpose()
}

pub(crate) async fn fetch_entries<'e, E>(
    executor: E,
    queue_id: &str,
    statuses: &[EntryStatus],
) -> Result<Vec<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let filter = if statuses.is_empty() {
        String::new()
    } else {
        let placeholders = vec!["?"; statuses.len()].join(", ");
        format!(" AND status IN ({})", placeholders)
    };
    let sql = format!(
        "SELECT {} FROM queue_entries WHERE queue_id = ?{} {}",
        ENTRY_COLUMNS, filter, QUEUE_ORDER
    );

    let mut query = sqlx::query_as::<_, EntryRow>(&sql).bind(queue_id);
    for status in statuses {
        query = query.bind(status.to_string());
    }
    let rows = query.fetch_all(executor).await.map_err(map_sqlx_error)?;
    into_entries(rows)
}

pub(crate) async fn fetch_active_entries<'e, E>(
    executor: E,
    queue_id: &str,
) -> Result<Vec<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    fetch_entries(executor, queue_id, &EntryStatus::ACTIVE).await
}
