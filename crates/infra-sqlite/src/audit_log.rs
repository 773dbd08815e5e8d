// SQLite AuditLog Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use vaidya_core::error::{AppError, Result};
use vaidya_core::port::{AuditEvent, AuditLog, AuditOperation};

#[derive(Clone)]
pub struct SqliteAuditLog {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct AuditRow {
    operation: String,
    resource_type: String,
    resource_id: String,
    actor: String,
    timestamp: i64,
    details: Option<String>,
}

impl SqliteAuditLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Events recorded for one resource, oldest first
    pub async fn history(&self, resource_type: &str, resource_id: &str) -> Result<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT operation, resource_type, resource_id, actor, timestamp, details
            FROM audit_log
            WHERE resource_type = ? AND resource_id = ?
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(into_event).collect()
    }
}

fn into_event(row: AuditRow) -> Result<AuditEvent> {
    let operation = match row.operation.as_str() {
        "CREATE" => AuditOperation::Create,
        "ADD" => AuditOperation::Add,
        "UPDATE" => AuditOperation::Update,
        "REMOVE" => AuditOperation::Remove,
        other => {
            return Err(AppError::Database(format!(
                "Unknown audit operation: {}",
                other
            )))
        }
    };
    let details = row
        .details
        .map(|d| serde_json::from_str(&d))
        .transpose()?;

    Ok(AuditEvent {
        operation,
        resource_type: row.resource_type,
        resource_id: row.resource_id,
        actor: row.actor,
        timestamp: row.timestamp,
        details,
    })
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        let details = event.details.as_ref().map(|d| d.to_string());

        sqlx::query(
            r#"
            INSERT INTO audit_log (operation, resource_type, resource_id, actor, timestamp, details)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.operation.to_string())
        .bind(&event.resource_type)
        .bind(&event.resource_id)
        .bind(&event.actor)
        .bind(event.timestamp)
        .bind(details)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use serde_json::json;

    async fn setup() -> SqliteAuditLog {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteAuditLog::new(pool)
    }

    fn event(operation: AuditOperation, timestamp: i64) -> AuditEvent {
        AuditEvent {
            operation,
            resource_type: "queue_entry".to_string(),
            resource_id: "e-1".to_string(),
            actor: "nurse-7".to_string(),
            timestamp,
            details: Some(json!({ "position": 1 })),
        }
    }

    #[tokio::test]
    async fn test_record_and_read_history() {
        let audit = setup().await;
        audit.record(event(AuditOperation::Add, 10)).await.unwrap();
        audit
            .record(event(AuditOperation::Remove, 20))
            .await
            .unwrap();

        let history = audit.history("queue_entry", "e-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].operation, AuditOperation::Add);
        assert_eq!(history[1].operation, AuditOperation::Remove);
        assert_eq!(history[0].details, Some(json!({ "position": 1 })));
        assert_eq!(history[1].actor, "nurse-7");
    }

    #[tokio::test]
    async fn test_history_without_details() {
        let audit = setup().await;
        let mut e = event(AuditOperation::Update, 5);
        e.details = None;
        audit.record(e).await.unwrap();

        let history = audit.history("queue_entry", "e-1").await.unwrap();
        assert_eq!(history[0].details, None);
        assert!(audit.history("queue", "e-1").await.unwrap().is_empty());
    }
}
