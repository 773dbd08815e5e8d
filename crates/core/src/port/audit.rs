// Audit log port (fire-and-forget structured events)

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Create,
    Add,
    Update,
    Remove,
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditOperation::Create => write!(f, "CREATE"),
            AuditOperation::Add => write!(f, "ADD"),
            AuditOperation::Update => write!(f, "UPDATE"),
            AuditOperation::Remove => write!(f, "REMOVE"),
        }
    }
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub operation: AuditOperation,
    pub resource_type: String,
    pub resource_id: String,
    pub actor: String,
    pub timestamp: i64, // epoch ms
    pub details: Option<serde_json::Value>,
}

/// Audit sink. Failures are reported to the caller, who logs and drops them.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;
}
