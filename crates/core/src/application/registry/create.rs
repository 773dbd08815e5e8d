// Create Queue Use Case

use crate::config::{MAX_ID_LEN, MAX_TEXT_LEN};
use crate::domain::{Queue, TherapyType};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};

/// Create queue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueueRequest {
    pub clinic_id: String,
    pub therapy_type: String,
    pub name: String,

    /// Falls back to the configured default capacity
    #[serde(default)]
    pub max_capacity: Option<u32>,

    #[serde(default)]
    pub actor: Option<String>,
}

/// Validate create request (input sanitization)
pub fn validate_request(req: &CreateQueueRequest) -> Result<()> {
    validate_id("clinic_id", &req.clinic_id)?;
    validate_id("therapy_type", &req.therapy_type)?;

    if !req
        .therapy_type
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return Err(AppError::Validation(format!(
            "therapy_type must be alphanumeric (with _, - or spaces): {}",
            req.therapy_type
        )));
    }

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if req.name.len() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "name too long ({} > {})",
            req.name.len(),
            MAX_TEXT_LEN
        )));
    }

    if req.max_capacity == Some(0) {
        return Err(crate::domain::DomainError::InvalidCapacity(0).into());
    }

    Ok(())
}

pub(crate) fn validate_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if value.len() > MAX_ID_LEN {
        return Err(AppError::Validation(format!(
            "{} too long ({} > {})",
            field,
            value.len(),
            MAX_ID_LEN
        )));
    }
    Ok(())
}

/// Execute create use case (inside one transaction)
///
/// The caller holds the registration lock for the (clinic, therapy type) pair.
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    default_max_capacity: u32,
    req: &CreateQueueRequest,
) -> Result<Queue> {
    let therapy_type = TherapyType::new(&req.therapy_type);

    let mut tx = queue_repo.begin_transaction().await?;

    if let Some(existing) = tx
        .find_active_queue(&req.clinic_id, &therapy_type)
        .await?
    {
        return Err(AppError::DuplicateQueue(format!(
            "Clinic {} already has active queue {} for {}",
            req.clinic_id, existing.id, therapy_type
        )));
    }

    let queue = Queue::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        req.clinic_id.clone(),
        therapy_type,
        req.name.trim(),
        req.max_capacity.unwrap_or(default_max_capacity),
    );

    tx.insert_queue(&queue).await?;
    tx.commit().await?;

    Ok(queue)
}
