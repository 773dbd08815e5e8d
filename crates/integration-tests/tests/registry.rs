//! Queue registry: one active queue per (clinic, therapy type)

mod common;

use common::{Harness, CLINIC};
use vaidya_core::application::CreateQueueRequest;
use vaidya_core::config::EngineConfig;
use vaidya_core::error::AppError;

fn request(therapy: &str) -> CreateQueueRequest {
    CreateQueueRequest {
        clinic_id: CLINIC.to_string(),
        therapy_type: therapy.to_string(),
        name: "Morning".to_string(),
        max_capacity: None,
        actor: None,
    }
}

#[tokio::test]
async fn test_create_queue_defaults() {
    let h = Harness::with_config(EngineConfig {
        default_max_capacity: 12,
        ..Default::default()
    })
    .await;

    let queue = h.registry.create_queue(request("shodhana")).await.unwrap();
    assert_eq!(queue.therapy_type.as_str(), "SHODHANA");
    assert_eq!(queue.max_capacity, 12);
    assert!(queue.is_active);
    assert_eq!(queue.current_position, 0);
}

#[tokio::test]
async fn test_duplicate_active_queue_rejected() {
    let h = Harness::new().await;
    h.registry.create_queue(request("SHODHANA")).await.unwrap();

    let result = h.registry.create_queue(request("Shodhana")).await;
    assert!(matches!(result, Err(AppError::DuplicateQueue(_))));

    // Other therapy types and clinics are independent
    h.registry.create_queue(request("SHAMANA")).await.unwrap();
    h.registry
        .create_queue(CreateQueueRequest {
            clinic_id: "clinic-2".to_string(),
            ..request("SHODHANA")
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_queue_validation() {
    let h = Harness::new().await;

    let zero = h
        .registry
        .create_queue(CreateQueueRequest {
            max_capacity: Some(0),
            ..request("SHODHANA")
        })
        .await;
    assert!(zero.is_err());

    let blank = h
        .registry
        .create_queue(CreateQueueRequest {
            name: "   ".to_string(),
            ..request("SHODHANA")
        })
        .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_get_queue_by_type() {
    let h = Harness::new().await;
    let created = h.create_queue("RASAYANA", 5).await;

    let found = h.registry.get_queue(CLINIC, "rasayana").await.unwrap();
    assert_eq!(found.id, created.id);

    let missing = h.registry.get_queue(CLINIC, "SHAMANA").await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_deactivate_frees_the_pair() {
    let h = Harness::new().await;
    let old = h.create_queue("SHODHANA", 5).await;
    h.add(&old.id, "P1", 0).await.unwrap();

    let deactivated = h.registry.deactivate_queue(&old.id, None).await.unwrap();
    assert!(!deactivated.is_active);

    // Idempotent
    let again = h.registry.deactivate_queue(&old.id, None).await.unwrap();
    assert!(!again.is_active);
    assert_eq!(again.updated_at, deactivated.updated_at);

    // Entries are kept for history
    assert_eq!(h.active(&old.id).await.len(), 1);

    let replacement = h.create_queue("SHODHANA", 8).await;
    assert_ne!(replacement.id, old.id);
    let found = h.registry.get_queue(CLINIC, "SHODHANA").await.unwrap();
    assert_eq!(found.id, replacement.id);
}

#[tokio::test]
async fn test_list_queues_newest_first_with_entries() {
    let h = Harness::new().await;
    let first = h.create_queue("SHODHANA", 5).await;
    h.time.advance_millis(10);
    let second = h.create_queue("SHAMANA", 5).await;
    h.time.advance_millis(10);
    let third = h.create_queue("RASAYANA", 5).await;

    h.add(&first.id, "P1", 0).await.unwrap();
    h.add(&first.id, "P2", 3).await.unwrap();
    h.registry.deactivate_queue(&third.id, None).await.unwrap();

    let all = h.registry.list_queues(CLINIC, false).await.unwrap();
    let ids: Vec<_> = all.iter().map(|q| q.queue.id.as_str()).collect();
    assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

    let listing = &all[2];
    let patients: Vec<_> = listing.entries.iter().map(|e| e.patient_id.as_str()).collect();
    assert_eq!(patients, vec!["P2", "P1"]);

    let active = h.registry.list_queues(CLINIC, true).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|q| q.queue.is_active));

    assert!(h.registry.list_queues("clinic-x", false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_counter_is_monotonic() {
    let h = Harness::new().await;
    let queue = h.create_queue("SHODHANA", 5).await;

    let p1 = h.add(&queue.id, "P1", 0).await.unwrap();
    h.add(&queue.id, "P2", 0).await.unwrap();
    h.engine.remove_entry(&p1.id, None).await.unwrap();
    h.add(&queue.id, "P3", 0).await.unwrap();

    let stored = h.registry.get_queue(CLINIC, "SHODHANA").await.unwrap();
    assert_eq!(stored.current_position, 3);
}
