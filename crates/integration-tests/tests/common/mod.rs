//! Shared wiring for integration tests: in-memory SQLite, moka cache,
//! manual clock and sequential ids.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use vaidya_core::application::{
    AddEntryRequest, CreateQueueRequest, MutationHooks, QueueEngine, QueueLocks, QueueRegistry,
    ReadCache,
};
use vaidya_core::config::EngineConfig;
use vaidya_core::domain::{EntryStatus, Queue, QueueEntry};
use vaidya_core::error::{AppError, Result};
use vaidya_core::port::id_provider::SequentialIdProvider;
use vaidya_core::port::time_provider::ManualTimeProvider;
use vaidya_core::port::{
    AuditEvent, AuditLog, Cache, QueueRepository, TransactionalQueueRepository,
};
use vaidya_infra_cache::MokaCache;
use vaidya_infra_sqlite::{create_pool, run_migrations, SqliteAuditLog, SqliteQueueRepository};

pub const START_MILLIS: i64 = 1_700_000_000_000;
pub const CLINIC: &str = "clinic-1";

pub struct Harness {
    pub registry: Arc<QueueRegistry>,
    pub engine: Arc<QueueEngine>,
    pub repo: Arc<SqliteQueueRepository>,
    pub cache: Arc<MokaCache>,
    pub audit: Arc<SqliteAuditLog>,
    pub time: Arc<ManualTimeProvider>,
    pub pool: sqlx::SqlitePool,
    /// Keeps a file-backed database alive for the harness lifetime
    _dir: Option<TempDir>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        let cache = Arc::new(MokaCache::new());
        Self::build(config, cache.clone(), cache, None).await
    }

    /// Harness on a WAL database file with a full connection pool, so
    /// transactions on different queues really run side by side
    pub async fn file_backed() -> Self {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(MokaCache::new());
        Self::build(EngineConfig::default(), cache.clone(), cache, Some(dir)).await
    }

    /// Harness whose hooks write to a cache that always fails
    pub async fn with_broken_cache() -> Self {
        Self::build(
            EngineConfig::default(),
            Arc::new(FailingCache),
            Arc::new(MokaCache::new()),
            None,
        )
        .await
    }

    async fn build(
        config: EngineConfig,
        cache: Arc<dyn Cache>,
        moka: Arc<MokaCache>,
        dir: Option<TempDir>,
    ) -> Self {
        let url = match &dir {
            Some(dir) => format!("sqlite://{}", dir.path().join("vaidya.db").display()),
            None => "sqlite::memory:".to_string(),
        };
        let pool = create_pool(&url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
        let tx_repo: Arc<dyn TransactionalQueueRepository> = repo.clone();
        let read_repo: Arc<dyn QueueRepository> = repo.clone();
        let audit = Arc::new(SqliteAuditLog::new(pool.clone()));
        let audit_port: Arc<dyn AuditLog> = audit.clone();
        let time = Arc::new(ManualTimeProvider::new(START_MILLIS));
        let ids = Arc::new(SequentialIdProvider::new("id"));

        let locks = Arc::new(QueueLocks::new(config.lock_timeout));
        let hooks = Arc::new(MutationHooks::new(cache.clone(), audit_port, time.clone()));
        let read_cache = Arc::new(ReadCache::new(cache, config.cache_ttl));

        let registry = Arc::new(QueueRegistry::new(
            tx_repo.clone(),
            read_repo.clone(),
            ids.clone(),
            time.clone(),
            locks.clone(),
            hooks.clone(),
            read_cache.clone(),
            &config,
        ));
        let engine = Arc::new(QueueEngine::new(
            tx_repo, read_repo, ids, time.clone(), locks, hooks, read_cache, &config,
        ));

        Self {
            registry,
            engine,
            repo,
            cache: moka,
            audit,
            time,
            pool,
            _dir: dir,
        }
    }

    pub async fn create_queue(&self, therapy: &str, capacity: u32) -> Queue {
        self.registry
            .create_queue(CreateQueueRequest {
                clinic_id: CLINIC.to_string(),
                therapy_type: therapy.to_string(),
                name: format!("{} queue", therapy),
                max_capacity: Some(capacity),
                actor: Some("admin".to_string()),
            })
            .await
            .unwrap()
    }

    pub async fn add(&self, queue_id: &str, patient: &str, priority: i32) -> Result<QueueEntry> {
        self.engine
            .add_entry(AddEntryRequest {
                queue_id: queue_id.to_string(),
                patient_id: patient.to_string(),
                appointment_id: Some(format!("appt-{}", patient)),
                priority,
                notes: None,
                actor: Some("reception".to_string()),
            })
            .await
    }

    /// Active entries in position order
    pub async fn active(&self, queue_id: &str) -> Vec<QueueEntry> {
        self.repo
            .find_entries(&queue_id.to_string(), &EntryStatus::ACTIVE)
            .await
            .unwrap()
    }

    /// (patient, position) pairs of the active entries
    pub async fn positions(&self, queue_id: &str) -> Vec<(String, u32)> {
        self.active(queue_id)
            .await
            .into_iter()
            .map(|e| (e.patient_id, e.position.unwrap_or_default()))
            .collect()
    }

    /// Audit history of a resource once at least `expected` records landed.
    /// Records are written on detached tasks.
    pub async fn audit_history(
        &self,
        resource_type: &str,
        resource_id: &str,
        expected: usize,
    ) -> Vec<AuditEvent> {
        for _ in 0..200 {
            let events = self.audit.history(resource_type, resource_id).await.unwrap();
            if events.len() >= expected {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "expected {} audit records for {} {}",
            expected, resource_type, resource_id
        );
    }

    pub async fn entry(&self, entry_id: &str) -> QueueEntry {
        self.repo
            .find_entry(&entry_id.to_string())
            .await
            .unwrap()
            .unwrap()
    }
}

/// Active entries must hold positions exactly 1..=n, ordered by
/// priority DESC then arrival ASC
pub fn assert_dense_and_ranked(entries: &[QueueEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(
            entry.position,
            Some(i as u32 + 1),
            "entry {} should sit at position {}",
            entry.id,
            i + 1
        );
    }
    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.priority > b.priority || (a.priority == b.priority && a.created_at <= b.created_at),
            "{} (prio {}) ranked before {} (prio {})",
            a.id,
            a.priority,
            b.id,
            b.priority
        );
    }
}

pub fn patients(positions: &[(String, u32)]) -> Vec<&str> {
    positions.iter().map(|(p, _)| p.as_str()).collect()
}

struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<serde_json::Value>> {
        Err(AppError::Internal("cache offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) -> Result<()> {
        Err(AppError::Internal("cache offline".to_string()))
    }

    async fn invalidate(&self, _key: &str) -> Result<()> {
        Err(AppError::Internal("cache offline".to_string()))
    }

    async fn invalidate_prefix(&self, _prefix: &str) -> Result<()> {
        Err(AppError::Internal("cache offline".to_string()))
    }
}
