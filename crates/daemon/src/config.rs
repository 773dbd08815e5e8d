//! Daemon configuration
//!
//! Layered: built-in defaults, then an optional TOML file named by
//! `VAIDYA_CONFIG`, then `VAIDYA_*` environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use vaidya_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use vaidya_core::config::{EngineConfig, DEFAULT_CACHE_TTL, DEFAULT_LOCK_TIMEOUT};
use vaidya_core::domain::{SlotDurations, TherapyType, DEFAULT_MAX_CAPACITY};

const DEFAULT_DB_PATH: &str = "~/.vaidya/queues.db";
const CONFIG_FILE_VAR: &str = "VAIDYA_CONFIG";
const ENV_PREFIX: &str = "VAIDYA";

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// SQLite file path, or a full `sqlite:` URL
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// `pretty` or `json`
    pub log_format: String,
    pub cache_ttl_secs: u64,
    pub lock_timeout_ms: u64,
    pub default_max_capacity: u32,
    /// Slot length for therapy types missing from the table
    #[serde(default)]
    pub default_slot_minutes: Option<u32>,
    /// Per-therapy slot length overrides (`VAIDYA_SLOT_MINUTES__SHODHANA=35`)
    #[serde(default)]
    pub slot_minutes: HashMap<String, u32>,
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_VAR).ok();
        Self::load_from(file.as_deref(), Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<&str>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("rpc_host", DEFAULT_RPC_HOST)?
            .set_default("rpc_port", i64::from(DEFAULT_RPC_PORT))?
            .set_default("log_format", "pretty")?
            .set_default("cache_ttl_secs", DEFAULT_CACHE_TTL.as_secs() as i64)?
            .set_default("lock_timeout_ms", DEFAULT_LOCK_TIMEOUT.as_millis() as i64)?
            .set_default("default_max_capacity", i64::from(DEFAULT_MAX_CAPACITY))?;

        if let Some(path) = file {
            let path = shellexpand::tilde(path).into_owned();
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// SQLite connection URL (`~` expanded)
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            return self.db_path.clone();
        }
        format!("sqlite://{}", shellexpand::tilde(&self.db_path))
    }

    /// Directory that must exist before the database file can be created
    pub fn database_dir(&self) -> Option<std::path::PathBuf> {
        if self.db_path.starts_with("sqlite:") {
            return None;
        }
        let path = std::path::PathBuf::from(shellexpand::tilde(&self.db_path).into_owned());
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut slots = SlotDurations::default();
        if let Some(minutes) = self.default_slot_minutes {
            slots = slots.with_fallback(minutes);
        }
        for (therapy, minutes) in &self.slot_minutes {
            slots = slots.with_override(TherapyType::new(therapy), *minutes);
        }

        EngineConfig {
            default_max_capacity: self.default_max_capacity,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            slot_durations: slots,
        }
    }
}
