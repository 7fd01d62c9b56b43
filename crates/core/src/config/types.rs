use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::event::{DataFormat, Tier};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub tiers: TierConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub units: Option<UnitsConfig>,
}

/// Tier container names.
///
/// The stage→curated→application destination mapping is derived from these.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TierConfig {
    pub stage: String,
    pub curated: String,
    pub application: String,
}

impl TierConfig {
    /// Destination container for objects leaving the given tier, if any.
    pub fn destination_for(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Stage => Some(&self.curated),
            Tier::Curated => Some(&self.application),
            Tier::Application => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Object store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
}

/// Available object store backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    // Future: S3, AzureBlob
}

/// Router configuration: the explicit knobs of the decision procedure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    /// Size threshold separating fast-path from batch-path invocations.
    /// The boundary value routes to the fast path.
    #[serde(default = "default_size_threshold")]
    pub size_threshold_bytes: u64,
    /// Hard wall-clock budget for fast-path invocations.
    #[serde(default = "default_fast_timeout")]
    pub fast_timeout_secs: u64,
    /// Interval between batch job status polls.
    #[serde(default = "default_batch_poll_interval")]
    pub batch_poll_interval_secs: u64,
    /// Overall deadline for a batch job run.
    #[serde(default = "default_batch_deadline")]
    pub batch_deadline_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            size_threshold_bytes: default_size_threshold(),
            fast_timeout_secs: default_fast_timeout(),
            batch_poll_interval_secs: default_batch_poll_interval(),
            batch_deadline_secs: default_batch_deadline(),
        }
    }
}

fn default_size_threshold() -> u64 {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

fn default_fast_timeout() -> u64 {
    180
}

fn default_batch_poll_interval() -> u64 {
    30
}

fn default_batch_deadline() -> u64 {
    6 * 3600
}

/// Run journal configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JournalConfig {
    #[serde(default = "default_journal_path")]
    pub path: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
        }
    }
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("tierflow.db")
}

/// Processing unit wiring.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UnitsConfig {
    /// Converter endpoints per (tier, format). Slots without a fast
    /// endpoint fall back to the in-process passthrough copy unit.
    #[serde(default)]
    pub converters: Vec<ConverterEndpoint>,
    /// Warehouse ingestion used by the terminal (application) tier.
    pub warehouse: Option<WarehouseConfig>,
}

/// External converter endpoints for one (tier, format) slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterEndpoint {
    pub tier: Tier,
    pub format: DataFormat,
    /// Fast-path HTTP endpoint receiving the IngestionEvent verbatim.
    pub fast_endpoint: Option<String>,
    /// Batch-path job wiring.
    pub batch: Option<BatchEndpoint>,
}

/// Batch job start/status endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchEndpoint {
    pub job_name: String,
    pub start_endpoint: String,
    pub status_endpoint: String,
}

/// Warehouse ingestion configuration (model load).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WarehouseConfig {
    /// Base URL of the warehouse account.
    pub account_url: String,
    /// Bearer token for the ingest API.
    pub auth_token: String,
    /// Key-prefix → ingest pipe name mapping.
    pub pipes: HashMap<String, String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_warehouse_timeout")]
    pub timeout_secs: u64,
}

fn default_warehouse_timeout() -> u64 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub tiers: TierConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub router: RouterConfig,
    pub journal: JournalConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<SanitizedUnitsConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUnitsConfig {
    pub converters: Vec<ConverterEndpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<SanitizedWarehouseConfig>,
}

/// Sanitized warehouse config (auth token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedWarehouseConfig {
    pub account_url: String,
    pub auth_token_configured: bool,
    pub pipes: HashMap<String, String>,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            tiers: config.tiers.clone(),
            server: config.server.clone(),
            store: config.store.clone(),
            router: config.router.clone(),
            journal: config.journal.clone(),
            units: config.units.as_ref().map(|u| SanitizedUnitsConfig {
                converters: u.converters.clone(),
                warehouse: u.warehouse.as_ref().map(|w| SanitizedWarehouseConfig {
                    account_url: w.account_url.clone(),
                    auth_token_configured: !w.auth_token.is_empty(),
                    pipes: w.pipes.clone(),
                    timeout_secs: w.timeout_secs,
                }),
            }),
        }
    }
}
