//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Contract deployed for the health-profile module on testnet.
pub const DEFAULT_CONTRACT_ADDRESS: &str =
    "0x70beae59414f2e9115a4eaace4edd0409643069b056c8996def20d6e8d322f1a";

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,

    /// Ledger node and contract settings.
    pub ledger: LedgerConfig,

    /// Wallet storage medium.
    pub storage: StorageConfig,

    /// Air-quality and advice endpoints.
    pub advisory: AdvisoryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds. Must cover a whole profile submission.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 120,
            max_body_size: 64 * 1024,
        }
    }
}

/// Ledger (Aptos full node) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// REST endpoint of the full node, without the `/v1` suffix.
    pub node_url: String,

    /// Account address the profile module is published under.
    pub contract_address: String,

    /// Name of the profile module.
    pub module_name: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Gas ceiling stamped on every transaction.
    pub max_gas_amount: u64,

    /// Seconds from build time until a transaction expires.
    pub expiration_secs: u64,

    /// How long to wait for a submitted transaction to finalize.
    pub finality_timeout_secs: u64,

    /// Delay between finality polls in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: "https://fullnode.testnet.aptoslabs.com".to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            module_name: "onboarding".to_string(),
            request_timeout_secs: 10,
            max_gas_amount: 200_000,
            expiration_secs: 20,
            finality_timeout_secs: 20,
            poll_interval_ms: 500,
        }
    }
}

/// Which storage medium holds wallet records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process map, lost on restart.
    Memory,
    /// JSON file on disk.
    File,
    /// No medium; all writes are dropped.
    None,
}

/// Wallet storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// File path used by the `file` backend.
    pub path: String,

    /// Key prefix shared by every wallet record.
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "wallets.json".to_string(),
            namespace: "aptos_wallet".to_string(),
        }
    }
}

/// Downstream advisory endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Air-quality endpoint. Unset means the fallback reading is always used.
    pub air_quality_url: Option<String>,

    /// AI advice endpoint.
    pub advice_url: String,

    /// HTTP timeout for both endpoints in seconds.
    pub timeout_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            air_quality_url: None,
            advice_url: "https://personalised-health-advisor.vercel.app/api/getAdvice".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}
