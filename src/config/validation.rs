//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the contract locator is well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{AppConfig, StorageBackend};
use crate::ledger::AccountAddress;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Worst case for `POST /api/v1/profile`.
///
/// Build (sequence number and gas price), encode and submit are four ledger
/// requests, then the finality wait, then the air-quality and advice calls.
pub fn submit_budget_secs(config: &AppConfig) -> u64 {
    4 * config.ledger.request_timeout_secs
        + config.ledger.finality_timeout_secs
        + 2 * config.advisory.timeout_secs
}

/// Check every semantic constraint and collect all failures.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    let budget = submit_budget_secs(config);
    if config.server.request_timeout_secs < budget {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            format!(
                "must be at least {}s to cover a profile submission \
                 (4 x ledger.request_timeout_secs + ledger.finality_timeout_secs \
                 + 2 x advisory.timeout_secs)",
                budget
            ),
        ));
    }

    if url::Url::parse(&config.ledger.node_url).is_err() {
        errors.push(ValidationError::new(
            "ledger.node_url",
            format!("'{}' is not a URL", config.ledger.node_url),
        ));
    }
    if config.ledger.contract_address.parse::<AccountAddress>().is_err() {
        errors.push(ValidationError::new(
            "ledger.contract_address",
            "must be a hex account address",
        ));
    }
    let module = &config.ledger.module_name;
    if module.is_empty() || !module.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        errors.push(ValidationError::new(
            "ledger.module_name",
            "must be a non-empty Move identifier",
        ));
    }
    if config.ledger.request_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.request_timeout_secs", "must be > 0"));
    }
    if config.ledger.finality_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.finality_timeout_secs", "must be > 0"));
    }
    if config.ledger.poll_interval_ms == 0 {
        errors.push(ValidationError::new("ledger.poll_interval_ms", "must be > 0"));
    }
    if config.ledger.max_gas_amount == 0 {
        errors.push(ValidationError::new("ledger.max_gas_amount", "must be > 0"));
    }

    if config.storage.namespace.is_empty() {
        errors.push(ValidationError::new("storage.namespace", "must not be empty"));
    }
    if config.storage.backend == StorageBackend::File && config.storage.path.is_empty() {
        errors.push(ValidationError::new(
            "storage.path",
            "required when storage.backend = \"file\"",
        ));
    }

    if let Some(aqi_url) = &config.advisory.air_quality_url {
        if url::Url::parse(aqi_url).is_err() {
            errors.push(ValidationError::new(
                "advisory.air_quality_url",
                format!("'{}' is not a URL", aqi_url),
            ));
        }
    }
    if url::Url::parse(&config.advisory.advice_url).is_err() {
        errors.push(ValidationError::new(
            "advisory.advice_url",
            format!("'{}' is not a URL", config.advisory.advice_url),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address when metrics are enabled",
        ));
    }

    if config.admin.enabled && config.admin.api_key.len() < 16 {
        errors.push(ValidationError::new(
            "admin.api_key",
            "must be at least 16 characters when admin routes are enabled",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
