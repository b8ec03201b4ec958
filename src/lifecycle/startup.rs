//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured wallet storage medium
//! - Initialize the ledger client, advisory clients and onboarding service
//! - Bind the listener last, once everything else is ready
//!
//! Any startup error is fatal.

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::advisory;
use crate::config::{AppConfig, LedgerConfig, StorageBackend, StorageConfig};
use crate::http::{AppState, HttpServer};
use crate::ledger::{AccountAddress, AptosClient, KeyError, Ledger, LedgerError, ModuleId};
use crate::onboarding::OnboardingService;
use crate::wallet::{FileStore, KeyValueStore, MemoryStore, NullStore, StorageError, WalletStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid contract address: {0}")]
    Contract(#[from] KeyError),

    #[error("Wallet storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Open the wallet medium named by the storage config.
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let storage: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::File => Arc::new(FileStore::open(&config.path)?),
        StorageBackend::None => Arc::new(NullStore),
    };

    tracing::info!(
        backend = ?config.backend,
        namespace = %config.namespace,
        "Wallet storage opened"
    );
    Ok(storage)
}

/// The profile module the ledger calls target.
pub fn module_id(config: &LedgerConfig) -> Result<ModuleId, KeyError> {
    let address: AccountAddress = config.contract_address.parse()?;
    Ok(ModuleId::new(address, config.module_name.clone()))
}

/// Wire the onboarding service and HTTP state around `ledger`.
pub fn build_state<L: Ledger>(
    config: &AppConfig,
    ledger: Arc<L>,
    storage: Arc<dyn KeyValueStore>,
) -> Result<AppState<L>, StartupError> {
    let module = module_id(&config.ledger)?;
    let wallets = Arc::new(WalletStore::new(storage, config.storage.namespace.clone()));
    let (air_quality, advice) = advisory::clients(&config.advisory)?;

    let service = OnboardingService::new(wallets, ledger.clone(), module, air_quality, advice);
    Ok(AppState::new(service, ledger, &config.admin))
}

/// Start the service against the configured Aptos node and serve until shutdown.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let storage = open_storage(&config.storage)?;
    let ledger = Arc::new(AptosClient::new(config.ledger.clone())?);
    let state = build_state(&config, ledger, storage)?;

    let listener = TcpListener::bind(&config.server.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.server.bind_address.clone(),
            source,
        })?;

    if config.admin.enabled {
        tracing::info!("Admin API enabled");
    }

    HttpServer::new(state, &config.server, &config.admin)
        .run(listener)
        .await
        .map_err(StartupError::Serve)
}
