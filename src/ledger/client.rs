//! Ledger node client over the REST API.
//!
//! # Responsibilities
//! - Define the `Ledger` seam the profile clients are written against
//! - Build, encode, submit and await user transactions
//! - Call read-only view functions
//! - Map node failures to `LedgerError` with the node's message intact

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval, timeout};
use url::Url;

use crate::config::LedgerConfig;
use crate::ledger::types::{
    AccountAddress, CommittedTransaction, EntryFunctionPayload, LedgerError, LedgerResult,
    PendingTransaction, UserTransactionRequest, ViewRequest,
};
use crate::observability::metrics;

/// Operations the profile clients need from a ledger.
///
/// Every failure is reported as a `LedgerError`; nothing panics across
/// this boundary.
pub trait Ledger: Send + Sync + 'static {
    /// Stamp sequence number, gas and expiry onto an unsigned transaction.
    fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> impl Future<Output = LedgerResult<UserTransactionRequest>> + Send;

    /// Bytes the sender must sign for `request`.
    fn signing_message(
        &self,
        request: &UserTransactionRequest,
    ) -> impl Future<Output = LedgerResult<Vec<u8>>> + Send;

    /// Submit a signed transaction.
    fn submit(
        &self,
        request: &UserTransactionRequest,
    ) -> impl Future<Output = LedgerResult<PendingTransaction>> + Send;

    /// Block until `hash` leaves the pending state or the finality timeout elapses.
    fn wait_for_transaction(
        &self,
        hash: &str,
    ) -> impl Future<Output = LedgerResult<CommittedTransaction>> + Send;

    /// Execute a view function and return the node's JSON body.
    ///
    /// The body is returned as-is; callers check that it is a sequence.
    fn view(&self, request: &ViewRequest) -> impl Future<Output = LedgerResult<Value>> + Send;

    /// `true` when the ledger answers at all.
    fn is_healthy(&self) -> impl Future<Output = bool> + Send;
}

/// Error body returned by the node on non-success statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountResource {
    sequence_number: String,
}

#[derive(Debug, Deserialize)]
struct GasEstimate {
    gas_estimate: u64,
}

/// Node ledger summary from `GET /v1`.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    pub ledger_version: String,
}

#[derive(Debug, Deserialize)]
struct TransactionInfo {
    #[serde(rename = "type")]
    kind: String,
    hash: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

impl TransactionInfo {
    fn is_pending(&self) -> bool {
        self.kind == "pending_transaction"
    }

    fn into_committed(self) -> CommittedTransaction {
        CommittedTransaction {
            hash: self.hash,
            version: self.version.and_then(|v| v.parse().ok()),
            success: self.success.unwrap_or(false),
            vm_status: self.vm_status.unwrap_or_default(),
        }
    }
}

/// REST client for an Aptos full node.
#[derive(Clone)]
pub struct AptosClient {
    http: Client,
    /// Base URL ending in `/v1/`.
    base: Url,
    config: LedgerConfig,
}

impl AptosClient {
    /// Create a new client. No network traffic happens here.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let mut base = Url::parse(&config.node_url).map_err(|e| {
            LedgerError::Config(format!("Invalid node URL '{}': {}", config.node_url, e))
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let base = base
            .join("v1/")
            .map_err(|e| LedgerError::Config(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LedgerError::Config(e.to_string()))?;

        tracing::info!(
            node_url = %base,
            contract = %config.contract_address,
            module = %config.module_name,
            "Ledger client initialized"
        );

        Ok(Self { http, base, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> LedgerResult<Url> {
        self.base
            .join(path)
            .map_err(|e| LedgerError::Config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, op: &'static str, path: &str) -> LedgerResult<T> {
        let url = self.endpoint(path)?;
        let result = match self.http.get(url).send().await {
            Ok(response) => decode(response).await,
            Err(e) => Err(e.into()),
        };
        metrics::record_ledger_call(op, result.is_ok());
        result
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        op: &'static str,
        path: &str,
        body: &B,
    ) -> LedgerResult<T> {
        let url = self.endpoint(path)?;
        let result = match self.http.post(url).json(body).send().await {
            Ok(response) => decode(response).await,
            Err(e) => Err(e.into()),
        };
        metrics::record_ledger_call(op, result.is_ok());
        result
    }

    /// Ledger summary, including the chain id.
    pub async fn ledger_info(&self) -> LedgerResult<LedgerInfo> {
        self.get_json("ledger_info", "").await
    }

    /// Current sequence number of an on-chain account.
    pub async fn sequence_number(&self, address: AccountAddress) -> LedgerResult<u64> {
        let account: AccountResource = self
            .get_json("account", &format!("accounts/{}", address))
            .await?;
        account.sequence_number.parse().map_err(|e| {
            LedgerError::Decode(format!(
                "sequence_number '{}': {}",
                account.sequence_number, e
            ))
        })
    }

    /// Gas unit price the node currently suggests.
    pub async fn gas_price(&self) -> LedgerResult<u64> {
        let estimate: GasEstimate = self.get_json("gas_price", "estimate_gas_price").await?;
        Ok(estimate.gas_estimate)
    }

    /// Look up a transaction by hash. `None` while the node has not seen it.
    async fn transaction_by_hash(&self, hash: &str) -> LedgerResult<Option<TransactionInfo>> {
        match self
            .get_json("transaction_by_hash", &format!("transactions/by_hash/{}", hash))
            .await
        {
            Ok(info) => Ok(Some(info)),
            Err(LedgerError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Ledger for AptosClient {
    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> LedgerResult<UserTransactionRequest> {
        let sequence_number = self.sequence_number(sender).await?;
        let gas_unit_price = self.gas_price().await?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(UserTransactionRequest {
            sender: sender.to_string(),
            sequence_number: sequence_number.to_string(),
            max_gas_amount: self.config.max_gas_amount.to_string(),
            gas_unit_price: gas_unit_price.to_string(),
            expiration_timestamp_secs: (now + self.config.expiration_secs).to_string(),
            payload,
            signature: None,
        })
    }

    async fn signing_message(&self, request: &UserTransactionRequest) -> LedgerResult<Vec<u8>> {
        let encoded: String = self
            .post_json("encode_submission", "transactions/encode_submission", request)
            .await?;
        hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| LedgerError::Decode(format!("signing message: {}", e)))
    }

    async fn submit(&self, request: &UserTransactionRequest) -> LedgerResult<PendingTransaction> {
        self.post_json("submit", "transactions", request).await
    }

    async fn wait_for_transaction(&self, hash: &str) -> LedgerResult<CommittedTransaction> {
        let timeout_secs = self.config.finality_timeout_secs;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        let polling = async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                match self.transaction_by_hash(hash).await {
                    Ok(Some(info)) if !info.is_pending() => return Ok(info.into_committed()),
                    Ok(_) => tracing::debug!(tx_hash = %hash, "Transaction pending"),
                    Err(e) => return Err(e),
                }
            }
        };

        match timeout(Duration::from_secs(timeout_secs), polling).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LedgerError::FinalityTimeout {
                hash: hash.to_string(),
                timeout_secs,
            }),
        }
    }

    async fn view(&self, request: &ViewRequest) -> LedgerResult<Value> {
        self.post_json("view", "view", request).await
    }

    async fn is_healthy(&self) -> bool {
        match self.ledger_info().await {
            Ok(info) => {
                tracing::debug!(chain_id = info.chain_id, version = %info.ledger_version, "Ledger reachable");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ledger health check failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for AptosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AptosClient")
            .field("base", &self.base.as_str())
            .field("module", &self.config.module_name)
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}

/// Turn a node response into `T`, or an error carrying the node's message.
async fn decode<T: DeserializeOwned>(response: Response) -> LedgerResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| LedgerError::Decode(e.to_string()))
}

fn api_error(status: StatusCode, body: &str) -> LedgerError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => LedgerError::Api {
            status: status.as_u16(),
            message: parsed.message,
            error_code: parsed.error_code,
        },
        Err(_) => LedgerError::Api {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            },
            error_code: None,
        },
    }
}
