//! Shared utilities for integration tests.
#![allow(dead_code)]

use airpulse::config::AppConfig;
use airpulse::http::AppState;
use airpulse::ledger::{
    AccountAddress, CommittedTransaction, EntryFunctionPayload, Ledger, LedgerError, LedgerResult,
    PendingTransaction, UserTransactionRequest, ViewRequest,
};
use airpulse::lifecycle::build_state;
use airpulse::profile::HealthProfile;
use airpulse::wallet::{KeyValueStore, MemoryStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const ADMIN_KEY: &str = "test-admin-key-0123456789";
pub const ADVICE_TEXT: &str = "Walk early while the air is cleaner.";

pub fn sample_profile() -> HealthProfile {
    HealthProfile {
        name: "Ada".to_string(),
        age: 36,
        gender: "female".to_string(),
        chronic_condition: vec!["asthma".to_string(), "copd".to_string()],
        preferred_walk_time: "morning".to_string(),
        pollution_sensitivity: "high".to_string(),
        location: "Lagos".to_string(),
    }
}

fn verify_signature(message: &[u8], public_key: &str, signature: &str, sender: &str) -> bool {
    let decode = |s: &str| hex::decode(s.trim_start_matches("0x")).ok();
    let (Some(key), Some(sig)) = (decode(public_key), decode(signature)) else {
        return false;
    };
    let (Ok(key), Ok(sig)) = (<[u8; 32]>::try_from(key), <[u8; 64]>::try_from(sig)) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key) else {
        return false;
    };

    AccountAddress::from_public_key(&key.to_bytes()).to_string() == sender
        && key.verify(message, &Signature::from_bytes(&sig)).is_ok()
}

// ---------------------------------------------------------------------------
// In-process ledger
// ---------------------------------------------------------------------------

/// Ledger that keeps profiles in memory and checks every signature.
#[derive(Default)]
pub struct MockLedger {
    profiles: Mutex<HashMap<String, Vec<Value>>>,
    sequence: AtomicUsize,
    view_failure: Mutex<Option<String>>,
    submit_failure: Mutex<Option<String>>,
    pub views: AtomicUsize,
    pub submissions: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every view fail with a node error carrying `message`.
    pub fn fail_views(&self, message: &str) {
        *self.view_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_submissions(&self, message: &str) {
        *self.submit_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn heal(&self) {
        *self.view_failure.lock().unwrap() = None;
        *self.submit_failure.lock().unwrap() = None;
    }

    /// Store raw view values for `address`, bypassing signing.
    pub fn put_raw(&self, address: &str, values: Vec<Value>) {
        self.profiles
            .lock()
            .unwrap()
            .insert(address.to_string(), values);
    }

    pub fn stored(&self, address: &str) -> Option<Vec<Value>> {
        self.profiles.lock().unwrap().get(address).cloned()
    }

    fn message_for(request: &UserTransactionRequest) -> Vec<u8> {
        let mut unsigned = request.clone();
        unsigned.signature = None;
        serde_json::to_vec(&unsigned).unwrap()
    }

    fn api_error(message: &str) -> LedgerError {
        LedgerError::Api {
            status: 400,
            message: message.to_string(),
            error_code: Some("invalid_input".to_string()),
        }
    }
}

impl Ledger for MockLedger {
    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> LedgerResult<UserTransactionRequest> {
        Ok(UserTransactionRequest {
            sender: sender.to_string(),
            sequence_number: self.sequence.load(Ordering::SeqCst).to_string(),
            max_gas_amount: "200000".to_string(),
            gas_unit_price: "100".to_string(),
            expiration_timestamp_secs: "4102444800".to_string(),
            payload,
            signature: None,
        })
    }

    async fn signing_message(&self, request: &UserTransactionRequest) -> LedgerResult<Vec<u8>> {
        Ok(Self::message_for(request))
    }

    async fn submit(&self, request: &UserTransactionRequest) -> LedgerResult<PendingTransaction> {
        if let Some(message) = self.submit_failure.lock().unwrap().clone() {
            return Err(Self::api_error(&message));
        }

        let Some(auth) = &request.signature else {
            return Err(Self::api_error("Missing signature"));
        };
        if !verify_signature(
            &Self::message_for(request),
            &auth.public_key,
            &auth.signature,
            &request.sender,
        ) {
            return Err(Self::api_error("Invalid transaction: INVALID_SIGNATURE"));
        }
        if !request.payload.function.to_string().ends_with("::set_profile") {
            return Err(Self::api_error("Unknown entry function"));
        }

        self.put_raw(&request.sender, request.payload.arguments.clone());
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.submissions.fetch_add(1, Ordering::SeqCst);

        Ok(PendingTransaction {
            hash: format!("0x{:064x}", n + 1),
        })
    }

    async fn wait_for_transaction(&self, hash: &str) -> LedgerResult<CommittedTransaction> {
        Ok(CommittedTransaction {
            hash: hash.to_string(),
            version: Some(self.sequence.load(Ordering::SeqCst) as u64),
            success: true,
            vm_status: "Executed successfully".to_string(),
        })
    }

    async fn view(&self, request: &ViewRequest) -> LedgerResult<Value> {
        self.views.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.view_failure.lock().unwrap().clone() {
            return Err(Self::api_error(&message));
        }

        let address = request
            .arguments
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let stored = self.stored(&address);

        match request.function.name.as_str() {
            "view_profile" => stored
                .map(Value::Array)
                .ok_or_else(|| Self::api_error("Profile not found")),
            "has_profile" => Ok(json!([stored.is_some()])),
            other => Err(Self::api_error(&format!("Unknown view function {}", other))),
        }
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Fake Aptos REST node
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct NodeState {
    profiles: Mutex<HashMap<String, Vec<Value>>>,
    sequence: Mutex<HashMap<String, u64>>,
    polls: Mutex<HashMap<String, usize>>,
    /// Polls answered with `pending_transaction` before the result.
    pub pending_polls: AtomicUsize,
    pub never_finalize: AtomicBool,
    pub abort_transactions: AtomicBool,
    pub rate_limited: AtomicBool,
    /// Answer views with a JSON object instead of a sequence.
    pub object_views: AtomicBool,
    pub submissions: AtomicUsize,
}

impl NodeState {
    pub fn stored(&self, address: &str) -> Option<Vec<Value>> {
        self.profiles.lock().unwrap().get(address).cloned()
    }

    pub fn put_raw(&self, address: &str, values: Vec<Value>) {
        self.profiles
            .lock()
            .unwrap()
            .insert(address.to_string(), values);
    }
}

pub struct FakeNode {
    pub url: String,
    pub state: Arc<NodeState>,
}

fn node_error(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({ "message": message, "error_code": code, "vm_error_code": null })),
    )
        .into_response()
}

/// The signing message is the canonical JSON of the unsigned submission.
fn encode(mut body: Value) -> Vec<u8> {
    if let Some(object) = body.as_object_mut() {
        object.remove("signature");
    }
    serde_json::to_vec(&body).unwrap()
}

async fn ledger_info() -> Json<Value> {
    Json(json!({ "chain_id": 2, "ledger_version": "1000", "epoch": "10" }))
}

async fn account(State(state): State<Arc<NodeState>>, Path(address): Path<String>) -> Json<Value> {
    let sequence = state
        .sequence
        .lock()
        .unwrap()
        .get(&address)
        .copied()
        .unwrap_or(0);
    Json(json!({ "sequence_number": sequence.to_string(), "authentication_key": address }))
}

async fn gas_price() -> Json<Value> {
    Json(json!({ "gas_estimate": 100, "prioritized_gas_estimate": 150 }))
}

async fn encode_submission(Json(body): Json<Value>) -> Json<Value> {
    Json(json!(format!("0x{}", hex::encode(encode(body)))))
}

async fn submit(State(state): State<Arc<NodeState>>, Json(body): Json<Value>) -> Response {
    let sender = body["sender"].as_str().unwrap_or_default().to_string();
    let public_key = body["signature"]["public_key"].as_str().unwrap_or_default().to_string();
    let signature = body["signature"]["signature"].as_str().unwrap_or_default().to_string();
    let arguments = body["payload"]["arguments"].as_array().cloned().unwrap_or_default();
    let function = body["payload"]["function"].as_str().unwrap_or_default().to_string();

    if body["signature"]["type"] != json!("ed25519_signature")
        || !verify_signature(&encode(body.clone()), &public_key, &signature, &sender)
    {
        return node_error(
            StatusCode::BAD_REQUEST,
            "Invalid transaction: Type: Validation Code: INVALID_SIGNATURE",
            "vm_error",
        );
    }
    if !function.ends_with("::set_profile") || arguments.len() != 7 {
        return node_error(StatusCode::BAD_REQUEST, "Invalid entry function call", "invalid_input");
    }

    let n = state.submissions.fetch_add(1, Ordering::SeqCst) + 1;
    *state.sequence.lock().unwrap().entry(sender.clone()).or_insert(0) += 1;
    if !state.abort_transactions.load(Ordering::SeqCst) {
        state.put_raw(&sender, arguments);
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({ "hash": format!("0x{:064x}", n), "sender": sender })),
    )
        .into_response()
}

async fn by_hash(State(state): State<Arc<NodeState>>, Path(hash): Path<String>) -> Response {
    let known = u64::from_str_radix(hash.trim_start_matches("0x"), 16)
        .map(|n| n >= 1 && n as usize <= state.submissions.load(Ordering::SeqCst))
        .unwrap_or(false);
    if !known {
        return node_error(
            StatusCode::NOT_FOUND,
            &format!("Transaction not found by Transaction hash({})", hash),
            "transaction_not_found",
        );
    }

    let polls = {
        let mut polls = state.polls.lock().unwrap();
        let count = polls.entry(hash.clone()).or_insert(0);
        *count += 1;
        *count
    };

    if state.never_finalize.load(Ordering::SeqCst)
        || polls <= state.pending_polls.load(Ordering::SeqCst)
    {
        return Json(json!({ "type": "pending_transaction", "hash": hash })).into_response();
    }

    let aborted = state.abort_transactions.load(Ordering::SeqCst);
    Json(json!({
        "type": "user_transaction",
        "hash": hash,
        "version": "4242",
        "success": !aborted,
        "vm_status": if aborted {
            "Move abort in 0x42::onboarding: EINVALID_PROFILE(0x1)"
        } else {
            "Executed successfully"
        },
    }))
    .into_response()
}

async fn view(State(state): State<Arc<NodeState>>, Json(body): Json<Value>) -> Response {
    if state.rate_limited.load(Ordering::SeqCst) {
        return node_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Per anonymous IP rate limit exceeded. Limit: 50000 compute units per 300 seconds window.",
            "rate_limited",
        );
    }

    if state.object_views.load(Ordering::SeqCst) {
        return Json(json!({ "name": "Ada" })).into_response();
    }

    let function = body["function"].as_str().unwrap_or_default().to_string();
    let address = body["arguments"][0].as_str().unwrap_or_default().to_string();
    let stored = state.stored(&address);

    if function.ends_with("::view_profile") {
        match stored {
            Some(values) => Json(Value::Array(values)).into_response(),
            None => node_error(
                StatusCode::BAD_REQUEST,
                "Profile not found",
                "invalid_input",
            ),
        }
    } else if function.ends_with("::has_profile") {
        Json(json!([stored.is_some()])).into_response()
    } else {
        node_error(StatusCode::BAD_REQUEST, "Function not found", "function_not_found")
    }
}

/// Serve a fake Aptos full node on an ephemeral port.
pub async fn start_fake_node() -> FakeNode {
    let state = Arc::new(NodeState::default());
    let app = Router::new()
        .route("/v1", get(ledger_info))
        .route("/v1/", get(ledger_info))
        .route("/v1/accounts/{address}", get(account))
        .route("/v1/estimate_gas_price", get(gas_price))
        .route("/v1/transactions/encode_submission", post(encode_submission))
        .route("/v1/transactions", post(submit))
        .route("/v1/transactions/by_hash/{hash}", get(by_hash))
        .route("/v1/view", post(view))
        .with_state(state.clone());

    FakeNode {
        url: serve(app).await,
        state,
    }
}

// ---------------------------------------------------------------------------
// Advisory endpoints
// ---------------------------------------------------------------------------

pub struct FakeAdvisory {
    pub aqi_url: String,
    pub advice_url: String,
    pub advice_requests: Arc<Mutex<Vec<Value>>>,
}

/// Serve an AQI endpoint and an advice endpoint that records its requests.
pub async fn start_advisory() -> FakeAdvisory {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    let app = Router::new()
        .route(
            "/aqi",
            get(|| async {
                Json(json!({ "aqi": 57, "aqiCategory": "Good", "forecast": { "9 AM": 50 } }))
            }),
        )
        .route(
            "/api/getAdvice",
            post(move |Json(body): Json<Value>| {
                let recorded = recorded.clone();
                async move {
                    recorded.lock().unwrap().push(body);
                    Json(json!({ "advice": ADVICE_TEXT }))
                }
            }),
        );

    let base = serve(app).await;
    FakeAdvisory {
        aqi_url: format!("{}/aqi", base),
        advice_url: format!("{}/api/getAdvice", base),
        advice_requests: requests,
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Application wiring
// ---------------------------------------------------------------------------

/// Config pointing the advisory clients at `advisory`, admin enabled.
pub fn test_config(advisory: Option<&FakeAdvisory>) -> AppConfig {
    let mut config = AppConfig::default();
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    config.advisory.timeout_secs = 2;
    match advisory {
        Some(advisory) => {
            config.advisory.air_quality_url = Some(advisory.aqi_url.clone());
            config.advisory.advice_url = advisory.advice_url.clone();
        }
        None => {
            config.advisory.air_quality_url = None;
            config.advisory.advice_url = "http://127.0.0.1:1/api/getAdvice".to_string();
        }
    }
    config
}

pub struct TestApp {
    pub state: AppState<MockLedger>,
    pub ledger: Arc<MockLedger>,
    pub storage: Arc<MemoryStore>,
    pub config: AppConfig,
}

pub fn test_app(config: AppConfig) -> TestApp {
    let ledger = MockLedger::new();
    let storage = Arc::new(MemoryStore::new());
    let medium: Arc<dyn KeyValueStore> = storage.clone();
    let state = build_state(&config, ledger.clone(), medium).unwrap();

    TestApp {
        state,
        ledger,
        storage,
        config,
    }
}
