//! Scripted `Ledger` for the profile client unit tests.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde_json::Value;
use std::sync::Mutex;

use crate::ledger::{
    AccountAddress, CommittedTransaction, EntryFunctionPayload, Ledger, LedgerError, LedgerResult,
    PendingTransaction, UserTransactionRequest, ViewRequest,
};
use crate::profile::HealthProfile;

type ViewFn = Box<dyn Fn(&ViewRequest) -> LedgerResult<Value> + Send + Sync>;

pub(crate) fn sample_profile() -> HealthProfile {
    HealthProfile {
        name: "Ada".to_string(),
        age: 36,
        gender: "female".to_string(),
        chronic_condition: vec!["asthma".to_string()],
        preferred_walk_time: "morning".to_string(),
        pollution_sensitivity: "high".to_string(),
        location: "Lagos".to_string(),
    }
}

pub(crate) struct ScriptedLedger {
    view: ViewFn,
    commit_success: bool,
    reject_with: Option<String>,
    submitted: Mutex<Vec<UserTransactionRequest>>,
}

impl ScriptedLedger {
    fn base() -> Self {
        Self {
            view: Box::new(|_| Ok(Value::Array(Vec::new()))),
            commit_success: true,
            reject_with: None,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn viewing<F>(view: F) -> Self
    where
        F: Fn(&ViewRequest) -> LedgerResult<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            view: Box::new(move |request| view(request).map(Value::Array)),
            ..Self::base()
        }
    }

    /// Answer every view call with `body` as the node returned it.
    pub(crate) fn answering(body: Value) -> Self {
        Self {
            view: Box::new(move |_| Ok(body.clone())),
            ..Self::base()
        }
    }

    pub(crate) fn committing(success: bool) -> Self {
        Self {
            commit_success: success,
            ..Self::base()
        }
    }

    pub(crate) fn rejecting_submissions(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::base()
        }
    }

    pub(crate) fn submitted(&self) -> Vec<UserTransactionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// The signing message is the JSON encoding of the unsigned request.
    fn message_for(request: &UserTransactionRequest) -> Vec<u8> {
        let mut unsigned = request.clone();
        unsigned.signature = None;
        serde_json::to_vec(&unsigned).unwrap()
    }

    /// Check the attached signature against the sender's key.
    pub(crate) fn verify(request: &UserTransactionRequest) -> bool {
        let Some(auth) = &request.signature else {
            return false;
        };
        let key: [u8; 32] = hex::decode(auth.public_key.trim_start_matches("0x"))
            .unwrap()
            .try_into()
            .unwrap();
        let signature: [u8; 64] = hex::decode(auth.signature.trim_start_matches("0x"))
            .unwrap()
            .try_into()
            .unwrap();
        let key = VerifyingKey::from_bytes(&key).unwrap();

        AccountAddress::from_public_key(&key.to_bytes()).to_string() == request.sender
            && key
                .verify(&Self::message_for(request), &Signature::from_bytes(&signature))
                .is_ok()
    }
}

impl Ledger for ScriptedLedger {
    async fn build_transaction(
        &self,
        sender: AccountAddress,
        payload: EntryFunctionPayload,
    ) -> LedgerResult<UserTransactionRequest> {
        Ok(UserTransactionRequest {
            sender: sender.to_string(),
            sequence_number: "0".to_string(),
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
        if let Some(message) = &self.reject_with {
            return Err(LedgerError::Api {
                status: 400,
                message: message.clone(),
                error_code: Some("vm_error".to_string()),
            });
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok(PendingTransaction {
            hash: "0xfeed".to_string(),
        })
    }

    async fn wait_for_transaction(&self, hash: &str) -> LedgerResult<CommittedTransaction> {
        Ok(CommittedTransaction {
            hash: hash.to_string(),
            version: Some(1),
            success: self.commit_success,
            vm_status: if self.commit_success {
                "Executed successfully".to_string()
            } else {
                "Move abort in onboarding: EPROFILE_INVALID(0x1) ABORTED".to_string()
            },
        })
    }

    async fn view(&self, request: &ViewRequest) -> LedgerResult<Value> {
        (self.view)(request)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
