//! Authenticated user and the identifier wallets are keyed by.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Opaque subject id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Identifier the user's wallet record is stored under.
    ///
    /// Email wins over the subject id. Changing this order orphans every
    /// existing wallet record, so it is fixed.
    pub fn stable_id(&self) -> StableUserId {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => StableUserId(email.to_string()),
            _ => StableUserId(self.id.clone()),
        }
    }
}

/// Storage key suffix for one user's wallet. Used verbatim, never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableUserId(String);

impl StableUserId {
    /// `None` for an empty identifier.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
