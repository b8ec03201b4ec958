//! Health profiles on the ledger.
//!
//! # Data Flow
//! ```text
//! Write: HealthProfile → to_arguments → set_profile tx → sign → submit → await finality
//! Read:  wallet address → view_profile / has_profile → classify errors → coerce fields
//! ```
//!
//! # Outcomes
//! Reads resolve to found, `QueryError::Absent`, or a genuine failure
//! (`Shape`, `Key`, `Ledger`). Absence drives the "create profile" state
//! and is never shown as an error.

pub mod query;
pub mod transaction;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use query::{classify, ProfileQueryClient, QueryError, HAS_PROFILE, VIEW_PROFILE};
pub use transaction::{ProfileTransactionClient, SubmitError, SubmitReceipt, SET_PROFILE};
pub use types::{FieldError, HealthProfile, PROFILE_FIELD_COUNT};
