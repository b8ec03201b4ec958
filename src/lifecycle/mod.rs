//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → storage medium → ledger client → onboarding service → listener
//!
//! Shutdown (http/server.rs):
//!     Ctrl+C → stop accepting → drain in-flight requests → exit
//! ```

pub mod startup;

pub use startup::{build_state, module_id, open_storage, run, StartupError};
