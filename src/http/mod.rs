//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway request (x-user-id / x-user-email / x-user-name)
//!     → server.rs (request id, trace span, timeout, body limit, metrics)
//!     → identity.rs (CurrentUser extractor, 401 without identity)
//!     → handlers.rs / admin.rs
//!     → OnboardingService
//!     → error.rs (OnboardingError → status + JSON body)
//! ```

pub mod admin;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, AppState, HttpServer};
