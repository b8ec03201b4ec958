//! Onboarding orchestration.
//!
//! # Data Flow
//! ```text
//! sign-in     → provision (create-or-fetch wallet)
//! dashboard   → corruption check → load wallet → read profile (found/absent/error)
//! onboarding  → load wallet → read profile → form prefill
//! submit      → validate → sign + finalize → air quality → advice (best-effort)
//! ```

pub mod service;

pub use service::{
    Dashboard, OnboardingError, OnboardingService, OnboardingState, ProfileState, Submission,
};
