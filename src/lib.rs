//! AirPulse onboarding service.
//!
//! Per-user Aptos wallets, health profiles stored on-chain, and the HTTP
//! API a browser front end drives them through.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!   Gateway ──────┼─▶ http ──▶ onboarding ──┬──▶ wallet ──▶ storage   │
//!   (user hdrs)   │                         ├──▶ profile ──▶ ledger ──┼──▶ Aptos node
//!                 │                         └──▶ advisory ────────────┼──▶ AQI / advice
//!                 │  config · observability · lifecycle               │
//!                 └──────────────────────────────────────────────────┘
//! ```

pub mod advisory;
pub mod config;
pub mod http;
pub mod ledger;
pub mod lifecycle;
pub mod observability;
pub mod onboarding;
pub mod profile;
pub mod wallet;

pub use config::AppConfig;
pub use http::HttpServer;
pub use onboarding::OnboardingService;
