//! Advisory services used after a profile submission.
//!
//! Both are best-effort: air quality falls back to a fixed reading and an
//! advice failure never fails the submission it follows.

pub mod advice;
pub mod air_quality;

use reqwest::Client;
use std::time::Duration;

use crate::config::AdvisoryConfig;

pub use advice::{AdviceClient, AdviceError};
pub use air_quality::{AirQuality, AirQualityClient};

/// Build both clients over one shared HTTP connection pool.
pub fn clients(config: &AdvisoryConfig) -> reqwest::Result<(AirQualityClient, AdviceClient)> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    Ok((
        AirQualityClient::new(http.clone(), config.air_quality_url.clone()),
        AdviceClient::new(http, config.advice_url.clone()),
    ))
}
