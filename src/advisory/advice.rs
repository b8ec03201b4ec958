//! Personalised health advice for a submitted profile.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisory::air_quality::AirQuality;
use crate::profile::HealthProfile;

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("Advice request failed: {0}")]
    Transport(String),

    #[error("Advice endpoint returned {status}")]
    Status { status: u16 },

    #[error("Advice response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AdviceError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            AdviceError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            AdviceError::Decode(e.to_string())
        } else {
            AdviceError::Transport(e.to_string())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdviceRequest<'a> {
    profile: &'a HealthProfile,
    aqi_data: &'a AirQuality,
}

#[derive(Deserialize)]
struct AdviceResponse {
    advice: String,
}

#[derive(Debug, Clone)]
pub struct AdviceClient {
    http: Client,
    url: String,
}

impl AdviceClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// `POST {profile, aqiData}` and return the `advice` text.
    pub async fn advise(
        &self,
        profile: &HealthProfile,
        air_quality: &AirQuality,
    ) -> Result<String, AdviceError> {
        let body = AdviceRequest {
            profile,
            aqi_data: air_quality,
        };
        let response: AdviceResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(chars = response.advice.len(), "Advice received");
        Ok(response.advice)
    }
}
