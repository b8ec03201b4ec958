//! Air-quality readings with a fixed fallback.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reading shown next to a submitted profile and sent to the advice endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQuality {
    pub aqi: u32,
    pub aqi_category: String,
    /// Hour label to forecast index, e.g. `"5 PM" => 115`.
    #[serde(default)]
    pub forecast: BTreeMap<String, u32>,
}

impl AirQuality {
    /// Reading used whenever the endpoint is unset or fails.
    pub fn fallback() -> Self {
        Self {
            aqi: 112,
            aqi_category: "Moderate".to_string(),
            forecast: BTreeMap::from([("5 PM".to_string(), 115)]),
        }
    }
}

/// Fetches the current reading. Never fails; see `AirQuality::fallback`.
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    http: Client,
    url: Option<String>,
}

impl AirQualityClient {
    pub fn new(http: Client, url: Option<String>) -> Self {
        Self { http, url }
    }

    pub async fn current(&self) -> AirQuality {
        let Some(url) = self.url.as_deref() else {
            return AirQuality::fallback();
        };

        match self.fetch(url).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Air-quality fetch failed; using fallback");
                AirQuality::fallback()
            }
        }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<AirQuality> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
