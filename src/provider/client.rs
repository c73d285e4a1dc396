//! HTTP client for the upstream market-data API
//!
//! Issues `GET {base_url}/query?function={F}&symbol={S}&apikey={K}` with a
//! bounded timeout and decodes the JSON body. Transport status and decode
//! failures are distinct error variants; soft signals inside a 200 body are
//! left to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{FetchError, Granularity, MonthlyResponse, WeeklyResponse};
use super::SeriesProvider;
use crate::config::{Credentials, ProviderConfig};

/// Client for the AlphaVantage query API
pub struct AlphaVantageClient {
    config: ProviderConfig,
    api_key: String,
    client: Client,
}

impl AlphaVantageClient {
    /// Create a client from configuration and the process credentials
    pub fn new(config: ProviderConfig, credentials: &Credentials) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            api_key: credentials.api_key().to_string(),
            client,
        }
    }

    /// Base URL the client is pointed at
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn fetch_series<T: DeserializeOwned>(
        &self,
        granularity: Granularity,
        symbol: &str,
    ) -> Result<T, FetchError> {
        if symbol.is_empty() {
            return Err(FetchError::InvalidParams("symbol must not be empty"));
        }
        if self.api_key.is_empty() {
            return Err(FetchError::InvalidParams("api key must not be empty"));
        }

        let url = format!("{}/query", self.config.base_url);
        tracing::debug!(
            symbol,
            function = granularity.query_function(),
            "Fetching series from provider"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", granularity.query_function()),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SeriesProvider for AlphaVantageClient {
    async fn monthly_adjusted(&self, symbol: &str) -> Result<MonthlyResponse, FetchError> {
        self.fetch_series(Granularity::MonthlyAdjusted, symbol).await
    }

    async fn weekly_adjusted(&self, symbol: &str) -> Result<WeeklyResponse, FetchError> {
        self.fetch_series(Granularity::WeeklyAdjusted, symbol).await
    }
}
