//! Analytics API client
//!
//! Implements the three backend endpoints the dashboard consumes:
//! - `GET {base}/latest` - price, analysis and recent candles
//! - `GET {base}/klines` - candle series for one granularity
//! - `GET {base}/status` - service liveness
//!
//! The controller talks to the backend through the [`Feed`] trait so tests
//! can script responses and timing.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::types::{BackendStatus, Candle, Candles, Envelope, Period, Snapshot};

/// Source of snapshots and candle series
#[async_trait]
pub trait Feed: Send + Sync {
    /// Latest price + analysis + candles
    async fn latest(&self) -> Result<Snapshot>;

    /// Candle series for one granularity
    async fn klines(&self, period: Period, limit: u32) -> Result<Vec<Candle>>;

    /// Backend liveness
    async fn status(&self) -> Result<BackendStatus>;
}

/// HTTP client for the analytics API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for the configured API base
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("eth-dashboard/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Perform GET request and decode the body
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

#[async_trait]
impl Feed for ApiClient {
    async fn latest(&self) -> Result<Snapshot> {
        let envelope: Envelope<Snapshot> = self.get("/latest", &[]).await?;
        envelope.into_result()
    }

    async fn klines(&self, period: Period, limit: u32) -> Result<Vec<Candle>> {
        let limit = limit.to_string();
        let envelope: Envelope<Candles> = self
            .get(
                "/klines",
                &[("granularity", period.as_str()), ("limit", limit.as_str())],
            )
            .await?;
        envelope.into_result().map(|candles| candles.0)
    }

    async fn status(&self) -> Result<BackendStatus> {
        self.get("/status", &[]).await
    }
}

/// Decode a response body, preferring the backend's own error message
///
/// The backend answers failures with HTTP 500 *and* a `{success: false,
/// error}` envelope, so the body is tried first and the status code only
/// reported when the body is not JSON.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => {
            let snippet: String = body.chars().take(200).collect();
            Err(DashboardError::Api(format!("HTTP {status}: {snippet}")))
        }
        Err(err) => Err(DashboardError::Json(err)),
    }
}
