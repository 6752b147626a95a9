//! TfL arrivals HTTP client.
//!
//! One `GET /StopPoint/{id}/Arrivals` per call, bounded by the client
//! timeout, with no internal retry.

use std::time::Duration;

use crate::domain::StopId;
use crate::scheduler::ArrivalSource;

use super::error::{FetchError, excerpt};
use super::types::RawArrival;

/// Default base URL for the TfL Unified API.
const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the TfL client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TflConfig {
    /// Base URL for the API (defaults to production TfL)
    pub base_url: String,
    /// Optional application key, sent as the `app_key` query parameter
    pub app_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl TflConfig {
    /// Create a config pointing at production TfL with no app key.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send an application key with every request.
    pub fn with_app_key(mut self, key: impl Into<String>) -> Self {
        self.app_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TflConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// TfL arrivals client.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: String,
    app_key: Option<String>,
}

impl TflClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_key: config.app_key,
        })
    }

    /// The arrivals endpoint for a stop.
    pub fn arrivals_url(&self, stop_id: &StopId) -> String {
        format!("{}/StopPoint/{}/Arrivals", self.base_url, stop_id.as_str())
    }

    /// Fetch the current arrival predictions for a stop.
    ///
    /// Exactly one request is made. Anything other than 200 OK with a JSON
    /// array body is an error; there are no partial results.
    pub async fn fetch(&self, stop_id: &StopId) -> Result<Vec<RawArrival>, FetchError> {
        let mut request = self.http.get(self.arrivals_url(stop_id));
        if let Some(key) = &self.app_key {
            request = request.query(&[("app_key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let body = response.text().await?;
        parse_arrivals(&body)
    }
}

impl ArrivalSource for TflClient {
    async fn fetch_arrivals(&self, stop_id: &StopId) -> Result<Vec<RawArrival>, FetchError> {
        self.fetch(stop_id).await
    }
}

/// Parse an arrivals response body.
pub fn parse_arrivals(body: &str) -> Result<Vec<RawArrival>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        message: e.to_string(),
        body: Some(excerpt(body)),
    })
}
