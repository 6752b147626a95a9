//! Mock arrivals source for testing without network access.
//!
//! Serves canned responses per stop, either set in code or loaded from a
//! directory of `{stop_id}.json` files holding TfL-shaped arrival arrays.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::{InvalidStopId, StopId};
use crate::scheduler::ArrivalSource;

use super::error::FetchError;
use super::types::RawArrival;

/// What the mock should do when asked for a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Succeed with these arrivals.
    Arrivals(Vec<RawArrival>),
    /// Fail as if the API returned this status.
    Status(u16),
    /// Fail as if the body could not be parsed.
    Malformed,
    /// Fail as if the request timed out.
    Timeout,
    /// Never answer; the caller's own timeout has to fire.
    Stall,
}

/// Errors loading mock data from disk.
#[derive(Debug, thiserror::Error)]
pub enum MockLoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {message}")]
    Json { path: PathBuf, message: String },

    #[error("bad mock file name {path:?}: {source}")]
    StopId {
        path: PathBuf,
        source: InvalidStopId,
    },

    #[error("no mock arrival files found in {0:?}")]
    Empty(PathBuf),
}

/// Arrivals source that serves canned responses.
///
/// Stops with no configured response answer with HTTP 404, like TfL does
/// for unknown stop points. Every call is counted per stop.
#[derive(Debug, Clone, Default)]
pub struct MockArrivalSource {
    responses: Arc<RwLock<HashMap<StopId, MockResponse>>>,
    calls: Arc<Mutex<HashMap<StopId, usize>>>,
}

impl MockArrivalSource {
    /// Create a mock with no responses configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock by loading `{stop_id}.json` files from a directory.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, MockLoadError> {
        let data_dir = data_dir.as_ref();
        let mut responses = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| MockLoadError::Io {
            path: data_dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| MockLoadError::Io {
                path: data_dir.to_path_buf(),
                source: e,
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let stop_id = StopId::parse(stem).map_err(|e| MockLoadError::StopId {
                path: path.clone(),
                source: e,
            })?;

            let json = std::fs::read_to_string(&path).map_err(|e| MockLoadError::Io {
                path: path.clone(),
                source: e,
            })?;

            let arrivals: Vec<RawArrival> =
                serde_json::from_str(&json).map_err(|e| MockLoadError::Json {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

            responses.insert(stop_id, MockResponse::Arrivals(arrivals));
        }

        if responses.is_empty() {
            return Err(MockLoadError::Empty(data_dir.to_path_buf()));
        }

        Ok(Self {
            responses: Arc::new(RwLock::new(responses)),
            calls: Arc::default(),
        })
    }

    /// Set the response for a stop, replacing any previous one.
    pub async fn set(&self, stop_id: StopId, response: MockResponse) {
        self.responses.write().await.insert(stop_id, response);
    }

    /// Stops with a configured response.
    pub async fn available_stops(&self) -> Vec<StopId> {
        let mut stops: Vec<StopId> = self.responses.read().await.keys().cloned().collect();
        stops.sort();
        stops
    }

    /// How many times a stop has been fetched.
    pub async fn call_count(&self, stop_id: &StopId) -> usize {
        self.calls.lock().await.get(stop_id).copied().unwrap_or(0)
    }

    /// Total fetches across all stops.
    pub async fn total_calls(&self) -> usize {
        self.calls.lock().await.values().sum()
    }
}

impl ArrivalSource for MockArrivalSource {
    async fn fetch_arrivals(&self, stop_id: &StopId) -> Result<Vec<RawArrival>, FetchError> {
        *self.calls.lock().await.entry(stop_id.clone()).or_default() += 1;

        let response = self.responses.read().await.get(stop_id).cloned();
        match response {
            Some(MockResponse::Arrivals(arrivals)) => Ok(arrivals),
            Some(MockResponse::Status(status)) => Err(FetchError::HttpStatus {
                status,
                body: String::new(),
            }),
            Some(MockResponse::Malformed) => Err(FetchError::Parse {
                message: "mock malformed body".to_string(),
                body: None,
            }),
            Some(MockResponse::Timeout) => Err(FetchError::Timeout),
            Some(MockResponse::Stall) => std::future::pending().await,
            None => Err(FetchError::HttpStatus {
                status: 404,
                body: format!("no mock data for stop {stop_id}"),
            }),
        }
    }
}
