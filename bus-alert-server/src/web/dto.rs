//! Data transfer objects for web responses.

use serde::Serialize;

use crate::domain::{ArrivalRecord, GroupedArrival, StopConfig};
use crate::process::group_arrivals;

/// Registered entries.
#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub entries: Vec<String>,
}

/// One configured stop and a one-line summary of its latest snapshot.
#[derive(Debug, Serialize)]
pub struct StopSummary {
    pub stop_id: String,

    /// Configured name, or the stop id
    pub name: String,

    /// "3 buses", "No buses", or null when never polled
    pub state: Option<String>,
}

impl StopSummary {
    pub fn new(stop: &StopConfig, snapshot: Option<&[ArrivalRecord]>) -> Self {
        Self {
            stop_id: stop.stop_id().to_string(),
            name: stop.display_name().to_string(),
            state: snapshot.map(summarize),
        }
    }
}

/// Stops configured for one entry.
#[derive(Debug, Serialize)]
pub struct StopListResponse {
    pub entry_id: String,
    pub stops: Vec<StopSummary>,
}

/// Latest arrivals for one stop.
#[derive(Debug, Serialize)]
pub struct ArrivalsResponse {
    pub stop_id: String,
    pub arrivals: Vec<ArrivalRecord>,
    pub grouped_arrivals: Vec<GroupedArrival>,
}

impl ArrivalsResponse {
    pub fn new(stop_id: impl Into<String>, arrivals: &[ArrivalRecord]) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrivals: arrivals.to_vec(),
            grouped_arrivals: group_arrivals(arrivals),
        }
    }
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn summarize(arrivals: &[ArrivalRecord]) -> String {
    match arrivals.len() {
        0 => "No buses".to_string(),
        1 => "1 bus".to_string(),
        n => format!("{n} buses"),
    }
}
