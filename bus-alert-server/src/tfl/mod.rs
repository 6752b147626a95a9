//! TfL Unified API arrivals client.
//!
//! This module provides an HTTP client for the `StopPoint/{id}/Arrivals`
//! endpoint, which returns live bus arrival predictions for one stop.
//!
//! Key characteristics of the endpoint:
//! - Responses are an unordered JSON array; ordering is our job
//! - `timeToStation` is in seconds and may be slightly negative for a
//!   vehicle that is already due
//! - No authentication is required; an `app_key` only raises rate limits

mod client;
mod error;
mod mock;
mod types;

pub use client::{DEFAULT_TIMEOUT_SECS, TflClient, TflConfig, parse_arrivals};
pub use error::FetchError;
pub use mock::{MockArrivalSource, MockLoadError, MockResponse};
pub use types::RawArrival;
