//! Bus arrival alert server.
//!
//! Polls TfL for a set of configured bus stops, keeps the latest arrivals
//! per stop, and publishes a `bus_arrival_alert` whenever buses are on the
//! way. The latest snapshots are served over a small HTTP API.

pub mod alert;
pub mod config;
pub mod domain;
pub mod process;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod tfl;
pub mod web;
