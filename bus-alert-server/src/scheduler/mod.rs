//! Recurring poll-filter-group cycle.
//!
//! A [`PollScheduler`] owns one entry's stop set and runs a cycle every
//! scan interval:
//!
//! 1. Skip stops outside their day/time window
//! 2. Fetch the rest concurrently, each bounded by [`FETCH_TIMEOUT`]
//! 3. Filter, sort and group each successful response
//! 4. Replace that stop's snapshot
//! 5. Publish an alert if anything is arriving
//!
//! A failed fetch is logged and leaves the stop's previous snapshot alone.

mod manager;
mod source;
mod task;

pub use manager::{CycleReport, FETCH_TIMEOUT, PollScheduler};
pub use source::ArrivalSource;
pub use task::{PollHandle, spawn_poll_loop};
