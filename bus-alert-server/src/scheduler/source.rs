//! The seam between the poller and the network.

use std::future::Future;

use crate::domain::StopId;
use crate::tfl::{FetchError, RawArrival};

/// Something that can fetch raw arrivals for a stop.
///
/// This abstraction allows the poller to be tested with mock data.
/// Implementations make one attempt per call and never retry.
pub trait ArrivalSource: Send + Sync + 'static {
    /// Fetch the current raw arrival entries for `stop_id`.
    fn fetch_arrivals(
        &self,
        stop_id: &StopId,
    ) -> impl Future<Output = Result<Vec<RawArrival>, FetchError>> + Send;
}
