//! Arrival notifications.
//!
//! Each cycle that finds arrivals at a stop publishes one [`ArrivalAlert`]
//! on a broadcast channel. Consumers subscribe; a send with nobody
//! listening is simply dropped.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::{ArrivalRecord, GroupedArrival, StopId};
use crate::process::ProcessedArrivals;

/// Event name for arrival notifications.
pub const BUS_ARRIVAL_ALERT: &str = "bus_arrival_alert";

/// How many undelivered alerts a slow subscriber may fall behind by.
pub const ALERT_CHANNEL_CAPACITY: usize = 64;

/// Payload of a `bus_arrival_alert` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalAlert {
    pub stop_id: StopId,
    pub arrivals: Vec<ArrivalRecord>,
    pub grouped_arrivals: Vec<GroupedArrival>,
}

impl ArrivalAlert {
    pub fn new(stop_id: StopId, processed: ProcessedArrivals) -> Self {
        Self {
            stop_id,
            arrivals: processed.arrivals,
            grouped_arrivals: processed.grouped,
        }
    }

    pub fn event_name(&self) -> &'static str {
        BUS_ARRIVAL_ALERT
    }
}

pub type AlertSender = broadcast::Sender<ArrivalAlert>;
pub type AlertReceiver = broadcast::Receiver<ArrivalAlert>;

/// Create an alert channel with the default capacity.
pub fn alert_channel() -> (AlertSender, AlertReceiver) {
    broadcast::channel(ALERT_CHANNEL_CAPACITY)
}
