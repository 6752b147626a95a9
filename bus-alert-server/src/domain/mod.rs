//! Domain types for the bus arrival alert service.
//!
//! Configuration-facing types (`StopId`, `StopConfig`, `ActiveWindow`,
//! `ScanInterval`) enforce their invariants at construction time, so the
//! polling cycle can trust what it is handed. Arrival types are plain data
//! recreated on every cycle.

mod arrival;
mod interval;
mod stop;
mod window;

pub use arrival::{ArrivalRecord, GroupedArrival, minutes_from_seconds};
pub use interval::{
    DEFAULT_SCAN_INTERVAL_SECS, InvalidScanInterval, MAX_SCAN_INTERVAL_SECS,
    MIN_SCAN_INTERVAL_SECS, ScanInterval,
};
pub use stop::{InvalidStopId, InvalidWeekday, StopConfig, StopId, parse_weekday};
pub use window::{ActiveWindow, InvalidTime, parse_wall_time};
