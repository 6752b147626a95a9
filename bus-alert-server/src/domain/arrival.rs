//! Normalized arrival records.

use serde::Serialize;

/// One predicted vehicle arrival at a stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArrivalRecord {
    /// Route identifier (e.g. "25").
    pub line: String,

    /// Stop name as reported by the API.
    pub station: String,

    /// Final destination of the vehicle.
    pub destination: String,

    /// Whole minutes until arrival, rounded down.
    pub minutes: u32,
}

impl ArrivalRecord {
    pub fn new(
        line: impl Into<String>,
        station: impl Into<String>,
        destination: impl Into<String>,
        minutes: u32,
    ) -> Self {
        Self {
            line: line.into(),
            station: station.into(),
            destination: destination.into(),
            minutes,
        }
    }
}

/// Convert seconds-to-arrival into whole minutes.
///
/// Negative predictions (vehicle already due) clamp to zero.
///
/// ```
/// use bus_alert_server::domain::minutes_from_seconds;
///
/// assert_eq!(minutes_from_seconds(125), 2);
/// assert_eq!(minutes_from_seconds(59), 0);
/// assert_eq!(minutes_from_seconds(-30), 0);
/// ```
pub fn minutes_from_seconds(seconds: i64) -> u32 {
    u32::try_from(seconds.max(0) / 60).unwrap_or(u32::MAX)
}

/// All arrivals sharing one `(line, destination)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedArrival {
    pub line: String,
    pub destination: String,

    /// Minutes until each vehicle, ascending.
    pub minutes: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_round_down() {
        assert_eq!(minutes_from_seconds(0), 0);
        assert_eq!(minutes_from_seconds(59), 0);
        assert_eq!(minutes_from_seconds(60), 1);
        assert_eq!(minutes_from_seconds(125), 2);
        assert_eq!(minutes_from_seconds(305), 5);
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        assert_eq!(minutes_from_seconds(-1), 0);
        assert_eq!(minutes_from_seconds(i64::MIN), 0);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(minutes_from_seconds(i64::MAX), u32::MAX);
    }

    #[test]
    fn serializes_field_names() {
        let record = ArrivalRecord::new("25", "High Street", "Ilford", 3);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "line": "25",
                "station": "High Street",
                "destination": "Ilford",
                "minutes": 3
            })
        );
    }
}
