//! TfL Unified API response DTOs.
//!
//! `StopPoint/{id}/Arrivals` returns a JSON array of prediction objects with
//! around twenty fields each. Only the four we act on are mapped; the rest
//! are ignored during deserialization.

use serde::{Deserialize, Serialize};

/// One arrival prediction as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArrival {
    /// Route identifier, e.g. "25".
    pub line_name: String,

    /// Human-readable stop name.
    pub station_name: String,

    /// Where the vehicle terminates.
    pub destination_name: String,

    /// Predicted seconds until the vehicle reaches the stop.
    pub time_to_station: i64,
}

impl RawArrival {
    pub fn new(
        line_name: impl Into<String>,
        station_name: impl Into<String>,
        destination_name: impl Into<String>,
        time_to_station: i64,
    ) -> Self {
        Self {
            line_name: line_name.into(),
            station_name: station_name.into(),
            destination_name: destination_name.into(),
            time_to_station,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ignores_extra_fields() {
        let json = r#"[{
            "$type": "Tfl.Api.Presentation.Entities.Prediction, Tfl.Api.Presentation.Entities",
            "id": "-1294999719",
            "operationType": 1,
            "vehicleId": "LTZ1234",
            "naptanId": "490008660N",
            "stationName": "High Street",
            "lineId": "25",
            "lineName": "25",
            "platformName": "N",
            "direction": "outbound",
            "destinationNaptanId": "",
            "destinationName": "Ilford",
            "timestamp": "2024-03-15T10:00:00.000Z",
            "timeToStation": 125,
            "currentLocation": "",
            "towards": "Ilford",
            "expectedArrival": "2024-03-15T10:02:05Z",
            "modeName": "bus"
        }]"#;

        let arrivals: Vec<RawArrival> = serde_json::from_str(json).unwrap();
        assert_eq!(
            arrivals,
            vec![RawArrival::new("25", "High Street", "Ilford", 125)]
        );
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let json = r#"[{"lineName": "25", "stationName": "X", "timeToStation": 60}]"#;
        assert!(serde_json::from_str::<Vec<RawArrival>>(json).is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        let arrivals: Vec<RawArrival> = serde_json::from_str("[]").unwrap();
        assert!(arrivals.is_empty());
    }
}
