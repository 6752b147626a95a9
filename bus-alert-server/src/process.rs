//! Filtering, normalization and grouping of raw arrivals.
//!
//! Everything here is a pure function of its inputs: the same stop config,
//! raw entries and clock reading always give the same output.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDateTime};

use crate::domain::{ArrivalRecord, GroupedArrival, StopConfig, minutes_from_seconds};
use crate::tfl::RawArrival;

/// Result of processing one stop's raw arrivals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessedArrivals {
    /// Every surviving arrival, ascending by minutes.
    pub arrivals: Vec<ArrivalRecord>,

    /// The same arrivals bucketed by `(line, destination)`.
    pub grouped: Vec<GroupedArrival>,
}

/// Whether a stop should be polled at `now` (local wall-clock time).
///
/// A stop is inactive on a day outside its `days` list, or at a time
/// outside its window. No days or no window means no restriction.
pub fn is_active(stop: &StopConfig, now: NaiveDateTime) -> bool {
    if !stop.days().is_empty() && !stop.days().contains(&now.weekday()) {
        return false;
    }

    stop.window().is_none_or(|window| window.contains(now.time()))
}

/// Apply the activity gate, then filter and group.
///
/// Returns `None` when the stop is inactive at `now`.
pub fn process(
    stop: &StopConfig,
    raw: &[RawArrival],
    now: NaiveDateTime,
) -> Option<ProcessedArrivals> {
    is_active(stop, now).then(|| filter_and_group(stop, raw))
}

/// Drop disallowed lines, convert to minutes, sort, and group.
pub fn filter_and_group(stop: &StopConfig, raw: &[RawArrival]) -> ProcessedArrivals {
    let mut arrivals: Vec<ArrivalRecord> = raw
        .iter()
        .filter(|entry| stop.allows_line(&entry.line_name))
        .map(|entry| {
            ArrivalRecord::new(
                entry.line_name.as_str(),
                entry.station_name.as_str(),
                entry.destination_name.as_str(),
                minutes_from_seconds(entry.time_to_station),
            )
        })
        .collect();

    // Stable: equal minutes keep their API order.
    arrivals.sort_by_key(|a| a.minutes);

    let grouped = group_arrivals(&arrivals);
    ProcessedArrivals { arrivals, grouped }
}

/// Bucket arrivals by `(line, destination)`.
///
/// Buckets appear in first-seen order; minutes within a bucket ascend.
pub fn group_arrivals(arrivals: &[ArrivalRecord]) -> Vec<GroupedArrival> {
    let mut groups: Vec<GroupedArrival> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for arrival in arrivals {
        let key = (arrival.line.as_str(), arrival.destination.as_str());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(GroupedArrival {
                line: arrival.line.clone(),
                destination: arrival.destination.clone(),
                minutes: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].minutes.push(arrival.minutes);
    }

    for group in &mut groups {
        group.minutes.sort_unstable();
    }

    groups
}
