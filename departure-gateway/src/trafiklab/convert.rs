//! Conversion from Trafiklab DTOs to display records.
//!
//! A bad timestamp degrades that departure's time column to `"?"`; it never
//! fails the board.

use tracing::{debug, warn};

use crate::domain::{DisplayDeparture, DisplayTime, NetworkTime, parse_civil, title_case};

use super::types::{DeparturesResponse, RawDeparture};

/// Most departures sent to the board.
pub const MAX_DEPARTURES: usize = 10;

const UNKNOWN_MODE: &str = "Unknown";
const UNKNOWN_LINE: &str = "?";
const UNKNOWN_DESTINATION: &str = "Unknown";
const UNKNOWN_STATION: &str = "Unknown";

/// Convert the first [`MAX_DEPARTURES`] departures, keeping provider order.
///
/// A response without a `departures` key yields an empty board.
pub fn convert_departures(board: &DeparturesResponse, now: &NetworkTime) -> Vec<DisplayDeparture> {
    let Some(departures) = board.departures.as_deref() else {
        warn!("no departures in Trafiklab response");
        return Vec::new();
    };

    departures
        .iter()
        .take(MAX_DEPARTURES)
        .map(|dep| convert_departure(dep, now))
        .collect()
}

/// Convert a single departure.
pub fn convert_departure(dep: &RawDeparture, now: &NetworkTime) -> DisplayDeparture {
    let scheduled = dep.scheduled.clone().unwrap_or_default();
    let realtime = dep.realtime.clone().unwrap_or_default();

    let route = dep.route.as_ref();
    let mode = route
        .and_then(|r| r.transport_mode.as_deref())
        .map_or_else(|| UNKNOWN_MODE.to_string(), title_case);
    let line = route
        .and_then(|r| r.designation.clone())
        .unwrap_or_else(|| UNKNOWN_LINE.to_string());
    let destination = route
        .and_then(|r| r.direction.clone())
        .unwrap_or_else(|| UNKNOWN_DESTINATION.to_string());

    let departure_time = if realtime.is_empty() { &scheduled } else { &realtime };
    let display_time = display_time(departure_time, now);

    DisplayDeparture {
        mode,
        line,
        destination,
        display_time,
        scheduled,
        realtime,
        delay: dep.delay.unwrap_or(0),
        canceled: dep.canceled.unwrap_or(false),
        is_realtime: dep.is_realtime.unwrap_or(false),
    }
}

/// Time column for a raw timestamp; `Unknown` when it cannot be read.
fn display_time(raw: &str, now: &NetworkTime) -> DisplayTime {
    if raw.is_empty() {
        return DisplayTime::Unknown;
    }

    match parse_civil(raw) {
        Ok(departure) => {
            let shown = DisplayTime::until(&departure, now);
            debug!(%departure, %now, %shown, "departure time");
            shown
        }
        Err(e) => {
            warn!("failed to parse departure time: {e}");
            DisplayTime::Unknown
        }
    }
}

/// Name of the first stop point, or `"Unknown"`.
pub fn station_name(board: &DeparturesResponse) -> &str {
    board
        .stops
        .as_deref()
        .and_then(|stops| stops.first())
        .and_then(|stop| stop.name.as_deref())
        .unwrap_or(UNKNOWN_STATION)
}
